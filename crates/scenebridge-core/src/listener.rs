//! Subscription side of the bridge.
//!
//! Publishers either call [`EventListener::notify_of`] directly, or write
//! into a channel that [`drain`] reads from. Either way each event is fully
//! handled before the next one is looked at.

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::{DomainEvent, Result};

/// Anything that consumes domain events one at a time.
pub trait EventListener {
    fn notify_of(&mut self, event: &DomainEvent) -> Result<()>;
}

/// Deliver every event from `rx` to `listener` until the channel closes.
///
/// Stops at the first error and returns it; events still queued in the
/// channel are left undelivered. Returns the number of events delivered.
pub async fn drain<L>(mut rx: mpsc::Receiver<DomainEvent>, listener: &mut L) -> Result<u64>
where
    L: EventListener + ?Sized,
{
    let mut delivered = 0u64;
    while let Some(event) = rx.recv().await {
        listener.notify_of(&event)?;
        delivered += 1;
    }
    debug!(delivered, "event channel closed");
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BridgeError, TestRunStarts};
    use chrono::{TimeZone, Utc};

    #[derive(Default)]
    struct Collecting {
        seen: Vec<DomainEvent>,
        fail_after: Option<usize>,
    }

    impl EventListener for Collecting {
        fn notify_of(&mut self, event: &DomainEvent) -> Result<()> {
            if Some(self.seen.len()) == self.fail_after {
                return Err(BridgeError::ChannelClosed);
            }
            self.seen.push(event.clone());
            Ok(())
        }
    }

    fn run_starts(ms: i64) -> DomainEvent {
        DomainEvent::TestRunStarts(TestRunStarts {
            timestamp: Utc.timestamp_millis_opt(ms).unwrap(),
        })
    }

    #[tokio::test]
    async fn drains_in_order_until_closed() {
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            for ms in 0..3 {
                tx.send(run_starts(ms)).await.unwrap();
            }
        });

        let mut listener = Collecting::default();
        let delivered = drain(rx, &mut listener).await.unwrap();
        assert_eq!(delivered, 3);
        assert_eq!(listener.seen, vec![run_starts(0), run_starts(1), run_starts(2)]);
    }

    #[tokio::test]
    async fn stops_at_first_error() {
        let (tx, rx) = mpsc::channel(4);
        for ms in 0..3 {
            tx.send(run_starts(ms)).await.unwrap();
        }
        drop(tx);

        let mut listener = Collecting {
            fail_after: Some(1),
            ..Default::default()
        };
        assert!(drain(rx, &mut listener).await.is_err());
        assert_eq!(listener.seen.len(), 1);
    }
}
