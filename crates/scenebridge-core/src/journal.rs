//! Correlation-keyed journal of start events.
//!
//! Entries are written when a suite or scenario starts and retired when the
//! matching finish arrives. Looking up an id that was never recorded, or one
//! already retired, is a protocol violation reported to the caller; the
//! journal never fabricates a default.

use std::collections::HashMap;

use crate::domain::{CorrelationId, DomainEvent, ProtocolViolation};
use crate::reporter::RunnerEvent;

/// A recorded start: the inbound event and the payload emitted for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub event: DomainEvent,
    pub emitted: RunnerEvent,
}

/// Lifecycle position of a correlation id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Unseen,
    Started,
    Finished,
}

#[derive(Debug)]
enum Slot {
    Open(Recorded),
    Retired,
}

#[derive(Debug, Default)]
pub struct EventJournal {
    entries: HashMap<CorrelationId, Slot>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the start recorded under `id`, replacing whatever was there.
    pub fn record(&mut self, id: CorrelationId, entry: Recorded) {
        self.entries.insert(id, Slot::Open(entry));
    }

    pub fn get_by_correlation_id(
        &self,
        id: &CorrelationId,
    ) -> Result<&Recorded, ProtocolViolation> {
        match self.entries.get(id) {
            Some(Slot::Open(entry)) => Ok(entry),
            Some(Slot::Retired) => Err(ProtocolViolation::AlreadyFinished {
                correlation_id: id.clone(),
            }),
            None => Err(ProtocolViolation::NeverRecorded {
                correlation_id: id.clone(),
            }),
        }
    }

    /// Mark the entry consumed by its finish and hand it back.
    pub fn retire(&mut self, id: &CorrelationId) -> Result<Recorded, ProtocolViolation> {
        match self.entries.insert(id.clone(), Slot::Retired) {
            Some(Slot::Open(entry)) => Ok(entry),
            Some(Slot::Retired) => Err(ProtocolViolation::AlreadyFinished {
                correlation_id: id.clone(),
            }),
            None => {
                self.entries.remove(id);
                Err(ProtocolViolation::NeverRecorded {
                    correlation_id: id.clone(),
                })
            }
        }
    }

    pub fn state(&self, id: &CorrelationId) -> EntryState {
        match self.entries.get(id) {
            None => EntryState::Unseen,
            Some(Slot::Open(_)) => EntryState::Started,
            Some(Slot::Retired) => EntryState::Finished,
        }
    }

    /// Ids started but never finished, sorted for stable output.
    pub fn open_ids(&self) -> Vec<CorrelationId> {
        let mut ids: Vec<CorrelationId> = self
            .entries
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Open(_)))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
