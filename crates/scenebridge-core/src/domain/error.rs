//! Error taxonomy for the bridge.

use super::event::CorrelationId;

/// Integrity violations in the inbound event stream.
///
/// These are never recovered from: guessing at a correlation would corrupt
/// the timings and results handed to the reporter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    #[error("event with correlation id {correlation_id} has never been recorded")]
    NeverRecorded { correlation_id: CorrelationId },

    #[error("event with correlation id {correlation_id} has already finished")]
    AlreadyFinished { correlation_id: CorrelationId },

    #[error("correlation id {correlation_id} has already been started")]
    DuplicateStart { correlation_id: CorrelationId },

    #[error("correlation id {correlation_id} was opened by {found}, expected {expected}")]
    KindMismatch {
        correlation_id: CorrelationId,
        expected: &'static str,
        found: &'static str,
    },

    #[error(
        "suite {finished} finished while the innermost open suite is {}",
        innermost.as_ref().map(|id| id.as_str()).unwrap_or("<none>")
    )]
    SuiteNestingMismatch {
        finished: CorrelationId,
        innermost: Option<CorrelationId>,
    },
}

/// Bridge errors.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    #[error("invalid success threshold: {0}")]
    InvalidThreshold(String),

    #[error("unknown outcome kind: {0}")]
    UnknownOutcomeKind(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("event channel closed before the run finished")]
    ChannelClosed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether this error signals a broken upstream event stream.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, BridgeError::Protocol(_))
    }
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
