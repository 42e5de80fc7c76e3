//! Domain models for scenebridge.
//!
//! Canonical definitions for the inbound side of the bridge:
//! - `DomainEvent`: immutable facts about test-run progress
//! - `Outcome`: classified scenario results ranked by severity
//! - `SuccessThreshold`: the worst outcome still reported as a pass

pub mod error;
pub mod event;
pub mod outcome;

// Re-export main types and errors
pub use error::{BridgeError, ProtocolViolation, Result};
pub use event::{
    CorrelationId, DomainEvent, FileSystemLocation, ScenarioDetails, SceneFinished, SceneStarts,
    SceneTagged, Tag, TestRunFinished, TestRunStarts, TestSuiteDetails, TestSuiteFinished,
    TestSuiteStarts,
};
pub use outcome::{Outcome, OutcomeKind, ProblemDetails, SuccessThreshold};
