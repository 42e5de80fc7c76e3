//! scenebridge core library
//!
//! Translates a stream of test-run lifecycle events (suites and scenarios
//! starting, being tagged, finishing with an outcome) into the event
//! vocabulary of an external test runner's reporter, reconstructing
//! durations, nesting and pass/fail status on the way.

pub mod config;
pub mod domain;
pub mod journal;
pub mod listener;
pub mod metrics;
pub mod nesting;
pub mod notifier;
pub mod obs;
pub mod output;
pub mod reporter;
pub mod telemetry;
pub mod wire;

pub use config::{BridgeConfig, OutputFormat, RunnerKind};
pub use domain::{
    BridgeError, CorrelationId, DomainEvent, FileSystemLocation, Outcome, OutcomeKind,
    ProblemDetails, ProtocolViolation, Result, ScenarioDetails, SceneFinished, SceneStarts,
    SceneTagged, SuccessThreshold, Tag, TestRunFinished, TestRunStarts, TestSuiteDetails,
    TestSuiteFinished, TestSuiteStarts,
};
pub use journal::{EntryState, EventJournal, Recorded};
pub use listener::{drain, EventListener};
pub use metrics::METRICS;
pub use nesting::SuiteStack;
pub use notifier::{Notifier, NotifierConfig};
pub use obs::WorkerSpan;
pub use output::PrefixedLineWriter;
pub use reporter::{
    JsonLinesSink, PrettySink, RecordingSink, ReportedError, ReporterEventKind, ReporterSink,
    RunnerEvent,
};
pub use telemetry::init_tracing;

/// scenebridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
