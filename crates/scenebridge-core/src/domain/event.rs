//! Domain events describing the progress of a test run.
//!
//! Events are immutable facts. For a given correlation id the publisher
//! guarantees that the start precedes the finish; events for different ids
//! may interleave freely.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::outcome::Outcome;

/// Opaque join key between a start event and its finish.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Wrap an id minted elsewhere.
    pub fn new(value: impl Into<String>) -> Self {
        CorrelationId(value.into())
    }

    /// Mint a fresh, globally unique id.
    pub fn create() -> Self {
        CorrelationId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a suite or scenario is defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemLocation {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl FileSystemLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            line: None,
            column: None,
        }
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Path rendered with forward slashes, as reporters expect.
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }
}

impl fmt::Display for FileSystemLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_string())?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        Ok(())
    }
}

/// Descriptor of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDetails {
    pub name: String,
    /// Grouping label, e.g. the feature a scenario belongs to.
    pub category: String,
    pub location: FileSystemLocation,
}

impl ScenarioDetails {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        location: FileSystemLocation,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            location,
        }
    }
}

/// Descriptor of a (possibly nested) suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuiteDetails {
    pub name: String,
    pub location: FileSystemLocation,
    pub correlation_id: CorrelationId,
}

impl TestSuiteDetails {
    pub fn new(
        name: impl Into<String>,
        location: FileSystemLocation,
        correlation_id: CorrelationId,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            correlation_id,
        }
    }
}

/// Metadata attached to a running scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tag {
    Arbitrary { name: String },
    Feature { name: String },
    Capability { name: String },
    ExecutionRetried { retry: u32, max_retries: u32 },
}

impl Tag {
    /// Whether this tag marks a retried scenario attempt.
    pub fn is_retry_marker(&self) -> bool {
        match self {
            Tag::Arbitrary { name } => name == "retried",
            Tag::ExecutionRetried { .. } => true,
            Tag::Feature { .. } | Tag::Capability { .. } => false,
        }
    }
}

// ============================================================================
// EVENT TYPES
// ============================================================================

/// Test-run lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DomainEvent {
    TestRunStarts(TestRunStarts),
    TestRunFinished(TestRunFinished),
    TestSuiteStarts(TestSuiteStarts),
    TestSuiteFinished(TestSuiteFinished),
    SceneStarts(SceneStarts),
    SceneTagged(SceneTagged),
    SceneFinished(SceneFinished),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRunStarts {
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRunFinished {
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuiteStarts {
    pub details: TestSuiteDetails,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuiteFinished {
    pub details: TestSuiteDetails,
    pub outcome: Outcome,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneStarts {
    pub scene_id: CorrelationId,
    pub details: ScenarioDetails,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTagged {
    pub scene_id: CorrelationId,
    pub tag: Tag,
    pub details: ScenarioDetails,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFinished {
    pub scene_id: CorrelationId,
    pub details: ScenarioDetails,
    pub outcome: Outcome,
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Wire names of every variant, as used in the `type` field.
    pub const TYPE_NAMES: [&'static str; 7] = [
        "test_run_starts",
        "test_run_finished",
        "test_suite_starts",
        "test_suite_finished",
        "scene_starts",
        "scene_tagged",
        "scene_finished",
    ];

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            DomainEvent::TestRunStarts(e) => e.timestamp,
            DomainEvent::TestRunFinished(e) => e.timestamp,
            DomainEvent::TestSuiteStarts(e) => e.timestamp,
            DomainEvent::TestSuiteFinished(e) => e.timestamp,
            DomainEvent::SceneStarts(e) => e.timestamp,
            DomainEvent::SceneTagged(e) => e.timestamp,
            DomainEvent::SceneFinished(e) => e.timestamp,
        }
    }

    /// The correlation id this event refers to, if any.
    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        match self {
            DomainEvent::TestRunStarts(_) | DomainEvent::TestRunFinished(_) => None,
            DomainEvent::TestSuiteStarts(e) => Some(&e.details.correlation_id),
            DomainEvent::TestSuiteFinished(e) => Some(&e.details.correlation_id),
            DomainEvent::SceneStarts(e) => Some(&e.scene_id),
            DomainEvent::SceneTagged(e) => Some(&e.scene_id),
            DomainEvent::SceneFinished(e) => Some(&e.scene_id),
        }
    }

    /// Wire name of this event's variant.
    pub fn type_name(&self) -> &'static str {
        let index = match self {
            DomainEvent::TestRunStarts(_) => 0,
            DomainEvent::TestRunFinished(_) => 1,
            DomainEvent::TestSuiteStarts(_) => 2,
            DomainEvent::TestSuiteFinished(_) => 3,
            DomainEvent::SceneStarts(_) => 4,
            DomainEvent::SceneTagged(_) => 5,
            DomainEvent::SceneFinished(_) => 6,
        };
        Self::TYPE_NAMES[index]
    }
}
