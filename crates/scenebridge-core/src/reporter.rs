//! Outbound reporter vocabulary and sinks.
//!
//! The bridge speaks to the external runner through a generic named-event
//! sink: [`ReporterSink::emit`] receives the event name and the payload.
//! Three sinks ship with the crate:
//! - [`RecordingSink`]: keeps every emission in memory
//! - [`JsonLinesSink`]: one JSON object per emission
//! - [`PrettySink`]: human-readable lines prefixed with the worker id

use std::fmt;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ProblemDetails, Result};
use crate::output::PrefixedLineWriter;
use crate::wire;

/// Event names understood by the external reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReporterEventKind {
    #[serde(rename = "suite:start")]
    SuiteStart,
    #[serde(rename = "suite:end")]
    SuiteEnd,
    #[serde(rename = "test:start")]
    TestStart,
    #[serde(rename = "test:pass")]
    TestPass,
    #[serde(rename = "test:fail")]
    TestFail,
    #[serde(rename = "test:pending")]
    TestPending,
    #[serde(rename = "test:end")]
    TestEnd,
}

impl ReporterEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReporterEventKind::SuiteStart => "suite:start",
            ReporterEventKind::SuiteEnd => "suite:end",
            ReporterEventKind::TestStart => "test:start",
            ReporterEventKind::TestPass => "test:pass",
            ReporterEventKind::TestFail => "test:fail",
            ReporterEventKind::TestPending => "test:pending",
            ReporterEventKind::TestEnd => "test:end",
        }
    }

    /// Whether this event opens a suite or test.
    pub fn is_start(self) -> bool {
        matches!(
            self,
            ReporterEventKind::SuiteStart | ReporterEventKind::TestStart
        )
    }

    /// Whether this event carries the final status of a test.
    pub fn is_test_status(self) -> bool {
        matches!(
            self,
            ReporterEventKind::TestPass | ReporterEventKind::TestFail | ReporterEventKind::TestPending
        )
    }
}

impl fmt::Display for ReporterEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error object attached to failed and pending tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedError {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<serde_json::Value>,
}

impl From<&ProblemDetails> for ReportedError {
    fn from(problem: &ProblemDetails) -> Self {
        Self {
            name: problem.name.clone(),
            message: problem.message.clone(),
            stack: problem.stack.clone(),
            type_tag: problem.effective_type().to_string(),
            expected: problem.expected.clone(),
            actual: problem.actual.clone(),
        }
    }
}

/// Payload of every reporter event, for suites and tests alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerEvent {
    #[serde(rename = "type")]
    pub kind: ReporterEventKind,
    pub uid: String,
    pub cid: String,
    pub title: String,
    pub full_title: String,
    pub parent: String,
    pub file: String,
    pub specs: Vec<String>,
    #[serde(with = "iso8601")]
    pub start: DateTime<Utc>,
    #[serde(default, with = "iso8601_opt", skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Milliseconds; zero on start events.
    pub duration: i64,
    pub pending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportedError>,
}

impl RunnerEvent {
    /// Copy of this start payload closed at `end`.
    pub fn finished(&self, kind: ReporterEventKind, end: DateTime<Utc>) -> Self {
        Self {
            kind,
            end: Some(end),
            duration: (end - self.start).num_milliseconds(),
            ..self.clone()
        }
    }
}

/// ISO-8601 with millisecond precision, e.g. `2018-02-09T13:30:40.177Z`.
pub(crate) mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

pub(crate) mod iso8601_opt {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => super::iso8601::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

// ============================================================================
// SINKS
// ============================================================================

/// Receives translated events, synchronously and in emission order.
pub trait ReporterSink {
    fn emit(&mut self, name: ReporterEventKind, payload: &RunnerEvent) -> Result<()>;
}

impl<S: ReporterSink + ?Sized> ReporterSink for Box<S> {
    fn emit(&mut self, name: ReporterEventKind, payload: &RunnerEvent) -> Result<()> {
        (**self).emit(name, payload)
    }
}

impl<S: ReporterSink + ?Sized> ReporterSink for &mut S {
    fn emit(&mut self, name: ReporterEventKind, payload: &RunnerEvent) -> Result<()> {
        (**self).emit(name, payload)
    }
}

/// In-memory sink.
#[derive(Debug, Default)]
pub struct RecordingSink {
    emissions: Vec<(ReporterEventKind, RunnerEvent)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emissions(&self) -> &[(ReporterEventKind, RunnerEvent)] {
        &self.emissions
    }

    /// Event names in emission order.
    pub fn names(&self) -> Vec<ReporterEventKind> {
        self.emissions.iter().map(|(name, _)| *name).collect()
    }

    pub fn count_of(&self, name: ReporterEventKind) -> usize {
        self.emissions.iter().filter(|(n, _)| *n == name).count()
    }

    pub fn last(&self) -> Option<&RunnerEvent> {
        self.emissions.last().map(|(_, payload)| payload)
    }

    pub fn is_empty(&self) -> bool {
        self.emissions.is_empty()
    }

    pub fn into_emissions(self) -> Vec<(ReporterEventKind, RunnerEvent)> {
        self.emissions
    }
}

impl ReporterSink for RecordingSink {
    fn emit(&mut self, name: ReporterEventKind, payload: &RunnerEvent) -> Result<()> {
        self.emissions.push((name, payload.clone()));
        Ok(())
    }
}

/// Writes one `{"event": ..., "payload": ...}` object per line.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReporterSink for JsonLinesSink<W> {
    fn emit(&mut self, name: ReporterEventKind, payload: &RunnerEvent) -> Result<()> {
        let line = wire::encode_emission(name, payload)?;
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Human-readable progress output, one line per suite and per test result.
pub struct PrettySink<W: Write> {
    out: PrefixedLineWriter<W>,
    depth: usize,
}

impl<W: Write> PrettySink<W> {
    pub fn new(cid: &str, out: W) -> Self {
        Self {
            out: PrefixedLineWriter::new(format!("[{cid}]"), out),
            depth: 0,
        }
    }

    pub fn into_inner(self) -> std::io::Result<W> {
        self.out.into_inner()
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }
}

impl<W: Write> ReporterSink for PrettySink<W> {
    fn emit(&mut self, name: ReporterEventKind, payload: &RunnerEvent) -> Result<()> {
        let indent = self.indent();
        match name {
            ReporterEventKind::SuiteStart => {
                writeln!(self.out, "{indent}{}", payload.title)?;
                self.depth += 1;
            }
            ReporterEventKind::SuiteEnd => {
                self.depth = self.depth.saturating_sub(1);
            }
            ReporterEventKind::TestPass => {
                writeln!(
                    self.out,
                    "{indent}✓ {} ({} ms)",
                    payload.title, payload.duration
                )?;
            }
            ReporterEventKind::TestPending => {
                match &payload.pending_reason {
                    Some(reason) => writeln!(self.out, "{indent}- {} ({reason})", payload.title)?,
                    None => writeln!(self.out, "{indent}- {}", payload.title)?,
                }
            }
            ReporterEventKind::TestFail => {
                writeln!(
                    self.out,
                    "{indent}✗ {} ({} ms)",
                    payload.title, payload.duration
                )?;
                if let Some(error) = &payload.error {
                    writeln!(self.out, "{indent}    {}: {}", error.name, error.message)?;
                }
            }
            ReporterEventKind::TestStart | ReporterEventKind::TestEnd => {}
        }
        self.out.flush()?;
        Ok(())
    }
}
