//! JSON-lines codec for both sides of the bridge.
//!
//! Inbound lines are `{"type": "<variant>", "data": {...}}` domain events.
//! Outbound lines are `{"event": "<name>", "payload": {...}}` emissions.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::{DomainEvent, Result};
use crate::reporter::{ReporterEventKind, RunnerEvent};

#[derive(Serialize)]
struct Emission<'a> {
    event: ReporterEventKind,
    payload: &'a RunnerEvent,
}

/// Encode one outbound emission as a single JSON line (no trailing newline).
pub fn encode_emission(name: ReporterEventKind, payload: &RunnerEvent) -> Result<String> {
    Ok(serde_json::to_string(&Emission {
        event: name,
        payload,
    })?)
}

/// Encode one inbound domain event as a single JSON line.
pub fn encode_event(event: &DomainEvent) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

/// Decode one inbound line.
///
/// Blank lines and event types this bridge has no counterpart for yield
/// `Ok(None)`. A known event type with a malformed body is an error.
pub fn decode_line(line: &str) -> Result<Option<DomainEvent>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(trimmed)?;
    let type_name = value.get("type").and_then(Value::as_str).unwrap_or_default();
    if !DomainEvent::TYPE_NAMES.contains(&type_name) {
        debug!(event_type = %type_name, "skipping event with no reporter counterpart");
        return Ok(None);
    }

    Ok(Some(serde_json::from_value(value)?))
}
