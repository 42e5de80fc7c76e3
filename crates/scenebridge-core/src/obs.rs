//! Structured observability hooks for the bridge.
//!
//! Lifecycle records are emitted at `debug!` level, run boundaries and
//! protocol violations at `info!`/`error!`. All records carry an `event`
//! field so they can be filtered in JSON log pipelines.

use tracing::{debug, error, info, warn};

use crate::domain::{CorrelationId, OutcomeKind, ProtocolViolation};
use crate::reporter::ReporterEventKind;

/// RAII guard that enters a worker-scoped span for the duration of a run.
///
/// ```ignore
/// let _span = WorkerSpan::enter("0-0");
/// // every record below is tagged with cid = "0-0"
/// ```
pub struct WorkerSpan {
    _span: tracing::span::EnteredSpan,
}

impl WorkerSpan {
    pub fn enter(cid: &str) -> Self {
        let span = tracing::info_span!("scenebridge.worker", cid = %cid);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_run_started(cid: &str) {
    info!(event = "run.started", cid = %cid);
}

pub fn emit_run_finished(cid: &str, failures: usize, open_ids: usize) {
    info!(
        event = "run.finished",
        cid = %cid,
        failures = failures,
        open_ids = open_ids,
    );
}

pub fn emit_suite_started(id: &CorrelationId, full_title: &str, depth: usize) {
    debug!(event = "suite.started", uid = %id, full_title = %full_title, depth = depth);
}

pub fn emit_suite_finished(id: &CorrelationId, duration_ms: i64) {
    debug!(event = "suite.finished", uid = %id, duration_ms = duration_ms);
}

pub fn emit_scene_started(id: &CorrelationId, title: &str) {
    debug!(event = "scene.started", uid = %id, title = %title);
}

pub fn emit_scene_finished(
    id: &CorrelationId,
    outcome: OutcomeKind,
    status: ReporterEventKind,
    duration_ms: i64,
    counted_as_failure: bool,
) {
    debug!(
        event = "scene.finished",
        uid = %id,
        outcome = %outcome,
        status = %status,
        duration_ms = duration_ms,
        failure = counted_as_failure,
    );
}

pub fn emit_retry_marker(id: &CorrelationId) {
    debug!(event = "scene.retry_marker", uid = %id);
}

pub fn emit_protocol_violation(violation: &ProtocolViolation) {
    error!(event = "protocol.violation", error = %violation);
}

/// Ids still open when the stream ended; they are never finished implicitly.
pub fn emit_unfinished(ids: &[CorrelationId]) {
    for id in ids {
        warn!(event = "run.unfinished", uid = %id);
    }
}
