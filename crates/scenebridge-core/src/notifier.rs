//! The bridge between domain events and the external reporter.
//!
//! [`Notifier`] consumes [`DomainEvent`]s one at a time and emits the
//! runner's `suite:*` / `test:*` vocabulary to a [`ReporterSink`]. It pairs
//! every finish with its start through the [`EventJournal`], tracks suite
//! nesting with a [`SuiteStack`], and keeps a running count of scenarios
//! whose outcome was worse than the configured [`SuccessThreshold`].
//!
//! Per correlation id the only legal path is `unseen -> started -> finished`.
//! Anything else is a [`ProtocolViolation`] raised before any event for that
//! id is emitted.

use tracing::instrument;

use crate::domain::{
    BridgeError, CorrelationId, DomainEvent, Outcome, ProtocolViolation, Result, SceneFinished,
    SceneStarts, SceneTagged, SuccessThreshold, TestSuiteFinished, TestSuiteStarts,
};
use crate::journal::{EntryState, EventJournal, Recorded};
use crate::listener::EventListener;
use crate::metrics::METRICS;
use crate::nesting::SuiteStack;
use crate::obs;
use crate::reporter::{ReportedError, ReporterEventKind, ReporterSink, RunnerEvent};

/// Immutable per-run settings of a [`Notifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct NotifierConfig {
    /// Worker identifier stamped on every emitted event.
    pub cid: String,
    /// Spec files handled by this worker.
    pub specs: Vec<String>,
    pub success_threshold: SuccessThreshold,
}

impl NotifierConfig {
    pub fn new(cid: impl Into<String>, success_threshold: impl Into<SuccessThreshold>) -> Self {
        Self {
            cid: cid.into(),
            specs: Vec::new(),
            success_threshold: success_threshold.into(),
        }
    }

    pub fn with_specs(mut self, specs: Vec<String>) -> Self {
        self.specs = specs;
        self
    }
}

/// Translates one run's domain events for one worker.
pub struct Notifier<S: ReporterSink> {
    sink: S,
    config: NotifierConfig,
    journal: EventJournal,
    suites: SuiteStack,
    failures: usize,
}

impl<S: ReporterSink> Notifier<S> {
    pub fn new(sink: S, config: NotifierConfig) -> Self {
        Self {
            sink,
            config,
            journal: EventJournal::new(),
            suites: SuiteStack::new(),
            failures: 0,
        }
    }

    /// Process one event completely before returning.
    #[instrument(skip_all, fields(event_type = event.type_name()), level = "trace")]
    pub fn notify_of(&mut self, event: &DomainEvent) -> Result<()> {
        METRICS.inc_events_received();

        let result = match event {
            DomainEvent::TestSuiteStarts(started) => self.on_test_suite_starts(started),
            DomainEvent::TestSuiteFinished(finished) => self.on_test_suite_finished(finished),
            DomainEvent::SceneStarts(started) => self.on_scene_starts(started),
            DomainEvent::SceneTagged(tagged) => self.on_scene_tagged(tagged),
            DomainEvent::SceneFinished(finished) => self.on_scene_finished(finished),
            DomainEvent::TestRunStarts(_) | DomainEvent::TestRunFinished(_) => {
                METRICS.inc_events_ignored();
                Ok(())
            }
        };

        if let Err(BridgeError::Protocol(violation)) = &result {
            METRICS.inc_protocol_violations();
            obs::emit_protocol_violation(violation);
        }
        result
    }

    /// Completed scenarios whose outcome was worse than the threshold.
    pub fn failure_count(&self) -> usize {
        self.failures
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Suites and scenarios started but not finished so far.
    pub fn open_correlation_ids(&self) -> Vec<CorrelationId> {
        self.journal.open_ids()
    }

    // ------------------------------------------------------------------
    // suites
    // ------------------------------------------------------------------

    fn on_test_suite_starts(&mut self, started: &TestSuiteStarts) -> Result<()> {
        let id = &started.details.correlation_id;
        self.ensure_unseen(id)?;

        let name = &started.details.name;
        let payload = RunnerEvent {
            kind: ReporterEventKind::SuiteStart,
            uid: id.to_string(),
            cid: self.config.cid.clone(),
            title: name.clone(),
            full_title: self.suites.full_name_path(name),
            parent: self.suites.current_parent_name().to_string(),
            file: started.details.location.path_string(),
            specs: self.config.specs.clone(),
            start: started.timestamp,
            end: None,
            duration: 0,
            pending: false,
            pending_reason: None,
            error: None,
        };

        obs::emit_suite_started(id, &payload.full_title, self.suites.depth());
        self.journal.record(
            id.clone(),
            Recorded {
                event: DomainEvent::TestSuiteStarts(started.clone()),
                emitted: payload.clone(),
            },
        );
        self.emit(&payload)?;
        self.suites.enter(started.details.clone());
        Ok(())
    }

    fn on_test_suite_finished(&mut self, finished: &TestSuiteFinished) -> Result<()> {
        let id = &finished.details.correlation_id;
        let started = self.started_payload(id, "test_suite_starts")?;
        self.suites.exit(id)?;
        self.journal.retire(id)?;

        let payload = started.finished(ReporterEventKind::SuiteEnd, finished.timestamp);
        obs::emit_suite_finished(id, payload.duration);
        self.emit(&payload)
    }

    // ------------------------------------------------------------------
    // scenes
    // ------------------------------------------------------------------

    fn on_scene_starts(&mut self, started: &SceneStarts) -> Result<()> {
        let id = &started.scene_id;
        self.ensure_unseen(id)?;

        let parent = self.suites.current_parent_name().to_string();
        let title = title_beneath(&started.details.name, &parent);
        let payload = RunnerEvent {
            kind: ReporterEventKind::TestStart,
            uid: id.to_string(),
            cid: self.config.cid.clone(),
            full_title: self.suites.full_name_path(&title),
            title,
            parent,
            file: started.details.location.path_string(),
            specs: self.config.specs.clone(),
            start: started.timestamp,
            end: None,
            duration: 0,
            pending: false,
            pending_reason: None,
            error: None,
        };

        obs::emit_scene_started(id, &payload.title);
        self.journal.record(
            id.clone(),
            Recorded {
                event: DomainEvent::SceneStarts(started.clone()),
                emitted: payload.clone(),
            },
        );
        self.emit(&payload)
    }

    fn on_scene_tagged(&mut self, tagged: &SceneTagged) -> Result<()> {
        // Retried attempts are still reported and counted like any other.
        if tagged.tag.is_retry_marker() {
            obs::emit_retry_marker(&tagged.scene_id);
        }
        METRICS.inc_events_ignored();
        Ok(())
    }

    fn on_scene_finished(&mut self, finished: &SceneFinished) -> Result<()> {
        let id = &finished.scene_id;
        let started = self.started_payload(id, "scene_starts")?;
        self.journal.retire(id)?;

        let counted_as_failure = finished
            .outcome
            .is_worse_than(self.config.success_threshold);
        if counted_as_failure {
            self.failures += 1;
        }

        let verdict = Verdict::of(&finished.outcome, counted_as_failure);
        let mut result = started.finished(verdict.kind, finished.timestamp);
        result.pending = verdict.pending;
        result.pending_reason = verdict.pending_reason;
        result.error = verdict.error;

        obs::emit_scene_finished(
            id,
            finished.outcome.kind(),
            result.kind,
            result.duration,
            counted_as_failure,
        );

        self.emit(&result)?;
        let end = RunnerEvent {
            kind: ReporterEventKind::TestEnd,
            ..result
        };
        self.emit(&end)
    }

    // ------------------------------------------------------------------

    /// Start payload recorded for `id`, provided it was opened by an event
    /// of type `expected`.
    fn started_payload(&self, id: &CorrelationId, expected: &'static str) -> Result<RunnerEvent> {
        let recorded = self.journal.get_by_correlation_id(id)?;
        let found = recorded.event.type_name();
        if found != expected {
            return Err(ProtocolViolation::KindMismatch {
                correlation_id: id.clone(),
                expected,
                found,
            }
            .into());
        }
        Ok(recorded.emitted.clone())
    }

    fn ensure_unseen(&self, id: &CorrelationId) -> Result<()> {
        match self.journal.state(id) {
            EntryState::Unseen => Ok(()),
            EntryState::Started | EntryState::Finished => Err(ProtocolViolation::DuplicateStart {
                correlation_id: id.clone(),
            }
            .into()),
        }
    }

    fn emit(&mut self, payload: &RunnerEvent) -> Result<()> {
        self.sink.emit(payload.kind, payload)?;
        METRICS.inc_events_emitted();
        Ok(())
    }
}

impl<S: ReporterSink> EventListener for Notifier<S> {
    fn notify_of(&mut self, event: &DomainEvent) -> Result<()> {
        Notifier::notify_of(self, event)
    }
}

/// Reporter status of a finished scenario.
struct Verdict {
    kind: ReporterEventKind,
    pending: bool,
    pending_reason: Option<String>,
    error: Option<ReportedError>,
}

impl Verdict {
    fn of(outcome: &Outcome, worse_than_threshold: bool) -> Self {
        match outcome {
            Outcome::Successful => Verdict {
                kind: ReporterEventKind::TestPass,
                pending: false,
                pending_reason: None,
                error: None,
            },
            // skipped, pending and ignored all collapse to the runner's "pending"
            Outcome::Skipped => Verdict {
                kind: ReporterEventKind::TestPending,
                pending: true,
                pending_reason: None,
                error: None,
            },
            Outcome::Ignored(problem) | Outcome::Pending(problem) => Verdict {
                kind: ReporterEventKind::TestPending,
                pending: true,
                pending_reason: Some(problem.message.clone()),
                error: Some(ReportedError::from(problem)),
            },
            Outcome::FailedWithAssertion(problem)
            | Outcome::FailedWithError(problem)
            | Outcome::Compromised(problem) => Verdict {
                kind: if worse_than_threshold {
                    ReporterEventKind::TestFail
                } else {
                    ReporterEventKind::TestPass
                },
                pending: false,
                pending_reason: None,
                error: Some(ReportedError::from(problem)),
            },
        }
    }
}

/// Scenario title with everything up to and including the first occurrence
/// of the parent suite's name removed.
///
/// Runners already nest tests under their suite, so `"Checkout Paying"` under
/// suite `"Checkout"` is reported as `"Paying"`. A name that would become
/// empty is kept whole.
fn title_beneath(name: &str, parent: &str) -> String {
    if parent.is_empty() {
        return name.trim().to_string();
    }

    match name.find(parent) {
        Some(at) => {
            let rest = name[at + parent.len()..].trim();
            if rest.is_empty() {
                name.trim().to_string()
            } else {
                rest.to_string()
            }
        }
        None => name.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        FileSystemLocation, OutcomeKind, ProblemDetails, ScenarioDetails, Tag, TestRunStarts,
        TestSuiteDetails,
    };
    use crate::reporter::RecordingSink;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn notifier(threshold: OutcomeKind) -> Notifier<RecordingSink> {
        Notifier::new(
            RecordingSink::new(),
            NotifierConfig::new("0-0", threshold).with_specs(vec!["payments/checkout.feature".into()]),
        )
    }

    fn suite(name: &str, id: &str) -> TestSuiteDetails {
        TestSuiteDetails::new(
            name,
            FileSystemLocation::new("payments/checkout.feature"),
            CorrelationId::new(id),
        )
    }

    fn suite_starts(details: &TestSuiteDetails, ms: i64) -> DomainEvent {
        DomainEvent::TestSuiteStarts(TestSuiteStarts {
            details: details.clone(),
            timestamp: at(ms),
        })
    }

    fn suite_finished(details: &TestSuiteDetails, ms: i64) -> DomainEvent {
        DomainEvent::TestSuiteFinished(TestSuiteFinished {
            details: details.clone(),
            outcome: Outcome::Successful,
            timestamp: at(ms),
        })
    }

    fn scenario(name: &str) -> ScenarioDetails {
        ScenarioDetails::new(
            name,
            "Online Checkout",
            FileSystemLocation::new("payments/checkout.feature").at_line(3),
        )
    }

    fn scene_starts(id: &str, name: &str, ms: i64) -> DomainEvent {
        DomainEvent::SceneStarts(SceneStarts {
            scene_id: CorrelationId::new(id),
            details: scenario(name),
            timestamp: at(ms),
        })
    }

    fn scene_finished(id: &str, name: &str, outcome: Outcome, ms: i64) -> DomainEvent {
        DomainEvent::SceneFinished(SceneFinished {
            scene_id: CorrelationId::new(id),
            details: scenario(name),
            outcome,
            timestamp: at(ms),
        })
    }

    fn problem(message: &str) -> ProblemDetails {
        ProblemDetails::new("Error", message)
    }

    #[test]
    fn single_passing_scenario_in_a_suite() {
        let mut n = notifier(OutcomeKind::Ignored);
        let checkout = suite("Online Checkout", "suite-1");

        for event in [
            suite_starts(&checkout, 0),
            scene_starts("scene-1", "Paying with a default card", 0),
            scene_finished("scene-1", "Paying with a default card", Outcome::Successful, 500),
            suite_finished(&checkout, 500),
        ] {
            n.notify_of(&event).unwrap();
        }

        let sink = n.sink();
        assert_eq!(
            sink.names(),
            vec![
                ReporterEventKind::SuiteStart,
                ReporterEventKind::TestStart,
                ReporterEventKind::TestPass,
                ReporterEventKind::TestEnd,
                ReporterEventKind::SuiteEnd,
            ]
        );
        let durations: Vec<i64> = sink.emissions().iter().map(|(_, p)| p.duration).collect();
        assert_eq!(durations, vec![0, 0, 500, 500, 500]);
        assert_eq!(n.failure_count(), 0);
    }

    #[test]
    fn suite_end_mirrors_suite_start() {
        let mut n = notifier(OutcomeKind::Ignored);
        let outer = suite("Payments", "s1");
        let inner = suite("Online Checkout", "s2");
        for event in [
            suite_starts(&outer, 0),
            suite_starts(&inner, 10),
            suite_finished(&inner, 60),
            suite_finished(&outer, 100),
        ] {
            n.notify_of(&event).unwrap();
        }

        let emissions = n.sink().emissions();
        let (_, inner_start) = &emissions[1];
        let (_, inner_end) = &emissions[2];
        assert_eq!(inner_start.full_title, "Payments Online Checkout");
        assert_eq!(inner_start.parent, "Payments");
        assert_eq!(inner_end.kind, ReporterEventKind::SuiteEnd);
        assert_eq!(inner_end.full_title, inner_start.full_title);
        assert_eq!(inner_end.parent, inner_start.parent);
        assert_eq!(inner_end.uid, "s2");
        assert_eq!(inner_end.duration, 50);
        assert_eq!(inner_end.end, Some(at(60)));

        let (_, outer_end) = &emissions[3];
        assert_eq!(outer_end.parent, "");
        assert_eq!(outer_end.duration, 100);
    }

    #[test]
    fn scenario_title_drops_parent_suite_prefix() {
        let mut n = notifier(OutcomeKind::Ignored);
        let checkout = suite("Online Checkout", "suite-1");
        n.notify_of(&suite_starts(&checkout, 0)).unwrap();
        n.notify_of(&scene_starts("scene-1", "Online Checkout Paying with a voucher", 0))
            .unwrap();

        let start = n.sink().last().unwrap();
        assert_eq!(start.title, "Paying with a voucher");
        assert_eq!(start.full_title, "Online Checkout Paying with a voucher");
        assert_eq!(start.parent, "Online Checkout");
        assert_eq!(start.file, "payments/checkout.feature");
        assert_eq!(start.specs, vec!["payments/checkout.feature".to_string()]);
        assert_eq!(start.cid, "0-0");
        assert!(!start.pending);
    }

    #[test]
    fn title_beneath_cases() {
        assert_eq!(title_beneath("  Paying  ", ""), "Paying");
        assert_eq!(title_beneath("Checkout Paying", "Checkout"), "Paying");
        assert_eq!(title_beneath("Feature: Checkout Paying", "Checkout"), "Paying");
        assert_eq!(title_beneath("Paying", "Checkout"), "Paying");
        assert_eq!(title_beneath("Checkout", "Checkout"), "Checkout");
        assert_eq!(title_beneath("a.b (c) x", "a.b (c)"), "x");
    }

    #[test]
    fn failed_assertion_carries_structured_error() {
        let mut n = notifier(OutcomeKind::Ignored);
        let outcome = Outcome::FailedWithAssertion(
            ProblemDetails::new("AssertionError", "Expected false to be true")
                .with_stack("AssertionError: Expected false to be true\n    at step")
                .with_values(serde_json::json!(true), serde_json::json!(false)),
        );
        n.notify_of(&scene_starts("scene-1", "Paying", 0)).unwrap();
        n.notify_of(&scene_finished("scene-1", "Paying", outcome, 250))
            .unwrap();

        let (name, fail) = &n.sink().emissions()[1];
        assert_eq!(*name, ReporterEventKind::TestFail);
        let error = fail.error.as_ref().expect("error attached");
        assert_eq!(error.name, "AssertionError");
        assert_eq!(error.type_tag, "AssertionError");
        assert_eq!(error.expected, Some(serde_json::json!(true)));
        assert_eq!(error.actual, Some(serde_json::json!(false)));
        assert!(error.stack.as_deref().unwrap().contains("at step"));

        let (name, end) = &n.sink().emissions()[2];
        assert_eq!(*name, ReporterEventKind::TestEnd);
        assert_eq!(end.duration, 250);
        assert_eq!(end.error, fail.error);
        assert_eq!(n.failure_count(), 1);
    }

    #[test]
    fn outcome_to_status_mapping() {
        let cases = vec![
            (Outcome::Successful, ReporterEventKind::TestPass, false, false),
            (Outcome::Skipped, ReporterEventKind::TestPending, true, false),
            (Outcome::Ignored(problem("ignored")), ReporterEventKind::TestPending, true, true),
            (Outcome::Pending(problem("Step missing")), ReporterEventKind::TestPending, true, true),
            (Outcome::FailedWithError(problem("sorry")), ReporterEventKind::TestFail, false, true),
            (Outcome::Compromised(problem("DB is down")), ReporterEventKind::TestFail, false, true),
        ];

        for (outcome, expected, pending, has_error) in cases {
            let mut n = notifier(OutcomeKind::Ignored);
            let kind = outcome.kind();
            n.notify_of(&scene_starts("s", "Paying", 0)).unwrap();
            n.notify_of(&scene_finished("s", "Paying", outcome, 5)).unwrap();

            let (name, payload) = &n.sink().emissions()[1];
            assert_eq!(*name, expected, "status for {kind}");
            assert_eq!(payload.pending, pending, "pending for {kind}");
            assert_eq!(payload.error.is_some(), has_error, "error for {kind}");
        }
    }

    #[test]
    fn pending_reason_comes_from_error_message() {
        let mut n = notifier(OutcomeKind::Ignored);
        n.notify_of(&scene_starts("s", "Paying", 0)).unwrap();
        n.notify_of(&scene_finished(
            "s",
            "Paying",
            Outcome::Pending(problem("Step missing")),
            5,
        ))
        .unwrap();
        let (_, payload) = &n.sink().emissions()[1];
        assert_eq!(payload.pending_reason.as_deref(), Some("Step missing"));
    }

    #[test]
    fn lenient_threshold_reports_failure_as_pass() {
        let mut n = notifier(OutcomeKind::Compromised);
        n.notify_of(&scene_starts("s", "Paying", 0)).unwrap();
        n.notify_of(&scene_finished(
            "s",
            "Paying",
            Outcome::FailedWithError(problem("flaky")),
            5,
        ))
        .unwrap();

        let (name, payload) = &n.sink().emissions()[1];
        assert_eq!(*name, ReporterEventKind::TestPass);
        assert!(payload.error.is_some());
        assert_eq!(n.failure_count(), 0);
    }

    #[test]
    fn ignored_counts_only_under_stricter_threshold() {
        for (threshold, expected_failures) in [(OutcomeKind::Ignored, 0), (OutcomeKind::Skipped, 1)] {
            let mut n = notifier(threshold);
            n.notify_of(&scene_starts("s", "Paying", 0)).unwrap();
            n.notify_of(&scene_finished(
                "s",
                "Paying",
                Outcome::Ignored(problem("ignored")),
                5,
            ))
            .unwrap();
            assert_eq!(n.sink().count_of(ReporterEventKind::TestPending), 1);
            assert_eq!(n.failure_count(), expected_failures, "threshold {threshold}");
        }
    }

    #[test]
    fn finish_without_start_emits_nothing() {
        let mut n = notifier(OutcomeKind::Ignored);
        let err = n
            .notify_of(&scene_finished(
                "ghost",
                "Paying",
                Outcome::FailedWithError(problem("boom")),
                5,
            ))
            .unwrap_err();

        assert!(matches!(
            err,
            BridgeError::Protocol(ProtocolViolation::NeverRecorded { .. })
        ));
        assert!(n.sink().is_empty());
        assert_eq!(n.failure_count(), 0);
    }

    #[test]
    fn second_finish_is_rejected() {
        let mut n = notifier(OutcomeKind::Ignored);
        n.notify_of(&scene_starts("s", "Paying", 0)).unwrap();
        n.notify_of(&scene_finished("s", "Paying", Outcome::Successful, 5))
            .unwrap();
        let err = n
            .notify_of(&scene_finished("s", "Paying", Outcome::Successful, 6))
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Protocol(ProtocolViolation::AlreadyFinished { .. })
        ));
        assert_eq!(n.sink().emissions().len(), 3);
    }

    #[test]
    fn duplicate_start_is_rejected() {
        let mut n = notifier(OutcomeKind::Ignored);
        n.notify_of(&scene_starts("s", "Paying", 0)).unwrap();
        let err = n.notify_of(&scene_starts("s", "Paying", 1)).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Protocol(ProtocolViolation::DuplicateStart { .. })
        ));
        assert_eq!(n.sink().emissions().len(), 1);
    }

    #[test]
    fn out_of_order_suite_finish_is_rejected() {
        let mut n = notifier(OutcomeKind::Ignored);
        let outer = suite("Payments", "s1");
        let inner = suite("Online Checkout", "s2");
        n.notify_of(&suite_starts(&outer, 0)).unwrap();
        n.notify_of(&suite_starts(&inner, 0)).unwrap();

        let err = n.notify_of(&suite_finished(&outer, 10)).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Protocol(ProtocolViolation::SuiteNestingMismatch { .. })
        ));
        assert_eq!(n.sink().emissions().len(), 2);
        assert_eq!(
            n.open_correlation_ids(),
            vec![CorrelationId::new("s1"), CorrelationId::new("s2")]
        );
    }

    #[test]
    fn scene_finish_cannot_close_a_suite() {
        let mut n = notifier(OutcomeKind::Ignored);
        let checkout = suite("Checkout", "s1");
        n.notify_of(&suite_starts(&checkout, 0)).unwrap();

        let err = n
            .notify_of(&scene_finished("s1", "Paying", Outcome::Successful, 5))
            .unwrap_err();
        match err {
            BridgeError::Protocol(ProtocolViolation::KindMismatch {
                correlation_id,
                expected,
                found,
            }) => {
                assert_eq!(correlation_id, CorrelationId::new("s1"));
                assert_eq!(expected, "scene_starts");
                assert_eq!(found, "test_suite_starts");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(n.sink().names(), vec![ReporterEventKind::SuiteStart]);
        assert_eq!(n.failure_count(), 0);

        // the suite is still open and nests later scenarios
        n.notify_of(&scene_starts("scene-1", "Paying", 6)).unwrap();
        assert_eq!(n.sink().last().unwrap().parent, "Checkout");
        n.notify_of(&scene_finished("scene-1", "Paying", Outcome::Successful, 7))
            .unwrap();
        n.notify_of(&suite_finished(&checkout, 8)).unwrap();
        assert_eq!(n.sink().last().unwrap().kind, ReporterEventKind::SuiteEnd);
        assert!(n.open_correlation_ids().is_empty());
    }

    #[test]
    fn suite_finish_cannot_close_a_scene() {
        let mut n = notifier(OutcomeKind::Ignored);
        n.notify_of(&scene_starts("x", "Paying", 0)).unwrap();

        let err = n.notify_of(&suite_finished(&suite("Paying", "x"), 5)).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Protocol(ProtocolViolation::KindMismatch {
                expected: "test_suite_starts",
                found: "scene_starts",
                ..
            })
        ));
        assert_eq!(n.sink().emissions().len(), 1);
        assert_eq!(n.open_correlation_ids(), vec![CorrelationId::new("x")]);
    }

    #[test]
    fn run_and_tag_events_emit_nothing() {
        let mut n = notifier(OutcomeKind::Ignored);
        n.notify_of(&DomainEvent::TestRunStarts(TestRunStarts { timestamp: at(0) }))
            .unwrap();
        n.notify_of(&scene_starts("s", "Paying", 0)).unwrap();
        n.notify_of(&DomainEvent::SceneTagged(SceneTagged {
            scene_id: CorrelationId::new("s"),
            tag: Tag::Arbitrary {
                name: "retried".into(),
            },
            details: scenario("Paying"),
            timestamp: at(1),
        }))
        .unwrap();
        assert_eq!(n.sink().emissions().len(), 1);
        assert_eq!(n.failure_count(), 0);
    }

    #[test]
    fn code_threshold_behaves_like_kind_threshold() {
        let mut n = Notifier::new(
            RecordingSink::new(),
            NotifierConfig::new("0-1", SuccessThreshold::Code(OutcomeKind::Ignored.code())),
        );
        n.notify_of(&scene_starts("a", "Paying", 0)).unwrap();
        n.notify_of(&scene_finished("a", "Paying", Outcome::Pending(problem("todo")), 1))
            .unwrap();
        n.notify_of(&scene_starts("b", "Paying", 0)).unwrap();
        n.notify_of(&scene_finished("b", "Paying", Outcome::Skipped, 1))
            .unwrap();
        assert_eq!(n.failure_count(), 1);
    }
}
