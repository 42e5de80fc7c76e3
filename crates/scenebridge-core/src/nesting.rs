//! Stack of currently open suites.

use crate::domain::{CorrelationId, ProtocolViolation, TestSuiteDetails};

/// Open suites, outermost first.
#[derive(Debug, Default)]
pub struct SuiteStack {
    suites: Vec<TestSuiteDetails>,
}

impl SuiteStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, details: TestSuiteDetails) {
        self.suites.push(details);
    }

    /// Pop the innermost suite, which must be the one identified by `id`.
    pub fn exit(&mut self, id: &CorrelationId) -> Result<TestSuiteDetails, ProtocolViolation> {
        match self.suites.last() {
            Some(innermost) if innermost.correlation_id == *id => {
                self.suites.pop().ok_or_else(|| ProtocolViolation::SuiteNestingMismatch {
                    finished: id.clone(),
                    innermost: None,
                })
            }
            other => Err(ProtocolViolation::SuiteNestingMismatch {
                finished: id.clone(),
                innermost: other.map(|s| s.correlation_id.clone()),
            }),
        }
    }

    /// Name of the innermost open suite, or `""` at the top level.
    pub fn current_parent_name(&self) -> &str {
        self.suites.last().map(|s| s.name.as_str()).unwrap_or("")
    }

    /// Open suite names followed by `name`, space-joined.
    pub fn full_name_path(&self, name: &str) -> String {
        self.suites
            .iter()
            .map(|s| s.name.as_str())
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn depth(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}
