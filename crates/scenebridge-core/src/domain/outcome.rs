//! Scenario outcomes ranked by severity.
//!
//! The ranking is the declaration order of [`OutcomeKind`], best first.
//! Every kind also has a numeric code (`1 << (6 - rank)`) so thresholds
//! expressed by external runners as plain numbers compare the same way:
//! a lower code is a worse outcome.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::BridgeError;

/// Payload-free discriminant of an [`Outcome`], ordered best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Successful,
    Skipped,
    Ignored,
    Pending,
    FailedWithAssertion,
    FailedWithError,
    Compromised,
}

impl OutcomeKind {
    /// All kinds, best to worst.
    pub const ALL: [OutcomeKind; 7] = [
        OutcomeKind::Successful,
        OutcomeKind::Skipped,
        OutcomeKind::Ignored,
        OutcomeKind::Pending,
        OutcomeKind::FailedWithAssertion,
        OutcomeKind::FailedWithError,
        OutcomeKind::Compromised,
    ];

    /// Severity rank, 0 for the best outcome.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Compatible numeric code; lower is worse.
    pub fn code(self) -> u32 {
        let worst = OutcomeKind::Compromised.rank();
        1 << (worst - self.rank())
    }

    /// Map an exact compatible code back to its kind.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Strict severity comparison.
    pub fn is_worse_than(self, other: OutcomeKind) -> bool {
        self > other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Successful => "successful",
            OutcomeKind::Skipped => "skipped",
            OutcomeKind::Ignored => "ignored",
            OutcomeKind::Pending => "pending",
            OutcomeKind::FailedWithAssertion => "failed_with_assertion",
            OutcomeKind::FailedWithError => "failed_with_error",
            OutcomeKind::Compromised => "compromised",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeKind {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| BridgeError::UnknownOutcomeKind(s.to_string()))
    }
}

/// The error behind a non-successful outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// Error class name, e.g. `AssertionError`.
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Runner-specific type tag; reporters fall back to `name` when absent.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<serde_json::Value>,
}

impl ProblemDetails {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
            type_tag: None,
            expected: None,
            actual: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_type_tag(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    /// Attach the values compared by a failed assertion.
    pub fn with_values(mut self, expected: serde_json::Value, actual: serde_json::Value) -> Self {
        self.expected = Some(expected);
        self.actual = Some(actual);
        self
    }

    /// Type tag, defaulting to the error name.
    pub fn effective_type(&self) -> &str {
        self.type_tag.as_deref().unwrap_or(&self.name)
    }
}

/// Classified result of a finished scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "error", rename_all = "snake_case")]
pub enum Outcome {
    Successful,
    Skipped,
    Ignored(ProblemDetails),
    Pending(ProblemDetails),
    FailedWithAssertion(ProblemDetails),
    FailedWithError(ProblemDetails),
    Compromised(ProblemDetails),
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Successful => OutcomeKind::Successful,
            Outcome::Skipped => OutcomeKind::Skipped,
            Outcome::Ignored(_) => OutcomeKind::Ignored,
            Outcome::Pending(_) => OutcomeKind::Pending,
            Outcome::FailedWithAssertion(_) => OutcomeKind::FailedWithAssertion,
            Outcome::FailedWithError(_) => OutcomeKind::FailedWithError,
            Outcome::Compromised(_) => OutcomeKind::Compromised,
        }
    }

    /// The underlying error, if the variant carries one.
    pub fn problem(&self) -> Option<&ProblemDetails> {
        match self {
            Outcome::Successful | Outcome::Skipped => None,
            Outcome::Ignored(p)
            | Outcome::Pending(p)
            | Outcome::FailedWithAssertion(p)
            | Outcome::FailedWithError(p)
            | Outcome::Compromised(p) => Some(p),
        }
    }

    /// Whether this outcome counts as a failure against `threshold`.
    pub fn is_worse_than(&self, threshold: impl Into<SuccessThreshold>) -> bool {
        threshold.into().is_exceeded_by(self.kind())
    }
}

/// The worst outcome still reported as a pass.
///
/// Either a kind, or a compatible numeric code as supplied by runners that
/// only know the codes. Deserialized through [`FromStr`], so configuration
/// files accept the same spellings as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdRepr", into = "ThresholdRepr")]
pub enum SuccessThreshold {
    Kind(OutcomeKind),
    Code(u32),
}

/// Serialized form of a [`SuccessThreshold`]: a bare code or a kind name.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ThresholdRepr {
    Code(u32),
    Name(String),
}

impl TryFrom<ThresholdRepr> for SuccessThreshold {
    type Error = BridgeError;

    fn try_from(repr: ThresholdRepr) -> Result<Self, Self::Error> {
        match repr {
            ThresholdRepr::Code(code) => Ok(SuccessThreshold::Code(code)),
            ThresholdRepr::Name(name) => name.parse(),
        }
    }
}

impl From<SuccessThreshold> for ThresholdRepr {
    fn from(threshold: SuccessThreshold) -> Self {
        match threshold {
            SuccessThreshold::Kind(kind) => ThresholdRepr::Name(kind.as_str().to_string()),
            SuccessThreshold::Code(code) => ThresholdRepr::Code(code),
        }
    }
}

impl SuccessThreshold {
    /// Strict: the threshold kind itself still passes.
    pub fn is_exceeded_by(&self, kind: OutcomeKind) -> bool {
        match *self {
            SuccessThreshold::Kind(threshold) => kind.is_worse_than(threshold),
            SuccessThreshold::Code(code) => kind.code() < code,
        }
    }

    pub fn code(&self) -> u32 {
        match *self {
            SuccessThreshold::Kind(kind) => kind.code(),
            SuccessThreshold::Code(code) => code,
        }
    }
}

impl Default for SuccessThreshold {
    fn default() -> Self {
        SuccessThreshold::Kind(OutcomeKind::Ignored)
    }
}

impl From<OutcomeKind> for SuccessThreshold {
    fn from(kind: OutcomeKind) -> Self {
        SuccessThreshold::Kind(kind)
    }
}

impl From<&Outcome> for SuccessThreshold {
    fn from(outcome: &Outcome) -> Self {
        SuccessThreshold::Kind(outcome.kind())
    }
}

impl fmt::Display for SuccessThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuccessThreshold::Kind(kind) => write!(f, "{kind}"),
            SuccessThreshold::Code(code) => write!(f, "code {code}"),
        }
    }
}

impl FromStr for SuccessThreshold {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(BridgeError::InvalidThreshold(s.to_string()));
        }
        if let Ok(code) = trimmed.parse::<u32>() {
            return Ok(SuccessThreshold::Code(code));
        }
        trimmed
            .parse::<OutcomeKind>()
            .map(SuccessThreshold::Kind)
            .map_err(|_| BridgeError::InvalidThreshold(s.to_string()))
    }
}
