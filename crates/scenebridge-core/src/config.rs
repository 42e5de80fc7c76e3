//! Bridge configuration.
//!
//! Loaded from TOML; every field is optional:
//!
//! ```toml
//! cid = "0-0"
//! specs = ["features/checkout.feature"]
//! runner = "cucumber"
//! strict = false
//! success_threshold = "pending"   # or a compatible code, e.g. 8
//! format = "pretty"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{BridgeError, OutcomeKind, Result, SuccessThreshold};
use crate::notifier::NotifierConfig;

/// Test runner adapter feeding the bridge; decides the default threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerKind {
    #[default]
    Mocha,
    Jasmine,
    Cucumber,
}

impl RunnerKind {
    /// Threshold used when none is configured explicitly.
    ///
    /// Non-strict cucumber runs let pending steps pass.
    pub fn default_threshold(self, strict: bool) -> SuccessThreshold {
        match self {
            RunnerKind::Mocha | RunnerKind::Jasmine => OutcomeKind::Ignored.into(),
            RunnerKind::Cucumber if strict => OutcomeKind::Ignored.into(),
            RunnerKind::Cucumber => OutcomeKind::Pending.into(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunnerKind::Mocha => "mocha",
            RunnerKind::Jasmine => "jasmine",
            RunnerKind::Cucumber => "cucumber",
        }
    }
}

impl fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunnerKind {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mocha" => Ok(RunnerKind::Mocha),
            "jasmine" => Ok(RunnerKind::Jasmine),
            "cucumber" => Ok(RunnerKind::Cucumber),
            other => Err(BridgeError::Config(format!("unknown runner: {other}"))),
        }
    }
}

/// Encoding of the translated stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    JsonLines,
    Pretty,
}

impl FromStr for OutputFormat {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json-lines" | "jsonl" => Ok(OutputFormat::JsonLines),
            "pretty" => Ok(OutputFormat::Pretty),
            other => Err(BridgeError::Config(format!("unknown output format: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Worker identifier; must be unique among workers sharing a reporter.
    pub cid: String,
    pub specs: Vec<String>,
    pub runner: RunnerKind,
    /// Only meaningful for cucumber.
    pub strict: bool,
    /// Overrides the runner's default threshold.
    pub success_threshold: Option<SuccessThreshold>,
    pub format: OutputFormat,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            cid: "0-0".to_string(),
            specs: Vec::new(),
            runner: RunnerKind::default(),
            strict: true,
            success_threshold: None,
            format: OutputFormat::default(),
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: BridgeConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading bridge configuration");
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cid.trim().is_empty() {
            return Err(BridgeError::Config("cid must not be empty".to_string()));
        }
        if self.cid.chars().any(char::is_whitespace) {
            return Err(BridgeError::Config(format!(
                "cid must not contain whitespace: {:?}",
                self.cid
            )));
        }
        Ok(())
    }

    pub fn effective_threshold(&self) -> SuccessThreshold {
        self.success_threshold
            .unwrap_or_else(|| self.runner.default_threshold(self.strict))
    }

    pub fn notifier_config(&self) -> NotifierConfig {
        NotifierConfig::new(self.cid.clone(), self.effective_threshold())
            .with_specs(self.specs.clone())
    }
}
