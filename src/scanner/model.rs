use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type TabId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    Safe,
    Suspicious,
    Malicious,
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Risk::Safe => f.write_str("safe"),
            Risk::Suspicious => f.write_str("suspicious"),
            Risk::Malicious => f.write_str("malicious"),
        }
    }
}

impl FromStr for Risk {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "safe" => Ok(Risk::Safe),
            "suspicious" => Ok(Risk::Suspicious),
            "malicious" => Ok(Risk::Malicious),
            other => Err(ScanError::Classifier(format!("unknown risk tier `{other}`"))),
        }
    }
}

/// Classification result for a single URL. Built once from classifier
/// output and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub risk: Risk,
    pub score: f64,
    pub reasons: Vec<String>,
}

impl Verdict {
    pub fn new(risk: Risk, score: f64, reasons: Vec<String>) -> Result<Self, ScanError> {
        let verdict = Self { risk, score, reasons };
        verdict.validate()?;
        Ok(verdict)
    }

    /// Scores outside [0, 1] never enter the cache.
    pub fn validate(&self) -> Result<(), ScanError> {
        if !(0.0..=1.0).contains(&self.score) {
            return Err(ScanError::Classifier(format!(
                "score {} out of range",
                self.score
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum ScanError {
    #[error("url does not use an http(s) scheme")]
    NotScannable,

    #[error("classifier unreachable: {0}")]
    Network(String),

    #[error("classifier error: {0}")]
    Classifier(String),

    #[error("list mutation rejected: {0}")]
    ListMutation(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanContext {
    pub tab: Option<TabId>,
}

impl ScanContext {
    #[must_use]
    pub fn for_tab(tab: TabId) -> Self {
        Self { tab: Some(tab) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Allow,
    Deny,
    Report,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlaggedLink {
    pub url: String,
    pub verdict: Verdict,
}

/// Aggregate of a bulk link scan. `total` counts the deduplicated input,
/// including elements past the batch cap or dropped by failures.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub safe: usize,
    pub suspicious: usize,
    pub malicious: usize,
    pub flagged: Vec<FlaggedLink>,
}
