pub mod advisor_identity;
pub mod announcement_credibility;
pub mod app_impersonation;
pub mod media_fabrication;
pub mod social_coordination;
pub mod url_lexical;

use crate::context::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single scalar fact recorded by an evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvidenceValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for EvidenceValue {
    fn from(value: bool) -> Self {
        EvidenceValue::Bool(value)
    }
}

impl From<i64> for EvidenceValue {
    fn from(value: i64) -> Self {
        EvidenceValue::Int(value)
    }
}

impl From<u32> for EvidenceValue {
    fn from(value: u32) -> Self {
        EvidenceValue::Int(i64::from(value))
    }
}

impl From<usize> for EvidenceValue {
    fn from(value: usize) -> Self {
        EvidenceValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for EvidenceValue {
    fn from(value: f64) -> Self {
        EvidenceValue::Float(value)
    }
}

impl From<&str> for EvidenceValue {
    fn from(value: &str) -> Self {
        EvidenceValue::Text(value.to_string())
    }
}

impl From<String> for EvidenceValue {
    fn from(value: String) -> Self {
        EvidenceValue::Text(value)
    }
}

impl<T: Into<EvidenceValue>> From<Option<T>> for EvidenceValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(EvidenceValue::Null)
    }
}

/// Diagnostic facts keyed by name. Ordered so serialized output is stable.
pub type Evidence = BTreeMap<String, EvidenceValue>;

/// Outcome of one evaluator: a score in [0, 1] plus the facts behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub score: f64,
    pub evidence: Evidence,
}

impl SignalResult {
    pub fn new(score: f64) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            evidence: Evidence::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<EvidenceValue>) -> Self {
        self.evidence.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&EvidenceValue> {
        self.evidence.get(key)
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.evidence.get(key), Some(EvidenceValue::Bool(true)))
    }
}

/// Scores one aspect of the caller-supplied context.
///
/// Implementations must return a neutral score when the field they inspect is
/// absent, and must never fail.
pub trait SignalEvaluator: Send + Sync {
    fn evaluate(&self, context: &Context) -> SignalResult;
    fn name(&self) -> &str;
}

/// The six fused components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Url,
    Identity,
    Social,
    AppImpersonation,
    Media,
    Announcement,
}

impl Signal {
    pub const ALL: [Signal; 6] = [
        Signal::Url,
        Signal::Identity,
        Signal::Social,
        Signal::AppImpersonation,
        Signal::Media,
        Signal::Announcement,
    ];

    /// Key used for this component in score and evidence maps
    pub fn key(&self) -> &'static str {
        match self {
            Signal::Url => "url",
            Signal::Identity => "identity",
            Signal::Social => "social",
            Signal::AppImpersonation => "app_impersonation",
            Signal::Media => "media",
            Signal::Announcement => "announcement",
        }
    }

    /// Name shown to analysts when the component is disclosed
    pub fn explanation_name(&self) -> &'static str {
        match self {
            Signal::Url => "url_risk",
            Signal::Identity => "unregistered_advisor",
            Signal::Social => "coordinated_campaign",
            Signal::AppImpersonation => "app_impersonation",
            Signal::Media => "media_manipulation",
            Signal::Announcement => "false_announcement",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
