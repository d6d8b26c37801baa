//! Fusion Engine
//!
//! Runs the URL analyzer and the five context evaluators, combines their
//! scores with a fixed weight vector, labels the result and picks the top
//! signals to explain it.

use crate::collaborators::{
    AdvisorRegistry, AnnouncementVerifier, ClusterEstimator, HashDenylistInspector,
    MediaInspector, OfficialAnnouncementList, StaticAdvisorRegistry, StaticClusterEstimator,
};
use crate::config::EngineConfig;
use crate::context::Context;
use crate::features::advisor_identity::AdvisorIdentityEvaluator;
use crate::features::announcement_credibility::AnnouncementCredibilityEvaluator;
use crate::features::app_impersonation::AppImpersonationEvaluator;
use crate::features::media_fabrication::MediaFabricationEvaluator;
use crate::features::social_coordination::SocialCoordinationEvaluator;
use crate::features::url_lexical::{round_to, UrlLexicalAnalyzer, URL_MODEL_VERSION};
use crate::features::{Evidence, Signal, SignalEvaluator, SignalResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub const FUSION_MODEL_VERSION: &str = "v1.0.0";

/// Scores at or above this are labelled medium
pub const MEDIUM_THRESHOLD: f64 = 0.45;
/// Scores at or above this are labelled high
pub const HIGH_THRESHOLD: f64 = 0.75;

pub const URL_DISCLOSURE_THRESHOLD: f64 = 0.5;
pub const CONTEXT_DISCLOSURE_THRESHOLD: f64 = 0.3;
pub const MAX_EXPLANATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalWeights {
    pub url: f64,
    pub identity: f64,
    pub social: f64,
    pub app_impersonation: f64,
    pub media: f64,
    pub announcement: f64,
}

/// Engine-owned weight vector. Sums to 1.0.
pub const WEIGHTS: SignalWeights = SignalWeights {
    url: 0.45,
    identity: 0.15,
    social: 0.15,
    app_impersonation: 0.10,
    media: 0.10,
    announcement: 0.05,
};

impl SignalWeights {
    pub fn get(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Url => self.url,
            Signal::Identity => self.identity,
            Signal::Social => self.social,
            Signal::AppImpersonation => self.app_impersonation,
            Signal::Media => self.media,
            Signal::Announcement => self.announcement,
        }
    }

    pub fn total(&self) -> f64 {
        Signal::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

/// Minimum raw score before a component is named in the explanations.
/// The URL component dominates the weights and gets a higher bar.
pub fn disclosure_threshold(signal: Signal) -> f64 {
    match signal {
        Signal::Url => URL_DISCLOSURE_THRESHOLD,
        _ => CONTEXT_DISCLOSURE_THRESHOLD,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLabel {
    Low,
    Medium,
    High,
}

impl RiskLabel {
    pub fn from_score(score: f64) -> Self {
        if score < MEDIUM_THRESHOLD {
            RiskLabel::Low
        } else if score < HIGH_THRESHOLD {
            RiskLabel::Medium
        } else {
            RiskLabel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low => "low",
            RiskLabel::Medium => "medium",
            RiskLabel::High => "high",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-component scores and the fused score, rounded to 3 decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub url: f64,
    pub identity: f64,
    pub social: f64,
    pub app_impersonation: f64,
    pub media: f64,
    pub announcement: f64,
    #[serde(rename = "final")]
    pub final_score: f64,
}

impl ComponentScores {
    pub fn get(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Url => self.url,
            Signal::Identity => self.identity,
            Signal::Social => self.social,
            Signal::AppImpersonation => self.app_impersonation,
            Signal::Media => self.media,
            Signal::Announcement => self.announcement,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub signal: String,
    pub value: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub url: String,
    pub scores: ComponentScores,
    pub label: RiskLabel,
    pub explanations: Vec<Explanation>,
    pub evidence: BTreeMap<String, Evidence>,
    pub model_versions: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl FusionResult {
    /// Equality on everything except the creation timestamp
    pub fn same_outcome(&self, other: &FusionResult) -> bool {
        self.url == other.url
            && self.scores == other.scores
            && self.label == other.label
            && self.explanations == other.explanations
            && self.evidence == other.evidence
            && self.model_versions == other.model_versions
    }
}

/// Stateless scorer. Share it behind an `Arc` across any number of callers.
pub struct FusionEngine {
    url_analyzer: UrlLexicalAnalyzer,
    identity: AdvisorIdentityEvaluator,
    social: SocialCoordinationEvaluator,
    app_impersonation: AppImpersonationEvaluator,
    media: MediaFabricationEvaluator,
    announcement: AnnouncementCredibilityEvaluator,
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FusionEngine {
    pub fn new() -> Self {
        Self::from_config(&EngineConfig::default())
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: &EngineConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    pub fn score(&self, url: &str, context: Option<&Context>) -> FusionResult {
        let empty = Context::default();
        let context = context.unwrap_or(&empty);

        let context_evaluators: [(Signal, &dyn SignalEvaluator); 5] = [
            (Signal::Identity, &self.identity),
            (Signal::Social, &self.social),
            (Signal::AppImpersonation, &self.app_impersonation),
            (Signal::Media, &self.media),
            (Signal::Announcement, &self.announcement),
        ];

        let mut results: Vec<(Signal, SignalResult)> = Vec::with_capacity(Signal::ALL.len());
        results.push((Signal::Url, self.url_analyzer.analyze(url)));
        for (signal, evaluator) in context_evaluators {
            let result = evaluator.evaluate(context);
            log::debug!("{} scored {:.3}", evaluator.name(), result.score);
            results.push((signal, result));
        }

        let raw_final: f64 = results
            .iter()
            .map(|(signal, result)| WEIGHTS.get(*signal) * result.score)
            .sum::<f64>()
            .clamp(0.0, 1.0);

        let score_of = |wanted: Signal| {
            results
                .iter()
                .find(|(signal, _)| *signal == wanted)
                .map(|(_, result)| round_to(result.score, 3))
                .unwrap_or(0.0)
        };

        let scores = ComponentScores {
            url: score_of(Signal::Url),
            identity: score_of(Signal::Identity),
            social: score_of(Signal::Social),
            app_impersonation: score_of(Signal::AppImpersonation),
            media: score_of(Signal::Media),
            announcement: score_of(Signal::Announcement),
            final_score: round_to(raw_final, 3),
        };

        // Label the reported score so the output is always threshold-consistent
        let label = RiskLabel::from_score(scores.final_score);
        let explanations = Self::build_explanations(&results);

        log::debug!(
            "Fused score {:.3} ({}) for {} with {} explanation(s)",
            scores.final_score,
            label,
            url,
            explanations.len()
        );

        let evidence = results
            .into_iter()
            .map(|(signal, result)| (signal.key().to_string(), result.evidence))
            .collect();

        let mut model_versions = BTreeMap::new();
        model_versions.insert("url_model".to_string(), URL_MODEL_VERSION.to_string());
        model_versions.insert("fusion".to_string(), FUSION_MODEL_VERSION.to_string());

        FusionResult {
            url: url.to_string(),
            scores,
            label,
            explanations,
            evidence,
            model_versions,
            created_at: Utc::now(),
        }
    }

    /// Components above their disclosure threshold, strongest first, at most three
    fn build_explanations(results: &[(Signal, SignalResult)]) -> Vec<Explanation> {
        let mut explanations: Vec<Explanation> = results
            .iter()
            .filter(|(signal, result)| result.score > disclosure_threshold(*signal))
            .map(|(signal, result)| Explanation {
                signal: signal.explanation_name().to_string(),
                value: round_to(result.score, 3),
                weight: WEIGHTS.get(*signal),
            })
            .collect();

        // Stable sort keeps component order among equal values
        explanations.sort_by(|a, b| b.value.total_cmp(&a.value));
        explanations.truncate(MAX_EXPLANATIONS);
        explanations
    }
}

/// Assembles a [`FusionEngine`], defaulting every collaborator to its
/// config-backed implementation.
pub struct EngineBuilder {
    config: EngineConfig,
    advisor_registry: Option<Arc<dyn AdvisorRegistry>>,
    cluster_estimator: Option<Arc<dyn ClusterEstimator>>,
    media_inspector: Option<Arc<dyn MediaInspector>>,
    announcement_verifier: Option<Arc<dyn AnnouncementVerifier>>,
}

impl EngineBuilder {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
            advisor_registry: None,
            cluster_estimator: None,
            media_inspector: None,
            announcement_verifier: None,
        }
    }

    pub fn advisor_registry(mut self, registry: Arc<dyn AdvisorRegistry>) -> Self {
        self.advisor_registry = Some(registry);
        self
    }

    pub fn cluster_estimator(mut self, estimator: Arc<dyn ClusterEstimator>) -> Self {
        self.cluster_estimator = Some(estimator);
        self
    }

    pub fn media_inspector(mut self, inspector: Arc<dyn MediaInspector>) -> Self {
        self.media_inspector = Some(inspector);
        self
    }

    pub fn announcement_verifier(mut self, verifier: Arc<dyn AnnouncementVerifier>) -> Self {
        self.announcement_verifier = Some(verifier);
        self
    }

    pub fn build(self) -> FusionEngine {
        let config = &self.config;

        let registry = self
            .advisor_registry
            .unwrap_or_else(|| Arc::new(StaticAdvisorRegistry::from_config(config)));
        let estimator = self
            .cluster_estimator
            .unwrap_or_else(|| Arc::new(StaticClusterEstimator::from_config(config)));
        let inspector = self
            .media_inspector
            .unwrap_or_else(|| Arc::new(HashDenylistInspector::from_config(config)));
        let verifier = self
            .announcement_verifier
            .unwrap_or_else(|| Arc::new(OfficialAnnouncementList::from_config(config)));

        FusionEngine {
            url_analyzer: UrlLexicalAnalyzer::from_config(config),
            identity: AdvisorIdentityEvaluator::new(registry),
            social: SocialCoordinationEvaluator::new(estimator),
            app_impersonation: AppImpersonationEvaluator::from_config(config),
            media: MediaFabricationEvaluator::new(inspector),
            announcement: AnnouncementCredibilityEvaluator::new(config, verifier),
        }
    }
}
