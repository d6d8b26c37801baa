//! External lookups the context evaluators depend on.
//!
//! Each evaluator talks to exactly one of these traits. The static
//! implementations here are backed by [`EngineConfig`] data; deployments with
//! live registries or detectors provide their own implementations and hand
//! them to [`crate::fusion::EngineBuilder`].

use crate::config::{ClusterObservation, EngineConfig};
use crate::context::MediaReference;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// A collaborator could not answer. Distinct from a negative answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    Unavailable(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::Unavailable(reason) => write!(f, "collaborator unavailable: {reason}"),
        }
    }
}

impl std::error::Error for LookupError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClusterEstimate {
    pub cluster_size: u32,
    pub time_window_minutes: u32,
}

impl From<ClusterObservation> for ClusterEstimate {
    fn from(observation: ClusterObservation) -> Self {
        Self {
            cluster_size: observation.cluster_size,
            time_window_minutes: observation.time_window_minutes,
        }
    }
}

pub trait AdvisorRegistry: Send + Sync {
    /// Registry id when the mentioned handles resolve, `None` when they don't
    fn lookup(&self, handles: &[String]) -> Result<Option<String>, LookupError>;
}

pub trait ClusterEstimator: Send + Sync {
    fn estimate(&self, tickers: &[String]) -> Result<ClusterEstimate, LookupError>;
}

pub trait MediaInspector: Send + Sync {
    /// `true` when manipulation indicators were found
    fn inspect(&self, media: &[MediaReference]) -> Result<bool, LookupError>;
}

pub trait AnnouncementVerifier: Send + Sync {
    /// `true` when the announcement matches an official source
    fn verify(&self, text: &str) -> Result<bool, LookupError>;
}

/// Handles are compared without a leading `@` and case-insensitively
pub fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_lowercase()
}

/// Registry of known advisors. Every mentioned handle must be registered for
/// the mention set to resolve; the first handle's id is reported.
#[derive(Debug, Clone, Default)]
pub struct StaticAdvisorRegistry {
    entries: BTreeMap<String, String>,
}

impl StaticAdvisorRegistry {
    pub fn new(entries: &BTreeMap<String, String>) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(handle, id)| (normalize_handle(handle), id.clone()))
                .collect(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.advisor_registry)
    }
}

impl AdvisorRegistry for StaticAdvisorRegistry {
    fn lookup(&self, handles: &[String]) -> Result<Option<String>, LookupError> {
        let mut first_id = None;
        for handle in handles {
            match self.entries.get(&normalize_handle(handle)) {
                Some(id) => {
                    if first_id.is_none() {
                        first_id = Some(id.clone());
                    }
                }
                None => {
                    log::debug!("Advisor handle not in registry: {}", handle);
                    return Ok(None);
                }
            }
        }
        Ok(first_id)
    }
}

/// Posting clusters observed ahead of time, keyed by ticker
#[derive(Debug, Clone, Default)]
pub struct StaticClusterEstimator {
    observations: BTreeMap<String, ClusterObservation>,
}

impl StaticClusterEstimator {
    pub fn new(observations: &BTreeMap<String, ClusterObservation>) -> Self {
        Self {
            observations: observations
                .iter()
                .map(|(ticker, obs)| (ticker.trim().to_uppercase(), *obs))
                .collect(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.posting_clusters)
    }
}

impl ClusterEstimator for StaticClusterEstimator {
    fn estimate(&self, tickers: &[String]) -> Result<ClusterEstimate, LookupError> {
        // The largest cluster wins; its window is reported alongside it
        let largest = tickers
            .iter()
            .filter_map(|t| self.observations.get(&t.trim().to_uppercase()))
            .max_by_key(|obs| obs.cluster_size);

        Ok(largest.map(|obs| ClusterEstimate::from(*obs)).unwrap_or_default())
    }
}

/// Flags media whose content hash is on a list of known fabrications
#[derive(Debug, Clone, Default)]
pub struct HashDenylistInspector {
    fabricated: HashSet<String>,
}

impl HashDenylistInspector {
    pub fn new(hashes: &[String]) -> Self {
        Self {
            fabricated: hashes.iter().map(|h| h.trim().to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.fabricated_media_hashes)
    }
}

impl MediaInspector for HashDenylistInspector {
    fn inspect(&self, media: &[MediaReference]) -> Result<bool, LookupError> {
        Ok(media.iter().any(|item| {
            item.content_hash
                .as_deref()
                .map(|h| self.fabricated.contains(&h.trim().to_lowercase()))
                .unwrap_or(false)
        }))
    }
}

/// Verifies announcements against a list of officially published phrases
#[derive(Debug, Clone, Default)]
pub struct OfficialAnnouncementList {
    phrases: Vec<String>,
}

impl OfficialAnnouncementList {
    pub fn new(phrases: &[String]) -> Self {
        Self {
            phrases: phrases.iter().map(|p| p.trim().to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.official_announcements)
    }
}

impl AnnouncementVerifier for OfficialAnnouncementList {
    fn verify(&self, text: &str) -> Result<bool, LookupError> {
        let text_lower = text.to_lowercase();
        Ok(self.phrases.iter().any(|p| text_lower.contains(p.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn create_test_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config
            .advisor_registry
            .insert("@Ravi_Capital".to_string(), "SEBI/RA/1234".to_string());
        config
            .advisor_registry
            .insert("meena_invest".to_string(), "SEBI/RA/5678".to_string());
        config.posting_clusters.insert(
            "PUMPCO".to_string(),
            ClusterObservation {
                cluster_size: 30,
                time_window_minutes: 12,
            },
        );
        config.posting_clusters.insert(
            "infy".to_string(),
            ClusterObservation {
                cluster_size: 4,
                time_window_minutes: 50,
            },
        );
        config.fabricated_media_hashes.push("ABC123".to_string());
        config
            .official_announcements
            .push("Reliance bonus issue 1:1".to_string());
        config
    }

    #[test]
    fn test_registry_requires_every_handle() {
        let registry = StaticAdvisorRegistry::from_config(&create_test_config());

        assert_eq!(
            registry.lookup(&handles(&["@ravi_capital"])).unwrap(),
            Some("SEBI/RA/1234".to_string())
        );
        assert_eq!(
            registry
                .lookup(&handles(&["meena_invest", "@RAVI_CAPITAL"]))
                .unwrap(),
            Some("SEBI/RA/5678".to_string())
        );
        assert_eq!(
            registry
                .lookup(&handles(&["@ravi_capital", "@pump_guru"]))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_cluster_estimator_reports_largest_cluster() {
        let estimator = StaticClusterEstimator::from_config(&create_test_config());

        let estimate = estimator
            .estimate(&handles(&["INFY", "pumpco", "UNKNOWN"]))
            .unwrap();
        assert_eq!(estimate.cluster_size, 30);
        assert_eq!(estimate.time_window_minutes, 12);

        let estimate = estimator.estimate(&handles(&["UNKNOWN"])).unwrap();
        assert_eq!(estimate, ClusterEstimate::default());
    }

    #[test]
    fn test_hash_denylist_inspector() {
        let inspector = HashDenylistInspector::from_config(&create_test_config());

        let flagged = vec![
            MediaReference::new("image", None),
            MediaReference::new("video", Some("abc123")),
        ];
        let clean = vec![MediaReference::new("image", Some("ffff"))];

        assert!(inspector.inspect(&flagged).unwrap());
        assert!(!inspector.inspect(&clean).unwrap());
    }

    #[test]
    fn test_official_announcement_list() {
        let verifier = OfficialAnnouncementList::from_config(&create_test_config());

        assert!(verifier
            .verify("RELIANCE BONUS ISSUE 1:1 announced today")
            .unwrap());
        assert!(!verifier.verify("Secret IPO allotment, pay now").unwrap());
    }

    #[test]
    fn test_lookup_error_display() {
        let err = LookupError::Unavailable("registry timeout".to_string());
        assert_eq!(err.to_string(), "collaborator unavailable: registry timeout");
    }
}
