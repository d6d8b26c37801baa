use anyhow::{bail, Context as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Observed coordinated posting activity for one ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterObservation {
    pub cluster_size: u32,
    pub time_window_minutes: u32,
}

/// Static data consumed by the analyzers and the config-backed collaborators.
///
/// Weights and thresholds are engine constants and deliberately absent here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub suspicious_patterns: Vec<String>,
    pub malicious_domains: Vec<String>,
    pub brand_tokens: Vec<String>,
    pub legitimate_apps: Vec<String>,
    pub announcement_keywords: Vec<String>,
    /// Registered advisor handle -> registry id
    pub advisor_registry: BTreeMap<String, String>,
    /// Ticker -> observed posting cluster
    pub posting_clusters: BTreeMap<String, ClusterObservation>,
    pub fabricated_media_hashes: Vec<String>,
    pub official_announcements: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            suspicious_patterns: strings(&[
                "guaranteed-return",
                "double-money",
                "insider-tip",
                "free-advice",
                "hot-stock",
                "pump-profit",
                "quick-rich",
            ]),
            malicious_domains: strings(&["scam-broker.com", "fake-sebi.in", "phish-trade.net"]),
            brand_tokens: strings(&["sebi", "nse", "bse", "zerodha", "groww", "upstox"]),
            legitimate_apps: strings(&["Zerodha", "Groww", "Upstox", "Angel One", "ICICI Direct"]),
            announcement_keywords: strings(&["ipo", "dividend", "split", "bonus"]),
            advisor_registry: BTreeMap::new(),
            posting_clusters: BTreeMap::new(),
            fabricated_media_hashes: Vec::new(),
            official_announcements: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {path}"))?;
        let config: EngineConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {path}"))?;
        config.validate()?;
        log::info!(
            "Loaded engine configuration from {} ({} patterns, {} registered advisors)",
            path,
            config.suspicious_patterns.len(),
            config.advisor_registry.len()
        );
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {path}"))?;
        Ok(())
    }

    /// Reject entries that would match everything or nothing
    pub fn validate(&self) -> anyhow::Result<()> {
        let lists = [
            ("suspicious_patterns", &self.suspicious_patterns),
            ("malicious_domains", &self.malicious_domains),
            ("brand_tokens", &self.brand_tokens),
            ("legitimate_apps", &self.legitimate_apps),
            ("announcement_keywords", &self.announcement_keywords),
            ("fabricated_media_hashes", &self.fabricated_media_hashes),
            ("official_announcements", &self.official_announcements),
        ];

        for (name, entries) in lists {
            if let Some(index) = entries.iter().position(|e| e.trim().is_empty()) {
                bail!("{name}[{index}] is empty");
            }
        }

        for (handle, registry_id) in &self.advisor_registry {
            if handle.trim_start_matches('@').trim().is_empty() {
                bail!("advisor_registry contains an empty handle");
            }
            if registry_id.trim().is_empty() {
                bail!("advisor_registry entry for {handle} has no registry id");
            }
        }

        Ok(())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
