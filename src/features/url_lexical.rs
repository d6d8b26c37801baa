use super::SignalResult;
use crate::config::EngineConfig;
use crate::domain_utils::DomainUtils;
use regex::RegexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const URL_MODEL_VERSION: &str = "v2.1.0";

const BASE_RISK: f64 = 0.1;
const PATTERN_INCREMENT: f64 = 0.15;
const MALICIOUS_DOMAIN_INCREMENT: f64 = 0.5;
const HIGH_ENTROPY_THRESHOLD: f64 = 4.5;
const HIGH_ENTROPY_INCREMENT: f64 = 0.2;
const TYPOSQUAT_INCREMENT: f64 = 0.25;

/// Informational sub-label of the lexical score. Not the fused risk label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlVerdict {
    Benign,
    Suspicious,
    Malicious,
}

impl UrlVerdict {
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            UrlVerdict::Benign
        } else if score < 0.7 {
            UrlVerdict::Suspicious
        } else {
            UrlVerdict::Malicious
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UrlVerdict::Benign => "benign",
            UrlVerdict::Suspicious => "suspicious",
            UrlVerdict::Malicious => "malicious",
        }
    }
}

/// Scores a raw URL string on lexical and structural phishing indicators
pub struct UrlLexicalAnalyzer {
    patterns: Vec<String>,
    pattern_set: RegexSet,
    malicious_domains: Vec<String>,
    brand_tokens: Vec<String>,
}

impl Default for UrlLexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlLexicalAnalyzer {
    pub fn new() -> Self {
        Self::from_config(&EngineConfig::default())
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let patterns = config.suspicious_patterns.clone();
        let escaped: Vec<String> = patterns
            .iter()
            .map(|p| format!("(?i){}", regex::escape(p)))
            .collect();

        let pattern_set = RegexSet::new(&escaped).unwrap_or_else(|e| {
            log::warn!("Failed to compile suspicious URL patterns, disabling: {}", e);
            RegexSet::empty()
        });

        Self {
            patterns,
            pattern_set,
            malicious_domains: config
                .malicious_domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
            brand_tokens: config.brand_tokens.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    pub fn analyze(&self, url: &str) -> SignalResult {
        let mut risk = BASE_RISK;
        let mut evidence = SignalResult::new(0.0);

        // Every matching pattern adds its own increment
        let matched: Vec<&str> = self
            .pattern_set
            .matches(url)
            .into_iter()
            .map(|i| self.patterns[i].as_str())
            .collect();
        if !matched.is_empty() {
            risk += PATTERN_INCREMENT * matched.len() as f64;
            log::debug!("Suspicious URL patterns in {}: {:?}", url, matched);
            evidence = evidence
                .with("suspicious_pattern", true)
                .with("pattern_matches", matched.len())
                .with("matched_patterns", matched.join(","));
        }

        let domain = DomainUtils::extract_domain(url);
        if let Some(known) = DomainUtils::find_contained(&domain, &self.malicious_domains) {
            risk += MALICIOUS_DOMAIN_INCREMENT;
            log::debug!("Known malicious domain {} in {}", known, url);
            evidence = evidence.with("known_malicious", true);
        }

        let entropy = shannon_entropy(url);
        evidence = evidence.with("entropy", round_to(entropy, 2));
        if entropy > HIGH_ENTROPY_THRESHOLD {
            risk += HIGH_ENTROPY_INCREMENT;
            evidence = evidence.with("high_entropy", true);
        }

        if let Some(brand) = self.typosquatted_brand(&domain) {
            risk += TYPOSQUAT_INCREMENT;
            log::debug!("Domain {} typosquats brand {}", domain, brand);
            evidence = evidence
                .with("typosquat", true)
                .with("typosquat_brand", brand);
        }

        let score = risk.clamp(0.0, 1.0);
        let verdict = UrlVerdict::from_score(score);

        SignalResult {
            score,
            evidence: evidence.evidence,
        }
        .with("domain", domain)
        .with("verdict", verdict.as_str())
    }

    /// A brand token inside the domain that the domain doesn't start with.
    /// Legitimate subdomains like `www.nseindia.com` are flagged too.
    fn typosquatted_brand(&self, domain: &str) -> Option<&str> {
        self.brand_tokens
            .iter()
            .find(|token| domain.contains(token.as_str()) && !domain.starts_with(token.as_str()))
            .map(String::as_str)
    }
}

/// Shannon entropy in bits over the character distribution of `text`
pub fn shannon_entropy(text: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }

    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::EvidenceValue;

    #[test]
    fn test_entropy() {
        assert_eq!(shannon_entropy(""), 0.0);
        assert_eq!(shannon_entropy("aaaa"), 0.0);
        assert!((shannon_entropy("ab") - 1.0).abs() < 1e-12);
        assert!((shannon_entropy("abcd") - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pattern_detection() {
        let analyzer = UrlLexicalAnalyzer::new();
        let result = analyzer.analyze("https://guaranteed-returns.in/invest");

        assert!(result.flag("suspicious_pattern"));
        assert!(!result.flag("known_malicious"));
        assert!(!result.flag("typosquat"));
        assert!(result.score >= 0.25);
        assert_eq!(
            result.get("domain"),
            Some(&EvidenceValue::Text("guaranteed-returns.in".to_string()))
        );
    }

    #[test]
    fn test_patterns_accumulate_case_insensitively() {
        let analyzer = UrlLexicalAnalyzer::new();
        let result = analyzer.analyze("https://example.com/HOT-STOCK/insider-tip");

        assert_eq!(result.get("pattern_matches"), Some(&EvidenceValue::Int(2)));
        assert!(result.score >= 0.1 + 0.3 - 1e-9);
    }

    #[test]
    fn test_known_malicious_domain() {
        let analyzer = UrlLexicalAnalyzer::new();
        let result = analyzer.analyze("https://scam-broker.com/offer");

        assert!(result.flag("known_malicious"));
        assert!(result.score >= 0.6 - 1e-9);
        assert_eq!(
            result.get("verdict"),
            Some(&EvidenceValue::Text("suspicious".to_string()))
        );
    }

    #[test]
    fn test_typosquat_detection() {
        let analyzer = UrlLexicalAnalyzer::new();

        let result = analyzer.analyze("https://fake-zerodha.in/open-account");
        assert!(result.flag("typosquat"));
        assert_eq!(
            result.get("typosquat_brand"),
            Some(&EvidenceValue::Text("zerodha".to_string()))
        );

        let result = analyzer.analyze("https://nse.in/announcements");
        assert!(!result.flag("typosquat"));
    }

    #[test]
    fn test_authority_is_scored_as_written() {
        let analyzer = UrlLexicalAnalyzer::new();

        // Userinfo stays part of the domain
        let result = analyzer.analyze("https://evil@nse.in/x");
        assert_eq!(
            result.get("domain"),
            Some(&EvidenceValue::Text("evil@nse.in".to_string()))
        );
        assert!(result.flag("typosquat"));
        assert!((result.score - 0.35).abs() < 1e-9);

        let result = analyzer.analyze("https://scam-broker.com@example.org/");
        assert!(result.flag("known_malicious"));
        assert!((result.score - 0.6).abs() < 1e-9);

        // Percent-escapes are not decoded
        let result = analyzer.analyze("https://sc%61m-broker.com/");
        assert!(!result.flag("known_malicious"));
        assert!((result.score - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_high_entropy_flag() {
        let analyzer = UrlLexicalAnalyzer::new();
        let result = analyzer.analyze("https://a1b2c3d4e5f6g7h8.io/QxZ9-kL3_mW7?t=Vb8Rn2Yp");

        assert!(result.flag("high_entropy"));
        match result.get("entropy") {
            Some(EvidenceValue::Float(h)) => assert!(*h > 4.5),
            other => panic!("unexpected entropy evidence: {other:?}"),
        }
    }

    #[test]
    fn test_score_is_clamped() {
        let analyzer = UrlLexicalAnalyzer::new();
        let result = analyzer.analyze(
            "https://fake-sebi.in/guaranteed-return/double-money/insider-tip/hot-stock/quick-rich",
        );

        assert_eq!(result.score, 1.0);
        assert_eq!(
            result.get("verdict"),
            Some(&EvidenceValue::Text("malicious".to_string()))
        );
    }

    #[test]
    fn test_malformed_input_never_fails() {
        let analyzer = UrlLexicalAnalyzer::new();

        let result = analyzer.analyze("");
        assert!((result.score - 0.1).abs() < 1e-12);
        assert_eq!(result.get("entropy"), Some(&EvidenceValue::Float(0.0)));

        let result = analyzer.analyze("no scheme here");
        assert!(result.score >= 0.0 && result.score <= 1.0);
        assert_eq!(
            result.get("domain"),
            Some(&EvidenceValue::Text("no scheme here".to_string()))
        );
    }

    #[test]
    fn test_verdict_bands() {
        assert_eq!(UrlVerdict::from_score(0.29), UrlVerdict::Benign);
        assert_eq!(UrlVerdict::from_score(0.3), UrlVerdict::Suspicious);
        assert_eq!(UrlVerdict::from_score(0.7), UrlVerdict::Malicious);
    }
}
