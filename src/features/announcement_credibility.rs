use super::{SignalEvaluator, SignalResult};
use crate::collaborators::AnnouncementVerifier;
use crate::config::EngineConfig;
use crate::context::Context;
use regex::Regex;
use std::sync::Arc;

const NEUTRAL_SCORE: f64 = 0.05;
const VERIFIED_SCORE: f64 = 0.05;
const UNVERIFIED_SCORE: f64 = 0.7;

/// Cross-checks corporate-action claims in the message text
pub struct AnnouncementCredibilityEvaluator {
    keyword_regex: Option<Regex>,
    verifier: Arc<dyn AnnouncementVerifier>,
}

impl AnnouncementCredibilityEvaluator {
    pub fn new(config: &EngineConfig, verifier: Arc<dyn AnnouncementVerifier>) -> Self {
        Self {
            keyword_regex: build_keyword_regex(&config.announcement_keywords),
            verifier,
        }
    }

    /// First corporate-action keyword found anywhere in `text`
    pub fn find_keyword(&self, text: &str) -> Option<String> {
        self.keyword_regex
            .as_ref()?
            .find(text)
            .map(|m| m.as_str().to_lowercase())
    }
}

fn build_keyword_regex(keywords: &[String]) -> Option<Regex> {
    if keywords.iter().all(|k| k.trim().is_empty()) {
        return None;
    }

    let alternation = keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .map(|k| regex::escape(k.trim()))
        .collect::<Vec<_>>()
        .join("|");

    match Regex::new(&format!("(?i)({alternation})")) {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::warn!("Failed to compile announcement keywords, disabling: {}", e);
            None
        }
    }
}

impl SignalEvaluator for AnnouncementCredibilityEvaluator {
    fn evaluate(&self, context: &Context) -> SignalResult {
        let unchecked = SignalResult::new(NEUTRAL_SCORE)
            .with("checked", false)
            .with("announcement_type", None::<String>)
            .with("verified", false)
            .with("unavailable", false);

        let Some((text, keyword)) = context
            .text()
            .and_then(|text| self.find_keyword(text).map(|k| (text, k)))
        else {
            return unchecked;
        };

        match self.verifier.verify(text) {
            Ok(verified) => {
                let score = if verified {
                    VERIFIED_SCORE
                } else {
                    UNVERIFIED_SCORE
                };
                log::debug!(
                    "Corporate-action claim ({}) verified: {}",
                    keyword,
                    verified
                );
                SignalResult::new(score)
                    .with("checked", true)
                    .with("announcement_type", "corporate_action")
                    .with("keyword", keyword)
                    .with("verified", verified)
                    .with("unavailable", false)
            }
            Err(e) => {
                log::warn!("Announcement verification skipped: {}", e);
                unchecked
                    .with("announcement_type", "corporate_action")
                    .with("keyword", keyword)
                    .with("unavailable", true)
                    .with("reason", e.to_string())
            }
        }
    }

    fn name(&self) -> &str {
        "announcement_credibility"
    }
}
