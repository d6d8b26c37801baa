use super::{SignalEvaluator, SignalResult};
use crate::collaborators::AdvisorRegistry;
use crate::context::Context;
use std::sync::Arc;

const NEUTRAL_SCORE: f64 = 0.1;
const REGISTERED_SCORE: f64 = 0.1;
const UNREGISTERED_SCORE: f64 = 0.6;

/// Checks mentioned advisors against the advisor registry
pub struct AdvisorIdentityEvaluator {
    registry: Arc<dyn AdvisorRegistry>,
}

impl AdvisorIdentityEvaluator {
    pub fn new(registry: Arc<dyn AdvisorRegistry>) -> Self {
        Self { registry }
    }

    fn unchecked(score: f64) -> SignalResult {
        SignalResult::new(score)
            .with("checked", false)
            .with("matched", false)
            .with("registry_id", None::<String>)
            .with("unavailable", false)
    }
}

impl SignalEvaluator for AdvisorIdentityEvaluator {
    fn evaluate(&self, context: &Context) -> SignalResult {
        let Some(mentions) = context.mentions() else {
            return Self::unchecked(NEUTRAL_SCORE);
        };

        match self.registry.lookup(mentions) {
            Ok(Some(registry_id)) => SignalResult::new(REGISTERED_SCORE)
                .with("checked", true)
                .with("matched", true)
                .with("registry_id", registry_id)
                .with("mention_count", mentions.len())
                .with("unavailable", false),
            Ok(None) => SignalResult::new(UNREGISTERED_SCORE)
                .with("checked", true)
                .with("matched", false)
                .with("registry_id", None::<String>)
                .with("mention_count", mentions.len())
                .with("unavailable", false),
            Err(e) => {
                log::warn!("Advisor registry lookup skipped: {}", e);
                Self::unchecked(NEUTRAL_SCORE)
                    .with("unavailable", true)
                    .with("reason", e.to_string())
            }
        }
    }

    fn name(&self) -> &str {
        "advisor_identity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{LookupError, StaticAdvisorRegistry};
    use crate::features::EvidenceValue;
    use std::collections::BTreeMap;

    struct OfflineRegistry;

    impl AdvisorRegistry for OfflineRegistry {
        fn lookup(&self, _handles: &[String]) -> Result<Option<String>, LookupError> {
            Err(LookupError::Unavailable("registry down".to_string()))
        }
    }

    fn create_evaluator() -> AdvisorIdentityEvaluator {
        let mut entries = BTreeMap::new();
        entries.insert("@ravi_capital".to_string(), "SEBI/RA/1234".to_string());
        AdvisorIdentityEvaluator::new(Arc::new(StaticAdvisorRegistry::new(&entries)))
    }

    fn with_mentions(mentions: &[&str]) -> Context {
        Context {
            mentions: Some(mentions.iter().map(|m| m.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_mentions_is_neutral() {
        let result = create_evaluator().evaluate(&Context::default());

        assert_eq!(result.score, NEUTRAL_SCORE);
        assert!(!result.flag("checked"));
        assert_eq!(result.get("registry_id"), Some(&EvidenceValue::Null));
    }

    #[test]
    fn test_registered_advisor() {
        let result = create_evaluator().evaluate(&with_mentions(&["@ravi_capital"]));

        assert_eq!(result.score, REGISTERED_SCORE);
        assert!(result.flag("checked"));
        assert!(result.flag("matched"));
        assert_eq!(
            result.get("registry_id"),
            Some(&EvidenceValue::Text("SEBI/RA/1234".to_string()))
        );
    }

    #[test]
    fn test_unregistered_advisor() {
        let result = create_evaluator().evaluate(&with_mentions(&["@advisor_431"]));

        assert_eq!(result.score, UNREGISTERED_SCORE);
        assert!(result.flag("checked"));
        assert!(!result.flag("matched"));
    }

    #[test]
    fn test_unavailable_registry_is_not_a_negative() {
        let evaluator = AdvisorIdentityEvaluator::new(Arc::new(OfflineRegistry));
        let result = evaluator.evaluate(&with_mentions(&["@advisor_431"]));

        assert_eq!(result.score, NEUTRAL_SCORE);
        assert!(result.flag("unavailable"));
        assert!(!result.flag("checked"));
    }
}
