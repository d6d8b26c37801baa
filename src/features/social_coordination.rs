use super::{SignalEvaluator, SignalResult};
use crate::collaborators::ClusterEstimator;
use crate::context::Context;
use std::sync::Arc;

const NEUTRAL_SCORE: f64 = 0.1;
const LARGE_CLUSTER: u32 = 20;
const MEDIUM_CLUSTER: u32 = 10;

/// Detects coordinated posting campaigns around the mentioned tickers
pub struct SocialCoordinationEvaluator {
    estimator: Arc<dyn ClusterEstimator>,
}

impl SocialCoordinationEvaluator {
    pub fn new(estimator: Arc<dyn ClusterEstimator>) -> Self {
        Self { estimator }
    }

    fn score_for_cluster(cluster_size: u32) -> f64 {
        if cluster_size > LARGE_CLUSTER {
            0.8
        } else if cluster_size > MEDIUM_CLUSTER {
            0.5
        } else {
            0.1
        }
    }
}

impl SignalEvaluator for SocialCoordinationEvaluator {
    fn evaluate(&self, context: &Context) -> SignalResult {
        let unchecked = SignalResult::new(NEUTRAL_SCORE)
            .with("checked", false)
            .with("cluster_size", 0u32)
            .with("time_window_minutes", 0u32)
            .with("unavailable", false);

        let Some(tickers) = context.tickers() else {
            return unchecked;
        };

        match self.estimator.estimate(tickers) {
            Ok(estimate) => {
                log::debug!(
                    "Posting cluster for {:?}: {} posts in {} minutes",
                    tickers,
                    estimate.cluster_size,
                    estimate.time_window_minutes
                );
                SignalResult::new(Self::score_for_cluster(estimate.cluster_size))
                    .with("checked", true)
                    .with("cluster_size", estimate.cluster_size)
                    .with("time_window_minutes", estimate.time_window_minutes)
                    .with("ticker_count", tickers.len())
                    .with("unavailable", false)
            }
            Err(e) => {
                log::warn!("Posting cluster estimate skipped: {}", e);
                unchecked
                    .with("unavailable", true)
                    .with("reason", e.to_string())
            }
        }
    }

    fn name(&self) -> &str {
        "social_coordination"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{ClusterEstimate, LookupError};
    use crate::features::EvidenceValue;

    struct FixedEstimator(u32);

    impl ClusterEstimator for FixedEstimator {
        fn estimate(&self, _tickers: &[String]) -> Result<ClusterEstimate, LookupError> {
            Ok(ClusterEstimate {
                cluster_size: self.0,
                time_window_minutes: 15,
            })
        }
    }

    struct OfflineEstimator;

    impl ClusterEstimator for OfflineEstimator {
        fn estimate(&self, _tickers: &[String]) -> Result<ClusterEstimate, LookupError> {
            Err(LookupError::Unavailable("feed lag".to_string()))
        }
    }

    fn with_tickers() -> Context {
        Context {
            tickers: Some(vec!["STOCK1".to_string(), "STOCK2".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_cluster_size_bands() {
        let cases = [(30, 0.8), (21, 0.8), (20, 0.5), (11, 0.5), (10, 0.1), (0, 0.1)];

        for (size, expected) in cases {
            let evaluator = SocialCoordinationEvaluator::new(Arc::new(FixedEstimator(size)));
            let result = evaluator.evaluate(&with_tickers());
            assert_eq!(result.score, expected, "cluster size {size}");
            assert_eq!(
                result.get("cluster_size"),
                Some(&EvidenceValue::Int(i64::from(size)))
            );
        }
    }

    #[test]
    fn test_no_tickers_is_neutral() {
        let evaluator = SocialCoordinationEvaluator::new(Arc::new(FixedEstimator(50)));
        let result = evaluator.evaluate(&Context::default());

        assert_eq!(result.score, NEUTRAL_SCORE);
        assert!(!result.flag("checked"));
    }

    #[test]
    fn test_unavailable_estimator() {
        let evaluator = SocialCoordinationEvaluator::new(Arc::new(OfflineEstimator));
        let result = evaluator.evaluate(&with_tickers());

        assert_eq!(result.score, NEUTRAL_SCORE);
        assert!(result.flag("unavailable"));
        assert!(!result.flag("checked"));
    }
}
