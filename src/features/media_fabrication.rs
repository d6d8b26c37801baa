use super::{SignalEvaluator, SignalResult};
use crate::collaborators::MediaInspector;
use crate::context::Context;
use std::sync::Arc;

const NO_MEDIA_SCORE: f64 = 0.0;
const UNFLAGGED_SCORE: f64 = 0.2;
const FABRICATED_SCORE: f64 = 0.8;

/// Checks attached media for deepfake or manipulation indicators
pub struct MediaFabricationEvaluator {
    inspector: Arc<dyn MediaInspector>,
}

impl MediaFabricationEvaluator {
    pub fn new(inspector: Arc<dyn MediaInspector>) -> Self {
        Self { inspector }
    }
}

impl SignalEvaluator for MediaFabricationEvaluator {
    fn evaluate(&self, context: &Context) -> SignalResult {
        let Some(media) = context.media() else {
            return SignalResult::new(NO_MEDIA_SCORE)
                .with("checked", false)
                .with("media_count", 0usize)
                .with("deepfake_detected", false)
                .with("unavailable", false);
        };

        match self.inspector.inspect(media) {
            Ok(fabricated) => {
                let score = if fabricated {
                    FABRICATED_SCORE
                } else {
                    UNFLAGGED_SCORE
                };
                SignalResult::new(score)
                    .with("checked", true)
                    .with("media_count", media.len())
                    .with("deepfake_detected", fabricated)
                    .with("unavailable", false)
            }
            Err(e) => {
                // Attached but uninspected media still carries the unflagged score
                log::warn!("Media inspection skipped: {}", e);
                SignalResult::new(UNFLAGGED_SCORE)
                    .with("checked", false)
                    .with("media_count", media.len())
                    .with("deepfake_detected", false)
                    .with("unavailable", true)
                    .with("reason", e.to_string())
            }
        }
    }

    fn name(&self) -> &str {
        "media_fabrication"
    }
}
