use super::{SignalEvaluator, SignalResult};
use crate::config::EngineConfig;
use crate::context::Context;

const NO_APP_SCORE: f64 = 0.05;
const LEGITIMATE_SCORE: f64 = 0.05;
const IMPERSONATION_SCORE: f64 = 0.7;

/// Flags promoted trading apps that aren't on the legitimate-app allowlist
pub struct AppImpersonationEvaluator {
    legitimate_apps: Vec<String>,
}

impl Default for AppImpersonationEvaluator {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl AppImpersonationEvaluator {
    pub fn new(legitimate_apps: &[String]) -> Self {
        Self {
            legitimate_apps: legitimate_apps.iter().map(|a| a.trim().to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.legitimate_apps)
    }

    pub fn is_legitimate(&self, app: &str) -> bool {
        let app_lower = app.trim().to_lowercase();
        self.legitimate_apps.iter().any(|a| *a == app_lower)
    }
}

impl SignalEvaluator for AppImpersonationEvaluator {
    fn evaluate(&self, context: &Context) -> SignalResult {
        let Some(app) = context.detected_app() else {
            return SignalResult::new(NO_APP_SCORE)
                .with("checked", false)
                .with("app_detected", false)
                .with("legitimate", false)
                .with("unavailable", false);
        };

        if self.is_legitimate(app) {
            SignalResult::new(LEGITIMATE_SCORE)
                .with("checked", true)
                .with("app_detected", true)
                .with("app_name", app)
                .with("legitimate", true)
                .with("unavailable", false)
        } else {
            log::debug!("Detected app {} is not on the allowlist", app);
            SignalResult::new(IMPERSONATION_SCORE)
                .with("checked", true)
                .with("app_detected", true)
                .with("app_name", app)
                .with("legitimate", false)
                .with("unavailable", false)
        }
    }

    fn name(&self) -> &str {
        "app_impersonation"
    }
}
