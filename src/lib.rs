pub mod batch;
pub mod collaborators;
pub mod config;
pub mod context;
pub mod domain_utils;
pub mod features;
pub mod fusion;

pub use config::EngineConfig;
pub use context::{Context, MediaReference};
pub use features::{Evidence, EvidenceValue, Signal, SignalEvaluator, SignalResult};
pub use fusion::{Explanation, FusionEngine, FusionResult, RiskLabel};
