// Feature derivation from raw daily observations
pub mod feature_builder;

// Reversible min/max scaling
pub mod normalizer;

// Autoregressive multi-step loop
pub mod rollout;

// Drift -> DCA recommendation
pub mod signal_policy;

// One request/response cycle
pub mod orchestrator;

pub use feature_builder::FeatureBuilder;
pub use normalizer::{MinMaxScaler, Normalizer, ScalingParameters};
pub use orchestrator::{ForecastSettings, PredictionOrchestrator, confidence_score};
pub use rollout::{RolloutConfig, RolloutEngine};
pub use signal_policy::SignalPolicy;
