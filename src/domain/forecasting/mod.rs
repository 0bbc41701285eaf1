// Value objects of one forecast request
pub mod types;

pub use types::{
    DcaAction, FeatureTable, FeatureVector, ForecastResult, ModelInfo, ModelMetadata,
    ModelPerformance, ModelStatus, Observation, Recommendation, Trajectory,
    sort_by_date_last_wins,
};
