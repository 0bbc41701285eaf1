use ndarray::ArrayView3;

/// Opaque scalar regressor over one scaled feature vector.
///
/// Input is shaped `(1, 1, 7)`: one sample, one timestep, features in schema order.
/// The output is the predicted close in target-scaled space.
pub trait ForecastModel: Send + Sync {
    fn infer(&self, input: ArrayView3<'_, f32>) -> Result<f64, String>;

    /// Whether an artifact was actually loaded at startup
    fn is_loaded(&self) -> bool {
        true
    }

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}
