use crate::domain::forecasting::FeatureVector;

/// Ordered list of feature names.
/// This order MUST match exactly the column order the model was trained on.
/// Any change here is a breaking change for deployed models.
pub const FEATURE_NAMES: &[&str] = &["close", "open", "high", "low", "volume", "ma200", "rsi14"];

pub const FEATURE_COUNT: usize = 7;

pub const CLOSE_INDEX: usize = 0;
pub const MA_INDEX: usize = 5;
pub const RSI_INDEX: usize = 6;

/// Converts a feature row into the positional f64 layout used for scaling.
pub fn features_to_f64_vector(fv: &FeatureVector) -> [f64; FEATURE_COUNT] {
    [
        fv.close, fv.open, fv.high, fv.low, fv.volume, fv.ma200, fv.rsi14,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_length() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
        assert_eq!(FEATURE_NAMES[CLOSE_INDEX], "close");
        assert_eq!(FEATURE_NAMES[MA_INDEX], "ma200");
        assert_eq!(FEATURE_NAMES[RSI_INDEX], "rsi14");
    }

    #[test]
    fn test_feature_consistency() {
        let fv = FeatureVector {
            close: 1.0,
            open: 2.0,
            high: 3.0,
            low: 4.0,
            volume: 5.0,
            ma200: 6.0,
            rsi14: 7.0,
        };

        let vec = features_to_f64_vector(&fv);
        assert_eq!(vec, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(vec[MA_INDEX], fv.ma200);
        assert_eq!(vec[RSI_INDEX], fv.rsi14);
    }
}
