use crate::domain::forecasting::{DcaAction, Recommendation};

/// Maps predicted drift over the horizon to a DCA recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalPolicy {
    pub strong_rise: f64,
    pub moderate_rise: f64,
    pub moderate_decline: f64,
    pub sharp_decline: f64,
    pub horizon_days: usize,
}

impl Default for SignalPolicy {
    fn default() -> Self {
        Self::new(30)
    }
}

impl SignalPolicy {
    pub fn new(horizon_days: usize) -> Self {
        Self {
            strong_rise: 10.0,
            moderate_rise: 5.0,
            moderate_decline: -5.0,
            sharp_decline: -10.0,
            horizon_days,
        }
    }

    /// Percentage change from `current` to `predicted`
    pub fn variation_percent(current: f64, predicted: f64) -> f64 {
        (predicted - current) / current * 100.0
    }

    pub fn recommend(&self, variation: f64) -> Recommendation {
        let (action, message) = if variation > self.strong_rise {
            (
                DcaAction::Increase,
                "Increase DCA purchases - significant rise predicted",
            )
        } else if variation > self.moderate_rise {
            (
                DcaAction::Maintain,
                "Maintain current DCA - moderate rise predicted",
            )
        } else if variation > self.moderate_decline {
            (
                DcaAction::Maintain,
                "Maintain current DCA - relative stability predicted",
            )
        } else if variation > self.sharp_decline {
            (
                DcaAction::Reduce,
                "Slightly reduce DCA - moderate decline predicted",
            )
        } else {
            (
                DcaAction::Reduce,
                "Significantly reduce DCA - sharp decline predicted",
            )
        };

        Recommendation {
            action,
            message: message.to_string(),
            reason: format!(
                "Prediction: {:+.1}% over {} days",
                variation, self.horizon_days
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(variation: f64) -> DcaAction {
        SignalPolicy::default().recommend(variation).action
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(action(10.0), DcaAction::Maintain);
        assert_eq!(action(10.01), DcaAction::Increase);
        assert_eq!(action(-10.0), DcaAction::Reduce);
        assert_eq!(action(0.0), DcaAction::Maintain);
        assert_eq!(action(5.0), DcaAction::Maintain);
        assert_eq!(action(-5.0), DcaAction::Reduce);
        assert_eq!(action(-4.99), DcaAction::Maintain);
    }

    #[test]
    fn test_messages() {
        let policy = SignalPolicy::default();

        assert!(policy.recommend(7.0).message.contains("moderate rise"));
        assert!(policy.recommend(5.0).message.contains("relative stability"));
        assert!(policy.recommend(-7.0).message.starts_with("Slightly reduce"));
        assert!(policy.recommend(-25.0).message.contains("sharp decline"));
    }

    #[test]
    fn test_reason_format() {
        let policy = SignalPolicy::new(30);

        assert_eq!(
            policy.recommend(12.345).reason,
            "Prediction: +12.3% over 30 days"
        );
        assert_eq!(
            policy.recommend(-3.26).reason,
            "Prediction: -3.3% over 30 days"
        );
        assert_eq!(policy.recommend(0.0).reason, "Prediction: +0.0% over 30 days");
    }

    #[test]
    fn test_variation_percent() {
        assert_eq!(SignalPolicy::variation_percent(100.0, 110.0), 10.0);
        assert_eq!(SignalPolicy::variation_percent(100.0, 100.0), 0.0);
        assert!((SignalPolicy::variation_percent(200.0, 150.0) + 25.0).abs() < 1e-12);
    }
}
