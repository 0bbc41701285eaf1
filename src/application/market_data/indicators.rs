//! Indicator series over daily close prices
//!
//! Every function returns one value per input row so results can be zipped back onto
//! the observations they were computed from.

use crate::domain::errors::ForecastError;
use ta::Next;
use ta::indicators::SimpleMovingAverage;

/// Rolling simple moving average with minimum-periods-1 semantics.
///
/// Until `period` values are available each row holds the mean of all rows so far,
/// so no row is lost to warm-up.
pub fn rolling_sma(values: &[f64], period: usize) -> Result<Vec<f64>, ForecastError> {
    let mut sma = SimpleMovingAverage::new(period).map_err(|e| {
        ForecastError::configuration(format!("invalid moving average period {}: {:?}", period, e))
    })?;

    Ok(values.iter().map(|v| sma.next(*v)).collect())
}

/// RSI from average gain and average loss over the same window.
///
/// A window with no losses is 100 (pure gains) or 50 when the window is completely flat.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let gain = avg_gain.max(0.0);
    let loss = avg_loss.max(0.0);

    if loss == 0.0 {
        return if gain == 0.0 { 50.0 } else { 100.0 };
    }

    let rs = gain / loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

/// Rolling RSI using simple (non-smoothed) means of gains and losses.
///
/// Row `i` uses the `period` close-to-close differences ending at row `i`, so the first
/// `period` rows have no value.
pub fn rolling_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let n = period as f64;
    for (row, slot) in out.iter_mut().enumerate().skip(period) {
        // diff index j is the change from row j to row j + 1
        let window = (row - period)..row;
        let avg_gain = gains[window.clone()].iter().sum::<f64>() / n;
        let avg_loss = losses[window].iter().sum::<f64>() / n;
        *slot = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    out
}

/// Latest value of `rolling_sma`, if any.
pub fn latest_sma(values: &[f64], period: usize) -> Result<Option<f64>, ForecastError> {
    Ok(rolling_sma(values, period)?.last().copied())
}

/// Latest value of `rolling_rsi`, if defined.
pub fn latest_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() <= period {
        return None;
    }
    rolling_rsi(&closes[closes.len() - period - 1..], period)
        .last()
        .copied()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_min_periods_one() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0];
        let sma = rolling_sma(&prices, 3).unwrap();

        assert_eq!(sma[0], 100.0);
        assert_eq!(sma[1], 101.0);
        assert_eq!(sma[2], 102.0);
        assert_eq!(sma[4], 106.0);
    }

    #[test]
    fn test_sma_zero_period_is_configuration_error() {
        let err = rolling_sma(&[1.0, 2.0], 0).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_rsi_warmup_rows_undefined() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        let rsi = rolling_rsi(&prices, 14);

        assert!(rsi[..14].iter().all(|v| v.is_none()));
        assert!(rsi[14..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_rsi_calculation() {
        let prices = vec![
            44.0, 44.25, 44.5, 43.75, 44.0, 44.5, 45.0, 45.5, 45.25, 45.5, 46.0, 46.5, 46.25,
            46.0, 46.5,
        ];

        let rsi = rolling_rsi(&prices, 14)[14].unwrap();
        // gains sum 4.0, losses sum 1.5
        let expected = 100.0 - 100.0 / (1.0 + 4.0 / 1.5);
        assert!((rsi - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rsi_all_gains_and_flat() {
        let rising: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rolling_rsi(&rising, 5)[9], Some(100.0));

        let flat = vec![100.0; 10];
        assert_eq!(rolling_rsi(&flat, 5)[9], Some(50.0));

        let falling: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
        assert_eq!(rolling_rsi(&falling, 5)[9], Some(0.0));
    }

    #[test]
    fn test_rsi_bounds_on_noisy_series() {
        let mut price = 1_000.0;
        let mut prices = Vec::new();
        for i in 0..500 {
            // deterministic zig-zag with growing amplitude
            let step = ((i * 7919) % 23) as f64 - 11.3;
            price = (price + step * (1.0 + i as f64 / 100.0)).max(1.0);
            prices.push(price);
        }

        for value in rolling_rsi(&prices, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value), "rsi out of bounds: {}", value);
        }
    }

    #[test]
    fn test_latest_helpers_match_rolling() {
        let prices: Vec<f64> = (0..40).map(|i| 50.0 + ((i * 13) % 7) as f64).collect();

        let rolling = rolling_rsi(&prices, 14);
        assert_eq!(latest_rsi(&prices, 14), *rolling.last().unwrap());
        assert_eq!(latest_rsi(&prices[..10], 14), None);

        let sma = rolling_sma(&prices, 200).unwrap();
        assert_eq!(latest_sma(&prices, 200).unwrap(), sma.last().copied());
    }
}
