//! Terminal and CSV renderings of a forecast

use crate::domain::forecasting::ForecastResult;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Serialize)]
struct TrajectoryRow<'a> {
    date: &'a str,
    predicted_price: f64,
}

/// Human-readable report for the CLI
pub fn render_report(result: &ForecastResult, symbol: &str) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{} - {}-day forecast", symbol, result.predicted_prices.len());
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Current price:     {:>14.2}", result.current_price);
    let _ = writeln!(out, "Predicted price:   {:>14.2}", result.predicted_price_30d);
    let _ = writeln!(out, "Variation:         {:>+13.2}%", result.variation_percent);
    let _ = writeln!(out, "Confidence:        {:>14.3}", result.confidence_score);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Recommendation: {} - {}",
        result.dca_recommendation.action.to_string().to_uppercase(),
        result.dca_recommendation.message
    );
    let _ = writeln!(out, "  {}", result.dca_recommendation.reason);
    let _ = writeln!(out);

    let _ = writeln!(out, "{:<12} {:>14}", "Date", "Price");
    for (date, price) in result
        .prediction_dates
        .iter()
        .zip(&result.predicted_prices)
    {
        let _ = writeln!(out, "{:<12} {:>14.2}", date, price);
    }

    let info = &result.model_info;
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "Model: {} (trained on {}, MAPE {:.2}%)",
        info.model_type, info.training_period, info.mape
    );

    out
}

/// Writes `date,predicted_price` rows for the trajectory
pub fn write_trajectory_csv(result: &ForecastResult, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;

    for (date, price) in result
        .prediction_dates
        .iter()
        .zip(&result.predicted_prices)
    {
        wtr.serialize(TrajectoryRow {
            date,
            predicted_price: *price,
        })?;
    }

    wtr.flush().context("Failed to flush trajectory CSV")?;
    Ok(())
}
