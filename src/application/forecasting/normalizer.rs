//! Reversible per-column min/max scaling
//!
//! Parameters are fit on every request and never persisted, so a forecast is always
//! scaled against the same window it was computed from.

use crate::domain::errors::ScalerError;
use crate::domain::forecasting::FeatureTable;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

pub const DEFAULT_FEATURE_RANGE: (f64, f64) = (-1.0, 1.0);

/// Fitted per-column bounds plus the target range.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingParameters {
    pub data_min: Array1<f64>,
    pub data_max: Array1<f64>,
    pub range: (f64, f64),
}

impl ScalingParameters {
    fn midpoint(&self) -> f64 {
        (self.range.0 + self.range.1) / 2.0
    }

    fn span(&self) -> f64 {
        self.range.1 - self.range.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    params: ScalingParameters,
}

impl MinMaxScaler {
    pub fn fit(data: ArrayView2<'_, f64>) -> Result<Self, ScalerError> {
        Self::fit_with_range(data, DEFAULT_FEATURE_RANGE)
    }

    pub fn fit_with_range(
        data: ArrayView2<'_, f64>,
        range: (f64, f64),
    ) -> Result<Self, ScalerError> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(ScalerError::EmptyInput);
        }

        let mut data_min = Array1::zeros(data.ncols());
        let mut data_max = Array1::zeros(data.ncols());

        for (column, values) in data.axis_iter(Axis(1)).enumerate() {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ScalerError::NonFinite { column });
            }
            data_min[column] = values.iter().copied().fold(f64::INFINITY, f64::min);
            data_max[column] = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        }

        Ok(Self {
            params: ScalingParameters {
                data_min,
                data_max,
                range,
            },
        })
    }

    pub fn fit_transform(data: ArrayView2<'_, f64>) -> Result<(Self, Array2<f64>), ScalerError> {
        let scaler = Self::fit(data)?;
        let scaled = scaler.transform(data)?;
        Ok((scaler, scaled))
    }

    pub fn n_features(&self) -> usize {
        self.params.data_min.len()
    }

    fn check_width(&self, actual: usize) -> Result<(), ScalerError> {
        if actual != self.n_features() {
            return Err(ScalerError::WidthMismatch {
                expected: self.n_features(),
                actual,
            });
        }
        Ok(())
    }

    fn forward(&self, column: usize, value: f64) -> f64 {
        let p = &self.params;
        let (min, max) = (p.data_min[column], p.data_max[column]);
        if max == min {
            return p.midpoint();
        }
        p.range.0 + (value - min) / (max - min) * p.span()
    }

    fn backward(&self, column: usize, value: f64) -> f64 {
        let p = &self.params;
        let (min, max) = (p.data_min[column], p.data_max[column]);
        if max == min {
            return min;
        }
        min + (value - p.range.0) / p.span() * (max - min)
    }

    /// Forward map. Values outside the fitted bounds land outside the range; no clipping.
    pub fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, ScalerError> {
        self.check_width(data.ncols())?;
        Ok(Array2::from_shape_fn(data.dim(), |(r, c)| {
            self.forward(c, data[[r, c]])
        }))
    }

    pub fn transform_row(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, ScalerError> {
        self.check_width(row.len())?;
        Ok(Array1::from_shape_fn(row.len(), |c| self.forward(c, row[c])))
    }

    pub fn inverse_transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, ScalerError> {
        self.check_width(data.ncols())?;
        Ok(Array2::from_shape_fn(data.dim(), |(r, c)| {
            self.backward(c, data[[r, c]])
        }))
    }

    pub fn inverse_transform_row(
        &self,
        row: ArrayView1<'_, f64>,
    ) -> Result<Array1<f64>, ScalerError> {
        self.check_width(row.len())?;
        Ok(Array1::from_shape_fn(row.len(), |c| self.backward(c, row[c])))
    }

    /// Inverse of a single-column scaler's output
    pub fn inverse_scalar(&self, value: f64) -> Result<f64, ScalerError> {
        self.check_width(1)?;
        Ok(self.backward(0, value))
    }
}

/// Input scaler (all 7 features) plus target scaler (close only).
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    pub features: MinMaxScaler,
    pub target: MinMaxScaler,
}

impl Normalizer {
    /// Fits both scalers on `table` and returns the scaled feature matrix.
    pub fn fit(table: &FeatureTable) -> Result<(Self, Array2<f64>), ScalerError> {
        let matrix = table.to_matrix();
        let (features, scaled) = MinMaxScaler::fit_transform(matrix.view())?;
        let target = MinMaxScaler::fit(table.target_matrix().view())?;

        Ok((Self { features, target }, scaled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(a: f64, b: f64) {
        let tolerance = 1e-9 * a.abs().max(b.abs()).max(1.0);
        assert!((a - b).abs() <= tolerance, "{} != {}", a, b);
    }

    #[test]
    fn test_round_trip() {
        let data = array![
            [42_000.0, 41_500.0, 43_000.0, 41_000.0, 12_345.6, 39_000.0, 61.2],
            [43_100.0, 42_000.0, 43_900.0, 41_800.0, 9_876.5, 39_050.0, 65.0],
            [40_250.5, 43_100.0, 43_200.0, 40_000.0, 22_000.1, 39_010.0, 38.4],
            [41_000.0, 40_250.5, 41_500.0, 39_900.0, 15_000.0, 39_020.0, 44.9],
        ];

        let (scaler, scaled) = MinMaxScaler::fit_transform(data.view()).unwrap();
        for value in scaled.iter() {
            assert!((-1.0 - 1e-12..=1.0 + 1e-12).contains(value));
        }

        let restored = scaler.inverse_transform(scaled.view()).unwrap();
        for (a, b) in data.iter().zip(restored.iter()) {
            assert_close(*a, *b);
        }
    }

    #[test]
    fn test_bounds_map_to_range_ends() {
        let data = array![[10.0], [20.0], [15.0]];
        let (_, scaled) = MinMaxScaler::fit_transform(data.view()).unwrap();

        assert_eq!(scaled[[0, 0]], -1.0);
        assert_eq!(scaled[[1, 0]], 1.0);
        assert_eq!(scaled[[2, 0]], 0.0);
    }

    #[test]
    fn test_degenerate_column() {
        let data = array![[100.0, 1.0], [100.0, 2.0], [100.0, 3.0]];
        let (scaler, scaled) = MinMaxScaler::fit_transform(data.view()).unwrap();

        assert!(scaled.column(0).iter().all(|v| *v == 0.0));

        let restored = scaler
            .inverse_transform_row(array![0.7, 0.0].view())
            .unwrap();
        assert_eq!(restored[0], 100.0);
        assert_close(restored[1], 2.0);
    }

    #[test]
    fn test_out_of_range_not_clipped() {
        let data = array![[10.0], [20.0]];
        let scaler = MinMaxScaler::fit(data.view()).unwrap();

        let scaled = scaler.transform_row(array![30.0].view()).unwrap();
        assert_close(scaled[0], 3.0);
        assert_close(scaler.inverse_scalar(3.0).unwrap(), 30.0);
    }

    #[test]
    fn test_errors() {
        let empty = Array2::<f64>::zeros((0, 7));
        assert_eq!(
            MinMaxScaler::fit(empty.view()).unwrap_err(),
            ScalerError::EmptyInput
        );

        let scaler = MinMaxScaler::fit(array![[1.0, 2.0], [3.0, 4.0]].view()).unwrap();
        assert_eq!(
            scaler.transform_row(array![1.0].view()).unwrap_err(),
            ScalerError::WidthMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert!(scaler.inverse_scalar(0.0).is_err());

        let nan = array![[1.0], [f64::NAN]];
        assert_eq!(
            MinMaxScaler::fit(nan.view()).unwrap_err(),
            ScalerError::NonFinite { column: 0 }
        );
    }
}
