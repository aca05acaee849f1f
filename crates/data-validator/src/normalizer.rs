//! Fitted Column Scaling
//!
//! Applies scaling parameters fitted at training time to the numeric column
//! pair (Age, Length of Stay). The parameters never change after load.

use crate::error::ScalerError;
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::debug;

/// Number of scaled columns: Age, Length of Stay
pub const NUMERIC_COLUMNS: usize = 2;

/// Normalization method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMethod {
    /// Z-score standardization with fitted mean and scale
    ZScore,
    /// Min-max normalization into a fitted feature range
    MinMax,
    /// No normalization
    #[serde(rename = "identity")]
    None,
}

/// Serialized scaler artifact, tagged by method
#[derive(Debug, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
enum FittedScaler {
    ZScore {
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "default_feature_range")]
        feature_range: (f64, f64),
    },
    Identity,
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq)]
enum Params {
    ZScore {
        mean: [f64; NUMERIC_COLUMNS],
        scale: [f64; NUMERIC_COLUMNS],
    },
    /// Stored as `x * scale + min`
    MinMax {
        scale: [f64; NUMERIC_COLUMNS],
        min: [f64; NUMERIC_COLUMNS],
    },
    Identity,
}

/// Immutable scaler for the numeric column pair
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    params: Params,
}

impl Normalizer {
    /// Standardize as `(x - mean) / scale`. A zero scale is treated as 1.
    pub fn z_score(mean: &[f64], scale: &[f64]) -> Result<Self, ScalerError> {
        let mean = columns("mean", mean)?;
        let mut scale = columns("scale", scale)?;
        for s in &mut scale {
            if *s == 0.0 {
                *s = 1.0;
            }
        }
        Ok(Self {
            params: Params::ZScore { mean, scale },
        })
    }

    /// Map each column's fitted `[data_min, data_max]` onto `feature_range`.
    /// A constant column (zero data range) is treated as having range 1.
    pub fn min_max(
        data_min: &[f64],
        data_max: &[f64],
        feature_range: (f64, f64),
    ) -> Result<Self, ScalerError> {
        let data_min = columns("data_min", data_min)?;
        let data_max = columns("data_max", data_max)?;
        let (lo, hi) = feature_range;
        if !lo.is_finite() || !hi.is_finite() {
            return Err(ScalerError::NonFinite {
                name: "feature_range",
            });
        }
        if lo >= hi {
            return Err(ScalerError::EmptyFeatureRange { min: lo, max: hi });
        }

        let mut scale = [0.0; NUMERIC_COLUMNS];
        let mut min = [0.0; NUMERIC_COLUMNS];
        for i in 0..NUMERIC_COLUMNS {
            let mut range = data_max[i] - data_min[i];
            if range == 0.0 {
                range = 1.0;
            }
            scale[i] = (hi - lo) / range;
            min[i] = lo - data_min[i] * scale[i];
        }
        Ok(Self {
            params: Params::MinMax { scale, min },
        })
    }

    /// Pass values through unchanged
    pub fn identity() -> Self {
        Self {
            params: Params::Identity,
        }
    }

    /// Parse a serialized scaler artifact
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScalerError> {
        let fitted: FittedScaler = serde_json::from_reader(reader)?;
        Self::from_fitted(fitted)
    }

    /// Parse a serialized scaler artifact from a string
    pub fn from_json_str(json: &str) -> Result<Self, ScalerError> {
        let fitted: FittedScaler = serde_json::from_str(json)?;
        Self::from_fitted(fitted)
    }

    fn from_fitted(fitted: FittedScaler) -> Result<Self, ScalerError> {
        let normalizer = match fitted {
            FittedScaler::ZScore { mean, scale } => Self::z_score(&mean, &scale)?,
            FittedScaler::MinMax {
                data_min,
                data_max,
                feature_range,
            } => Self::min_max(&data_min, &data_max, feature_range)?,
            FittedScaler::Identity => Self::identity(),
        };
        debug!("Loaded {:?} scaler", normalizer.method());
        Ok(normalizer)
    }

    /// Method the parameters were fitted with
    pub fn method(&self) -> NormalizationMethod {
        match self.params {
            Params::ZScore { .. } => NormalizationMethod::ZScore,
            Params::MinMax { .. } => NormalizationMethod::MinMax,
            Params::Identity => NormalizationMethod::None,
        }
    }

    /// Scale one value of the given column
    fn scale_value(&self, column: usize, value: f64) -> f64 {
        match &self.params {
            Params::ZScore { mean, scale } => (value - mean[column]) / scale[column],
            Params::MinMax { scale, min } => value * scale[column] + min[column],
            Params::Identity => value,
        }
    }

    fn unscale_value(&self, column: usize, value: f64) -> f64 {
        match &self.params {
            Params::ZScore { mean, scale } => value * scale[column] + mean[column],
            Params::MinMax { scale, min } => (value - min[column]) / scale[column],
            Params::Identity => value,
        }
    }

    /// Scale one (Age, Length of Stay) row
    pub fn transform(&self, row: [f64; NUMERIC_COLUMNS]) -> [f64; NUMERIC_COLUMNS] {
        let mut out = row;
        for (column, value) in out.iter_mut().enumerate() {
            *value = self.scale_value(column, *value);
        }
        out
    }

    /// Undo [`Normalizer::transform`]
    pub fn inverse_transform(&self, row: [f64; NUMERIC_COLUMNS]) -> [f64; NUMERIC_COLUMNS] {
        let mut out = row;
        for (column, value) in out.iter_mut().enumerate() {
            *value = self.unscale_value(column, *value);
        }
        out
    }

    /// Scale an `n x 2` matrix of (Age, Length of Stay) rows
    pub fn transform_matrix(&self, matrix: ArrayView2<'_, f64>) -> Result<Array2<f64>, ScalerError> {
        if matrix.ncols() != NUMERIC_COLUMNS {
            return Err(ScalerError::Shape {
                expected: NUMERIC_COLUMNS,
                actual: matrix.ncols(),
            });
        }
        let mut out = matrix.to_owned();
        for (column, mut values) in out.axis_iter_mut(Axis(1)).enumerate() {
            values.mapv_inplace(|v| self.scale_value(column, v));
        }
        Ok(out)
    }
}

fn columns(name: &'static str, values: &[f64]) -> Result<[f64; NUMERIC_COLUMNS], ScalerError> {
    let array: [f64; NUMERIC_COLUMNS] =
        values.try_into().map_err(|_| ScalerError::ColumnCount {
            name,
            expected: NUMERIC_COLUMNS,
            actual: values.len(),
        })?;
    if array.iter().any(|v| !v.is_finite()) {
        return Err(ScalerError::NonFinite { name });
    }
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn test_zscore_normalization() {
        let norm = Normalizer::z_score(&[50.0, 10.0], &[20.0, 5.0]).unwrap();
        let result = norm.transform([70.0, 5.0]);
        assert!((result[0] - 1.0).abs() < 1e-12);
        assert!((result[1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_scale_treated_as_one() {
        let norm = Normalizer::z_score(&[50.0, 10.0], &[0.0, 5.0]).unwrap();
        assert_eq!(norm.transform([52.0, 10.0]), [2.0, 0.0]);
    }

    #[test]
    fn test_minmax_normalization() {
        let norm = Normalizer::min_max(&[0.0, 1.0], &[100.0, 31.0], (0.0, 1.0)).unwrap();
        let result = norm.transform([50.0, 16.0]);
        assert!((result[0] - 0.5).abs() < 1e-12);
        assert!((result[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_minmax_custom_range() {
        let norm = Normalizer::min_max(&[0.0, 0.0], &[10.0, 10.0], (-1.0, 1.0)).unwrap();
        let result = norm.transform([0.0, 10.0]);
        assert!((result[0] + 1.0).abs() < 1e-12);
        assert!((result[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_transform() {
        let norm = Normalizer::z_score(&[38.5, 15.2], &[19.6, 8.7]).unwrap();
        let row = [45.0, 5.0];
        let back = norm.inverse_transform(norm.transform(row));
        assert!((back[0] - row[0]).abs() < 1e-9);
        assert!((back[1] - row[1]).abs() < 1e-9);
    }

    #[test]
    fn test_matrix_matches_row_transform() {
        let norm = Normalizer::z_score(&[38.5, 15.2], &[19.6, 8.7]).unwrap();
        let matrix = array![[45.0, 5.0], [80.0, 30.0], [0.0, 0.0]];
        let scaled = norm.transform_matrix(matrix.view()).unwrap();
        for (row, out) in matrix.rows().into_iter().zip(scaled.rows()) {
            let expected = norm.transform([row[0], row[1]]);
            assert_eq!(out[0], expected[0]);
            assert_eq!(out[1], expected[1]);
        }
    }

    #[test]
    fn test_matrix_shape_checked() {
        let norm = Normalizer::identity();
        let matrix = array![[1.0, 2.0, 3.0]];
        assert!(matches!(
            norm.transform_matrix(matrix.view()),
            Err(ScalerError::Shape { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_parse_artifacts() {
        let z = Normalizer::from_json_str(r#"{"method":"z_score","mean":[40,10],"scale":[20,5]}"#)
            .unwrap();
        assert_eq!(z.method(), NormalizationMethod::ZScore);

        let mm = Normalizer::from_json_str(
            r#"{"method":"min_max","data_min":[0,1],"data_max":[120,365]}"#,
        )
        .unwrap();
        assert_eq!(mm.method(), NormalizationMethod::MinMax);

        let id = Normalizer::from_json_str(r#"{"method":"identity"}"#).unwrap();
        assert_eq!(id.transform([3.0, 4.0]), [3.0, 4.0]);
    }

    #[test]
    fn test_bad_artifacts_rejected() {
        assert!(matches!(
            Normalizer::from_json_str(r#"{"method":"z_score","mean":[40],"scale":[20,5]}"#),
            Err(ScalerError::ColumnCount { name: "mean", .. })
        ));
        assert!(matches!(
            Normalizer::from_json_str(r#"{"method":"robust"}"#),
            Err(ScalerError::Parse(_))
        ));
        assert!(matches!(
            Normalizer::min_max(&[0.0, 0.0], &[1.0, 1.0], (1.0, 1.0)),
            Err(ScalerError::EmptyFeatureRange { .. })
        ));
    }

    fn assert_round_trip(norm: &Normalizer, row: [f64; NUMERIC_COLUMNS]) -> Result<(), TestCaseError> {
        let back = norm.inverse_transform(norm.transform(row));
        for (original, restored) in row.iter().zip(back) {
            prop_assert!((original - restored).abs() < 1e-9, "{original} came back as {restored}");
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn zscore_inverse_restores_row(age in 0.0..=120.0f64, stay in 0.0..=365.0f64) {
            let norm = Normalizer::z_score(&[51.54, 15.51], &[19.60, 8.66]).unwrap();
            assert_round_trip(&norm, [age, stay])?;
        }

        #[test]
        fn minmax_inverse_restores_row(age in 0.0..=120.0f64, stay in 0.0..=365.0f64) {
            let norm = Normalizer::min_max(&[18.0, 1.0], &[85.0, 30.0], (0.0, 1.0)).unwrap();
            assert_round_trip(&norm, [age, stay])?;
        }
    }
}
