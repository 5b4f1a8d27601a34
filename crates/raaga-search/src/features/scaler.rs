use serde::{Deserialize, Serialize};

use raaga_core::{Error, Result};

/// Per-column min-max scaler mapping each fitted column onto [0, 1].
///
/// A constant column has zero range and maps to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit on rows that all share the same width.
    ///
    /// # Errors
    /// `FeatureBuild` if there are no rows, no columns, or ragged rows.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::FeatureBuild("cannot fit a scaler on zero rows".to_string()))?;
        if width == 0 {
            return Err(Error::FeatureBuild("numeric rows have no columns".to_string()));
        }

        let mut min = vec![f64::INFINITY; width];
        let mut max = vec![f64::NEG_INFINITY; width];
        for (index, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(Error::FeatureBuild(format!(
                    "row {index} has {} columns, expected {width}",
                    row.len()
                )));
            }
            for (col, &value) in row.iter().enumerate() {
                min[col] = min[col].min(value);
                max[col] = max[col].max(value);
            }
        }

        Ok(Self { min, max })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.min.len()
    }

    /// Scale one row. Values outside the fitted range land outside [0, 1].
    #[must_use]
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.min.iter().zip(&self.max))
            .map(|(&value, (&lo, &hi))| {
                let range = hi - lo;
                if range > 0.0 {
                    (value - lo) / range
                } else {
                    value - lo
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_transform() {
        let rows = vec![vec![10.0, 1000.0], vec![30.0, 3000.0], vec![20.0, 2000.0]];
        let scaler = MinMaxScaler::fit(&rows).unwrap();

        assert_eq!(scaler.width(), 2);
        assert_eq!(scaler.transform(&rows[0]), vec![0.0, 0.0]);
        assert_eq!(scaler.transform(&rows[1]), vec![1.0, 1.0]);
        assert_eq!(scaler.transform(&rows[2]), vec![0.5, 0.5]);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let rows = vec![vec![50.0, 1.0], vec![50.0, 3.0]];
        let scaler = MinMaxScaler::fit(&rows).unwrap();
        assert_eq!(scaler.transform(&rows[0]), vec![0.0, 0.0]);
        assert_eq!(scaler.transform(&rows[1]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_fit_rejects_empty_and_ragged() {
        assert!(matches!(MinMaxScaler::fit(&[]), Err(Error::FeatureBuild(_))));
        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(MinMaxScaler::fit(&ragged), Err(Error::FeatureBuild(_))));
    }
}
