use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use raaga_core::{Error, Result};

use super::{check_query, top_k, Neighbor, SimilarityStrategy, StrategyKind};
use crate::features::{NumericFeatures, TextFeatures};
use crate::vector::{dense_cosine, sparse_cosine};

/// Relative weights of the numeric and genre similarities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombineWeights {
    pub numeric: f64,
    pub genre: f64,
}

impl Default for CombineWeights {
    fn default() -> Self {
        Self {
            numeric: 0.5,
            genre: 0.5,
        }
    }
}

impl CombineWeights {
    /// Weights rescaled to sum to 1.
    ///
    /// # Errors
    /// `InvalidArgument` if a weight is negative or not finite, or both are 0.
    pub fn normalized(self) -> Result<Self> {
        let valid = |w: f64| w.is_finite() && w >= 0.0;
        if !valid(self.numeric) || !valid(self.genre) {
            return Err(Error::InvalidArgument(format!(
                "similarity weights must be finite and non-negative, got {} and {}",
                self.numeric, self.genre
            )));
        }
        let total = self.numeric + self.genre;
        if total <= 0.0 {
            return Err(Error::InvalidArgument(
                "similarity weights must not both be zero".to_string(),
            ));
        }
        Ok(Self {
            numeric: self.numeric / total,
            genre: self.genre / total,
        })
    }
}

/// Precomputed N×N similarity matrix, row-major.
///
/// `combined[i][j] = w_n · cos(numeric_i, numeric_j) + w_g · cos(genre_i, genre_j)`.
/// Each pair is computed once and written to both cells, so the matrix is
/// exactly symmetric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseCosineMatrix {
    n: usize,
    values: Vec<f32>,
}

impl DenseCosineMatrix {
    /// Build the combined matrix. O(N²) memory; rows are computed in parallel.
    pub fn build(
        numeric: &NumericFeatures,
        genre: &TextFeatures,
        weights: CombineWeights,
    ) -> Result<Self> {
        let weights = weights.normalized()?;
        let n = numeric.len();
        if genre.len() != n {
            return Err(Error::FeatureBuild(format!(
                "numeric features cover {n} rows, genre features {}",
                genre.len()
            )));
        }

        // Row i holds columns i..n (upper triangle including the diagonal).
        #[allow(clippy::cast_possible_truncation)]
        let upper: Vec<Vec<f32>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (i..n)
                    .map(|j| {
                        let a = dense_cosine(&numeric.vectors[i], &numeric.vectors[j]);
                        let b = sparse_cosine(&genre.vectors[i], &genre.vectors[j]);
                        (weights.numeric * a + weights.genre * b).clamp(0.0, 1.0) as f32
                    })
                    .collect()
            })
            .collect();

        let mut values = vec![0.0_f32; n * n];
        for (i, row) in upper.iter().enumerate() {
            for (offset, &value) in row.iter().enumerate() {
                let j = i + offset;
                values[i * n + j] = value;
                values[j * n + i] = value;
            }
        }

        log::info!("Built {n}x{n} dense similarity matrix");
        Ok(Self { n, values })
    }

    /// Check a deserialized matrix against the catalog it is meant for.
    ///
    /// # Errors
    /// `ModelNotFit` on any dimensional mismatch.
    pub fn validate(&self, expected_rows: usize) -> Result<()> {
        if self.n != expected_rows {
            return Err(Error::ModelNotFit(format!(
                "similarity matrix has {} rows, catalog has {expected_rows}",
                self.n
            )));
        }
        if self.values.len() != self.n * self.n {
            return Err(Error::ModelNotFit(format!(
                "similarity matrix holds {} values, expected {}",
                self.values.len(),
                self.n * self.n
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[i * self.n + j]
    }

    #[must_use]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.n..(i + 1) * self.n]
    }
}

impl SimilarityStrategy for DenseCosineMatrix {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DenseCosine
    }

    fn len(&self) -> usize {
        self.n
    }

    fn rank(&self, index: usize, k: usize) -> Result<Vec<Neighbor>> {
        check_query(index, k, self.n)?;

        let candidates: Vec<(usize, f32)> = self
            .row(index)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != index)
            .collect();

        let ranked = top_k(candidates, k, |a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(ranked
            .into_iter()
            .map(|(index, score)| Neighbor {
                index,
                score: f64::from(score),
            })
            .collect())
    }
}
