//! Ranking strategies.
//!
//! Both strategies answer the same question, "which rows are most similar
//! to row `i`", through [`SimilarityStrategy::rank`]. Callers pick one with
//! [`StrategyKind`] at build time and never see the concrete type.

pub mod dense;
pub mod knn;

pub use dense::{CombineWeights, DenseCosineMatrix};
pub use knn::NeighborIndex;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use raaga_core::{Error, Result};

/// A ranked row and its similarity score (higher is more similar).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub index: usize,
    pub score: f64,
}

/// Ranks catalog rows by similarity to an existing row.
pub trait SimilarityStrategy: fmt::Debug + Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Number of catalog rows the strategy was built over.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `k` rows other than `index`, best first. Equal scores are
    /// ordered by ascending row index.
    ///
    /// # Errors
    /// `InvalidArgument` if `index` is out of range or `k` is zero.
    fn rank(&self, index: usize, k: usize) -> Result<Vec<Neighbor>>;
}

/// The available strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// 50/50 blend of numeric cosine and genre TF-IDF cosine, precomputed.
    #[default]
    DenseCosine,
    /// Euclidean nearest neighbors over artist/album/genre TF-IDF.
    NeighborIndex,
}

impl StrategyKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DenseCosine => "dense_cosine",
            Self::NeighborIndex => "neighbor_index",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "dense_cosine" | "dense" | "cosine" => Ok(Self::DenseCosine),
            "neighbor_index" | "knn" => Ok(Self::NeighborIndex),
            other => Err(format!(
                "unknown strategy '{other}' (expected dense_cosine or neighbor_index)"
            )),
        }
    }
}

pub(crate) fn check_query(index: usize, k: usize, len: usize) -> Result<()> {
    if k == 0 {
        return Err(Error::InvalidArgument(
            "number of results must be positive".to_string(),
        ));
    }
    if index >= len {
        return Err(Error::InvalidArgument(format!(
            "row {index} is out of range for a catalog of {len} tracks"
        )));
    }
    Ok(())
}

/// Keep the best `k` candidates under `cmp` and return them sorted.
///
/// `cmp` must be a total order (ties broken by index) so the result does not
/// depend on the selection algorithm.
pub(crate) fn top_k<T, F>(mut items: Vec<T>, k: usize, cmp: F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    if k < items.len() {
        items.select_nth_unstable_by(k, &cmp);
        items.truncate(k);
    }
    items.sort_unstable_by(&cmp);
    items
}
