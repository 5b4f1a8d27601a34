use serde::{Deserialize, Serialize};

use raaga_core::{Error, Result};

use super::{check_query, top_k, Neighbor, SimilarityStrategy, StrategyKind};
use crate::vector::SparseVector;

/// Exact Euclidean nearest-neighbor search over sparse TF-IDF rows.
///
/// An inverted index from term to the rows containing it makes each query
/// touch only rows that share a term with the query row. Every other row
/// sits at distance `sqrt(|q|² + |x|²)` and is ranked without a dot product.
///
/// Scores are `1 / (1 + distance)`, so identical rows score 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NeighborIndexRows", into = "NeighborIndexRows")]
pub struct NeighborIndex {
    dims: usize,
    rows: Vec<SparseVector>,
    norms: Vec<f64>,
    postings: Vec<Vec<(u32, f64)>>,
}

/// Persisted form: the rows alone. Postings and norms are derived.
#[derive(Serialize, Deserialize)]
struct NeighborIndexRows {
    dims: usize,
    rows: Vec<SparseVector>,
}

impl From<NeighborIndexRows> for NeighborIndex {
    fn from(stored: NeighborIndexRows) -> Self {
        Self::index(stored.dims, stored.rows)
    }
}

impl From<NeighborIndex> for NeighborIndexRows {
    fn from(index: NeighborIndex) -> Self {
        Self {
            dims: index.dims,
            rows: index.rows,
        }
    }
}

impl NeighborIndex {
    /// Index `rows`, each a vector in a space of `dims` terms.
    ///
    /// # Errors
    /// `FeatureBuild` if a row has a term index outside `dims`.
    pub fn new(dims: usize, rows: Vec<SparseVector>) -> Result<Self> {
        if let Some((row, max)) = rows
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.max_index().map(|m| (i, m)))
            .find(|&(_, m)| m as usize >= dims)
        {
            return Err(Error::FeatureBuild(format!(
                "row {row} uses term {max} but the index has {dims} dimensions"
            )));
        }
        let index = Self::index(dims, rows);
        log::info!(
            "Built neighbor index: {} rows, {} dimensions",
            index.rows.len(),
            dims
        );
        Ok(index)
    }

    fn index(dims: usize, rows: Vec<SparseVector>) -> Self {
        let mut postings: Vec<Vec<(u32, f64)>> = vec![Vec::new(); dims];
        for (row, vector) in rows.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let row = row as u32;
            for (term, value) in vector.iter() {
                if let Some(list) = postings.get_mut(term as usize) {
                    list.push((row, value));
                }
            }
        }
        let norms = rows.iter().map(SparseVector::norm_squared).collect();
        Self {
            dims,
            rows,
            norms,
            postings,
        }
    }

    /// Check a deserialized index against the catalog and vectorizer it is
    /// meant for.
    ///
    /// # Errors
    /// `ModelNotFit` on any dimensional mismatch.
    pub fn validate(&self, expected_rows: usize, expected_dims: usize) -> Result<()> {
        if self.rows.len() != expected_rows {
            return Err(Error::ModelNotFit(format!(
                "neighbor index has {} rows, catalog has {expected_rows}",
                self.rows.len()
            )));
        }
        if self.dims != expected_dims {
            return Err(Error::ModelNotFit(format!(
                "neighbor index has {} dimensions, vectorizer has {expected_dims}",
                self.dims
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Euclidean distance from `index` to every row, in row order.
    fn distances(&self, index: usize) -> Vec<f64> {
        let mut dots = vec![0.0; self.rows.len()];
        for (term, q) in self.rows[index].iter() {
            if let Some(list) = self.postings.get(term as usize) {
                for &(row, x) in list {
                    dots[row as usize] += q * x;
                }
            }
        }
        let q_norm = self.norms[index];
        dots.iter()
            .zip(&self.norms)
            .map(|(dot, x_norm)| (q_norm + x_norm - 2.0 * dot).max(0.0).sqrt())
            .collect()
    }
}

impl SimilarityStrategy for NeighborIndex {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NeighborIndex
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn rank(&self, index: usize, k: usize) -> Result<Vec<Neighbor>> {
        check_query(index, k, self.rows.len())?;

        let candidates: Vec<(usize, f64)> = self
            .distances(index)
            .into_iter()
            .enumerate()
            .filter(|&(j, _)| j != index)
            .collect();

        let ranked = top_k(candidates, k, |a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        Ok(ranked
            .into_iter()
            .map(|(index, distance)| Neighbor {
                index,
                score: 1.0 / (1.0 + distance),
            })
            .collect())
    }
}
