use serde::{Deserialize, Serialize};

/// A sparse feature vector with strictly increasing term indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<u32>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Build from `(index, value)` pairs already sorted by index with no
    /// repeats. Zero values are dropped.
    #[must_use]
    pub fn from_sorted(pairs: impl IntoIterator<Item = (u32, f64)>) -> Self {
        let (indices, values) = pairs.into_iter().filter(|(_, v)| *v != 0.0).unzip();
        Self { indices, values }
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of stored (non-zero) entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Largest stored index, if any.
    #[must_use]
    pub fn max_index(&self) -> Option<u32> {
        self.indices.last().copied()
    }

    #[must_use]
    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }

    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Scale to unit L2 norm. The zero vector is left unchanged.
    #[must_use]
    pub fn l2_normalized(mut self) -> Self {
        let norm = self.norm_squared().sqrt();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
        self
    }
}

/// Cosine similarity of two dense vectors, clamped to [0, 1].
///
/// Two zero vectors are identical and score 1.0; a zero vector against a
/// non-zero one scores 0.0.
#[must_use]
pub fn dense_cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    cosine_from_parts(dot, na, nb)
}

/// Cosine similarity of two sparse vectors, with the same zero-vector rule
/// as [`dense_cosine`].
#[must_use]
pub fn sparse_cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    cosine_from_parts(a.dot(b), a.norm_squared().sqrt(), b.norm_squared().sqrt())
}

fn cosine_from_parts(dot: f64, norm_a: f64, norm_b: f64) -> f64 {
    match (norm_a > 0.0, norm_b > 0.0) {
        (false, false) => 1.0,
        (true, true) => (dot / (norm_a * norm_b)).clamp(0.0, 1.0),
        _ => 0.0,
    }
}
