//! Similarity search for raaga.
//!
//! Builds numeric and TF-IDF features from a catalog, ranks neighbors
//! through either a dense cosine matrix or a Euclidean nearest-neighbor
//! index, and resolves free-text queries to catalog rows by fuzzy name
//! matching.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod features;
pub mod resolver;
pub mod similarity;
pub mod text;
pub mod vector;

pub use features::{MinMaxScaler, NumericFeatures, TextFeatures, TextFields, TfidfVectorizer};
pub use resolver::{Candidate, QueryResolver};
pub use similarity::{
    CombineWeights, DenseCosineMatrix, Neighbor, NeighborIndex, SimilarityStrategy, StrategyKind,
};
pub use vector::SparseVector;
