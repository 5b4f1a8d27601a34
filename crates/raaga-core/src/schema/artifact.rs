use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Version of the artifact payload layout. Bump when any persisted
/// structure changes shape; older rows are then rejected at load.
pub const FORMAT_VERSION: u32 = 2;

/// The kinds of derived artifact a build persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Ordered track ids the other artifacts were built against.
    CatalogManifest,
    /// Fitted min-max scaler for the numeric columns.
    NumericScaler,
    /// TF-IDF vectorizer fit on genre text.
    GenreVectorizer,
    /// Combined dense similarity matrix.
    SimilarityMatrix,
    /// TF-IDF vectorizer fit on artist, album and genre text.
    CombinedVectorizer,
    /// Fitted nearest-neighbor index.
    NeighborIndex,
}

const KIND_NAMES: &[(ArtifactKind, &str)] = &[
    (ArtifactKind::CatalogManifest, "catalog_manifest"),
    (ArtifactKind::NumericScaler, "numeric_scaler"),
    (ArtifactKind::GenreVectorizer, "genre_vectorizer"),
    (ArtifactKind::SimilarityMatrix, "similarity_matrix"),
    (ArtifactKind::CombinedVectorizer, "combined_vectorizer"),
    (ArtifactKind::NeighborIndex, "neighbor_index"),
];

impl ArtifactKind {
    /// Canonical name, used as the primary key in the artifact table.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        KIND_NAMES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or("unknown", |(_, name)| name)
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        KIND_NAMES
            .iter()
            .find(|(_, canonical)| canonical.eq_ignore_ascii_case(name))
            .map(|(kind, _)| *kind)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header of a stored artifact, readable without decoding the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub kind: ArtifactKind,
    pub format_version: u32,
    /// Number of catalog rows the artifact covers.
    pub n_rows: usize,
    /// Feature or column dimensionality (vocabulary size, matrix width, ...).
    pub dims: usize,
    pub built_at: DateTime<Utc>,
    pub payload_bytes: usize,
}

/// An encoded artifact ready to be written.
#[derive(Debug, Clone)]
pub struct ArtifactBlob {
    pub kind: ArtifactKind,
    pub n_rows: usize,
    pub dims: usize,
    pub payload: Vec<u8>,
}

impl ArtifactBlob {
    /// Encode `value` with bincode.
    pub fn encode<T: Serialize>(
        kind: ArtifactKind,
        n_rows: usize,
        dims: usize,
        value: &T,
    ) -> Result<Self> {
        Ok(Self {
            kind,
            n_rows,
            dims,
            payload: bincode::serialize(value)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for (kind, name) in KIND_NAMES {
            assert_eq!(kind.as_str(), *name);
            assert_eq!(ArtifactKind::from_name(name), Some(*kind));
        }
    }

    #[test]
    fn test_kind_from_unknown_name() {
        assert_eq!(ArtifactKind::from_name("pickle"), None);
    }

    #[test]
    fn test_blob_encode() {
        let blob = ArtifactBlob::encode(ArtifactKind::NumericScaler, 3, 2, &vec![1.0_f64, 2.0])
            .unwrap();
        assert_eq!(blob.n_rows, 3);
        assert_eq!(blob.dims, 2);
        assert!(!blob.payload.is_empty());
    }
}
