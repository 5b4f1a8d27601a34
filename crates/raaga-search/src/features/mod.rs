//! Feature construction from catalog metadata.
//!
//! Two families of features are derived from a [`Catalog`]:
//!
//! - numeric: `[popularity, duration_ms]`, min-max scaled over the catalog
//! - text: TF-IDF vectors over genres alone, or over artist, album and genres

pub mod scaler;
pub mod tfidf;

pub use scaler::MinMaxScaler;
pub use tfidf::TfidfVectorizer;

use serde::{Deserialize, Serialize};

use raaga_core::model::{Catalog, TrackRecord};
use raaga_core::{Error, Result};

use crate::vector::SparseVector;

/// Names of the numeric columns, in feature order.
pub const NUMERIC_COLUMNS: [&str; 2] = ["popularity", "duration_ms"];

fn numeric_row(track: &TrackRecord) -> Vec<f64> {
    vec![track.popularity, track.duration_ms]
}

/// Which text fields make up a track's document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextFields {
    /// The genre tag string only.
    Genres,
    /// `artist album genres`, space separated.
    ArtistAlbumGenres,
}

impl TextFields {
    #[must_use]
    pub fn document(self, track: &TrackRecord) -> String {
        match self {
            Self::Genres => track.genres.clone(),
            Self::ArtistAlbumGenres => {
                format!("{} {} {}", track.artist, track.album, track.genres)
            }
        }
    }
}

/// Scaled numeric vectors plus the scaler that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericFeatures {
    pub scaler: MinMaxScaler,
    pub vectors: Vec<Vec<f64>>,
}

impl NumericFeatures {
    /// Fit a scaler on the whole catalog and scale every row.
    pub fn build(catalog: &Catalog) -> Result<Self> {
        let rows: Vec<Vec<f64>> = catalog.iter().map(numeric_row).collect();
        let scaler = MinMaxScaler::fit(&rows)?;
        Ok(Self::with_scaler(catalog, scaler))
    }

    /// Scale the catalog with a previously fitted scaler.
    #[must_use]
    pub fn with_scaler(catalog: &Catalog, scaler: MinMaxScaler) -> Self {
        let vectors = catalog
            .iter()
            .map(|track| scaler.transform(&numeric_row(track)))
            .collect();
        Self { scaler, vectors }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// TF-IDF vectors for one choice of text fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFeatures {
    pub fields: TextFields,
    pub vectorizer: TfidfVectorizer,
    pub vectors: Vec<SparseVector>,
}

impl TextFeatures {
    /// Fit a vectorizer on the catalog's documents and vectorize every row.
    ///
    /// # Errors
    /// `FeatureBuild` if the chosen fields are empty across the catalog.
    pub fn build(catalog: &Catalog, fields: TextFields, stop_words: bool) -> Result<Self> {
        let documents: Vec<String> = catalog.iter().map(|t| fields.document(t)).collect();
        let vectorizer = TfidfVectorizer::fit(&documents, stop_words)
            .map_err(|e| Error::FeatureBuild(format!("{fields:?} text: {e}")))?;
        let vectors = documents.iter().map(|d| vectorizer.transform(d)).collect();

        log::debug!(
            "Fit {:?} vectorizer: {} terms over {} documents",
            fields,
            vectorizer.vocabulary_size(),
            documents.len()
        );

        Ok(Self {
            fields,
            vectorizer,
            vectors,
        })
    }

    /// Vectorize the catalog with a previously fitted vectorizer.
    #[must_use]
    pub fn with_vectorizer(
        catalog: &Catalog,
        fields: TextFields,
        vectorizer: TfidfVectorizer,
    ) -> Self {
        let vectors = catalog
            .iter()
            .map(|t| vectorizer.transform(&fields.document(t)))
            .collect();
        Self {
            fields,
            vectorizer,
            vectors,
        }
    }

    #[must_use]
    pub fn dims(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
