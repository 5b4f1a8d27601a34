//! Immutable, ready-to-query engine state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use raaga_core::model::Catalog;
use raaga_core::Result;
use raaga_search::{
    CombineWeights, DenseCosineMatrix, MinMaxScaler, NeighborIndex, NumericFeatures,
    QueryResolver, SimilarityStrategy, StrategyKind, TextFeatures, TextFields, TfidfVectorizer,
};

/// How to build a [`Snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    pub strategy: StrategyKind,
    /// Dense strategy only.
    pub weights: CombineWeights,
    /// Neighbor-index strategy only.
    pub stop_words: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            weights: CombineWeights::default(),
            stop_words: true,
        }
    }
}

impl BuildOptions {
    /// The options with settings the chosen strategy ignores reset to their
    /// defaults and dense weights normalized, so two option sets that build
    /// the same model compare equal.
    ///
    /// # Errors
    /// `InvalidArgument` for bad dense weights.
    pub fn effective(&self) -> Result<Self> {
        let defaults = Self::default();
        match self.strategy {
            StrategyKind::DenseCosine => Ok(Self {
                strategy: self.strategy,
                weights: self.weights.normalized()?,
                stop_words: defaults.stop_words,
            }),
            StrategyKind::NeighborIndex => Ok(Self {
                strategy: self.strategy,
                weights: defaults.weights,
                stop_words: self.stop_words,
            }),
        }
    }
}

/// A fitted similarity model together with the feature transforms it was
/// built from.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    DenseCosine {
        scaler: MinMaxScaler,
        vectorizer: TfidfVectorizer,
        matrix: DenseCosineMatrix,
    },
    NeighborIndex {
        vectorizer: TfidfVectorizer,
        index: NeighborIndex,
    },
}

impl Model {
    /// Fit features and the chosen strategy over the whole catalog.
    ///
    /// # Errors
    /// `FeatureBuild` for degenerate catalogs, `InvalidArgument` for bad
    /// weights.
    pub fn fit(catalog: &Catalog, options: &BuildOptions) -> Result<Self> {
        match options.strategy {
            StrategyKind::DenseCosine => {
                let numeric = NumericFeatures::build(catalog)?;
                let genre = TextFeatures::build(catalog, TextFields::Genres, false)?;
                let matrix = DenseCosineMatrix::build(&numeric, &genre, options.weights)?;
                Ok(Self::DenseCosine {
                    scaler: numeric.scaler,
                    vectorizer: genre.vectorizer,
                    matrix,
                })
            }
            StrategyKind::NeighborIndex => {
                let text = TextFeatures::build(
                    catalog,
                    TextFields::ArtistAlbumGenres,
                    options.stop_words,
                )?;
                let index = NeighborIndex::new(text.dims(), text.vectors)?;
                Ok(Self::NeighborIndex {
                    vectorizer: text.vectorizer,
                    index,
                })
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> StrategyKind {
        self.strategy().kind()
    }

    #[must_use]
    pub fn strategy(&self) -> &dyn SimilarityStrategy {
        match self {
            Self::DenseCosine { matrix, .. } => matrix,
            Self::NeighborIndex { index, .. } => index,
        }
    }

    /// Vocabulary size of the model's text features.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        match self {
            Self::DenseCosine { vectorizer, .. } | Self::NeighborIndex { vectorizer, .. } => {
                vectorizer.vocabulary_size()
            }
        }
    }
}

/// One consistent (catalog, resolver, model) triple.
///
/// Never mutated after construction; share it behind an `Arc`.
#[derive(Debug)]
pub struct Snapshot {
    catalog: Catalog,
    resolver: QueryResolver,
    model: Model,
    options: BuildOptions,
    built_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build every derived structure for `catalog`.
    pub fn build(catalog: Catalog, options: &BuildOptions) -> Result<Self> {
        log::info!(
            "Building {} snapshot over {} tracks",
            options.strategy,
            catalog.len()
        );
        let options = options.effective()?;
        let model = Model::fit(&catalog, &options)?;
        Ok(Self::from_parts(catalog, model, options, Utc::now()))
    }

    pub(crate) fn from_parts(
        catalog: Catalog,
        model: Model,
        options: BuildOptions,
        built_at: DateTime<Utc>,
    ) -> Self {
        let resolver = QueryResolver::new(&catalog);
        Self {
            catalog,
            resolver,
            model,
            options,
            built_at,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn resolver(&self) -> &QueryResolver {
        &self.resolver
    }

    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    #[must_use]
    pub fn strategy(&self) -> &dyn SimilarityStrategy {
        self.model.strategy()
    }

    #[must_use]
    pub fn kind(&self) -> StrategyKind {
        self.model.kind()
    }

    /// The effective options the model was built with.
    #[must_use]
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    #[must_use]
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}
