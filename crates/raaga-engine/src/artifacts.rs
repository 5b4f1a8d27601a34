//! Persisting snapshots to the artifact store and loading them back.

use serde::{Deserialize, Serialize};

use raaga_core::model::{Catalog, TrackId};
use raaga_core::schema::{ArtifactBlob, ArtifactKind, ArtifactStore};
use raaga_core::{Error, Result};
use raaga_search::features::NUMERIC_COLUMNS;
use raaga_search::{DenseCosineMatrix, MinMaxScaler, NeighborIndex, StrategyKind, TfidfVectorizer};

use crate::snapshot::{BuildOptions, Model, Snapshot};

/// What was built, with which options, over which rows in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Manifest {
    options: BuildOptions,
    track_ids: Vec<TrackId>,
    fingerprint: [u8; 32],
}

impl Snapshot {
    /// Write this snapshot's model, replacing whatever the store held.
    pub fn persist(&self, store: &ArtifactStore) -> Result<()> {
        let n = self.catalog().len();
        let manifest = Manifest {
            options: *self.options(),
            track_ids: self.catalog().track_ids(),
            fingerprint: self.catalog().fingerprint(),
        };

        let mut blobs = vec![ArtifactBlob::encode(
            ArtifactKind::CatalogManifest,
            n,
            0,
            &manifest,
        )?];

        match self.model() {
            Model::DenseCosine {
                scaler,
                vectorizer,
                matrix,
            } => {
                blobs.push(ArtifactBlob::encode(
                    ArtifactKind::NumericScaler,
                    n,
                    scaler.width(),
                    scaler,
                )?);
                blobs.push(ArtifactBlob::encode(
                    ArtifactKind::GenreVectorizer,
                    n,
                    vectorizer.vocabulary_size(),
                    vectorizer,
                )?);
                blobs.push(ArtifactBlob::encode(
                    ArtifactKind::SimilarityMatrix,
                    n,
                    n,
                    matrix,
                )?);
            }
            Model::NeighborIndex { vectorizer, index } => {
                blobs.push(ArtifactBlob::encode(
                    ArtifactKind::CombinedVectorizer,
                    n,
                    vectorizer.vocabulary_size(),
                    vectorizer,
                )?);
                blobs.push(ArtifactBlob::encode(
                    ArtifactKind::NeighborIndex,
                    n,
                    index.dims(),
                    index,
                )?);
            }
        }

        store.replace_all(&blobs)
    }

    /// Rebuild a snapshot for `catalog` from stored artifacts, whatever
    /// options they were built with.
    ///
    /// # Errors
    /// `ModelNotFit` if nothing was built, the artifacts were built from a
    /// different catalog, or their dimensions disagree with each other.
    pub fn load(store: &ArtifactStore, catalog: Catalog) -> Result<Self> {
        Self::load_checked(store, catalog, None)
    }

    /// Like [`Snapshot::load`], but the stored artifacts must also have been
    /// built with the same effective `options`.
    ///
    /// # Errors
    /// `ModelNotFit` as for [`Snapshot::load`] or when the options differ.
    /// `InvalidArgument` if `options` carries bad weights.
    pub fn load_matching(
        store: &ArtifactStore,
        catalog: Catalog,
        options: &BuildOptions,
    ) -> Result<Self> {
        let expected = options.effective()?;
        Self::load_checked(store, catalog, Some(&expected))
    }

    fn load_checked(
        store: &ArtifactStore,
        catalog: Catalog,
        expected: Option<&BuildOptions>,
    ) -> Result<Self> {
        let n = catalog.len();
        let (manifest_info, manifest): (_, Manifest) =
            store.load(ArtifactKind::CatalogManifest, n)?;

        if let Some(expected) = expected {
            if manifest.options != *expected {
                return Err(Error::ModelNotFit(format!(
                    "artifacts were built with {:?}, requested {expected:?}",
                    manifest.options
                )));
            }
        }
        if manifest.track_ids != catalog.track_ids() {
            return Err(Error::ModelNotFit(
                "catalog has changed since the artifacts were built".to_string(),
            ));
        }
        if manifest.fingerprint != catalog.fingerprint() {
            return Err(Error::ModelNotFit(
                "catalog track data has changed since the artifacts were built".to_string(),
            ));
        }

        let model = match manifest.options.strategy {
            StrategyKind::DenseCosine => load_dense(store, n)?,
            StrategyKind::NeighborIndex => load_neighbors(store, n)?,
        };

        log::info!(
            "Loaded {} artifacts for {} tracks (built {})",
            manifest.options.strategy,
            n,
            manifest_info.built_at
        );
        Ok(Self::from_parts(
            catalog,
            model,
            manifest.options,
            manifest_info.built_at,
        ))
    }

    /// Strategy of the stored artifact set, if one has been built.
    pub fn stored_strategy(store: &ArtifactStore) -> Result<Option<StrategyKind>> {
        let Some(info) = store.info(ArtifactKind::CatalogManifest)? else {
            return Ok(None);
        };
        let (_, manifest): (_, Manifest) = store.load(ArtifactKind::CatalogManifest, info.n_rows)?;
        Ok(Some(manifest.options.strategy))
    }
}

fn load_dense(store: &ArtifactStore, n: usize) -> Result<Model> {
    let (_, scaler): (_, MinMaxScaler) = store.load(ArtifactKind::NumericScaler, n)?;
    if scaler.width() != NUMERIC_COLUMNS.len() {
        return Err(Error::ModelNotFit(format!(
            "numeric scaler has {} columns, expected {}",
            scaler.width(),
            NUMERIC_COLUMNS.len()
        )));
    }

    let (info, vectorizer): (_, TfidfVectorizer) = store.load(ArtifactKind::GenreVectorizer, n)?;
    check_dims(ArtifactKind::GenreVectorizer, info.dims, vectorizer.vocabulary_size())?;

    let (_, matrix): (_, DenseCosineMatrix) = store.load(ArtifactKind::SimilarityMatrix, n)?;
    matrix.validate(n)?;

    Ok(Model::DenseCosine {
        scaler,
        vectorizer,
        matrix,
    })
}

fn load_neighbors(store: &ArtifactStore, n: usize) -> Result<Model> {
    let (info, vectorizer): (_, TfidfVectorizer) =
        store.load(ArtifactKind::CombinedVectorizer, n)?;
    check_dims(ArtifactKind::CombinedVectorizer, info.dims, vectorizer.vocabulary_size())?;

    let (_, index): (_, NeighborIndex) = store.load(ArtifactKind::NeighborIndex, n)?;
    index.validate(n, vectorizer.vocabulary_size())?;

    Ok(Model::NeighborIndex { vectorizer, index })
}

fn check_dims(kind: ArtifactKind, recorded: usize, actual: usize) -> Result<()> {
    if recorded == actual {
        Ok(())
    } else {
        Err(Error::ModelNotFit(format!(
            "artifact {kind} records {recorded} dimensions but holds {actual}"
        )))
    }
}
