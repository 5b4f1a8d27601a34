use arc_swap::ArcSwap;
use std::sync::Arc;

use raaga_core::model::Catalog;
use raaga_core::schema::ArtifactStore;
use raaga_core::{Error, Result};

use crate::service::Recommendations;
use crate::snapshot::{BuildOptions, Snapshot};

/// Serves requests from the current [`Snapshot`] and swaps in rebuilt ones.
///
/// Readers take an `Arc` to the snapshot that is current when they start and
/// finish against it, however many swaps happen meanwhile.
#[derive(Debug)]
pub struct Engine {
    current: ArcSwap<Snapshot>,
}

impl Engine {
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Start from stored artifacts when they fit `catalog` and were built
    /// with the same effective options; otherwise build and persist a fresh
    /// set.
    pub fn open(store: &ArtifactStore, catalog: Catalog, options: &BuildOptions) -> Result<Self> {
        match Snapshot::load_matching(store, catalog.clone(), options) {
            Ok(snapshot) => return Ok(Self::new(snapshot)),
            Err(Error::ModelNotFit(reason)) => {
                log::info!("Stored artifacts not usable ({reason}), building");
            }
            Err(e) => return Err(e),
        }

        let snapshot = Snapshot::build(catalog, options)?;
        snapshot.persist(store)?;
        Ok(Self::new(snapshot))
    }

    /// The snapshot requests should read right now.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Install `snapshot`, returning the one it replaces.
    pub fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let previous = self.current.swap(Arc::new(snapshot));
        log::info!(
            "Swapped snapshot: {} tracks -> {} tracks",
            previous.catalog().len(),
            self.current.load().catalog().len()
        );
        previous
    }

    /// Build a snapshot for `catalog` off to the side and swap it in.
    ///
    /// On failure the current snapshot stays in place.
    pub fn rebuild(&self, catalog: Catalog, options: &BuildOptions) -> Result<Arc<Snapshot>> {
        let snapshot = Snapshot::build(catalog, options)?;
        Ok(self.replace(snapshot))
    }

    /// [`Snapshot::recommend`] against the current snapshot.
    pub fn recommend(&self, query: &str, n: usize) -> Result<Recommendations> {
        self.current.load().recommend(query, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raaga_core::model::TrackRecord;
    use crate::snapshot::Model;
    use raaga_search::{CombineWeights, StrategyKind};

    fn catalog(names: &[&str]) -> Catalog {
        Catalog::new(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| TrackRecord::new(format!("t{i}"), *name).with_genres("kuthu"))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_rebuild_swaps_snapshot() {
        let engine = Engine::new(
            Snapshot::build(catalog(&["Vaathi Coming", "Vaathi Raid"]), &BuildOptions::default())
                .unwrap(),
        );
        let before = engine.snapshot();

        let previous = engine
            .rebuild(
                catalog(&["Vaathi Coming", "Vaathi Raid", "Arabic Kuthu"]),
                &BuildOptions::default(),
            )
            .unwrap();

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.catalog().len(), 2);
        assert_eq!(engine.snapshot().catalog().len(), 3);
        assert_eq!(engine.recommend("vathi", 5).unwrap().items.len(), 2);
        assert_eq!(before.recommend("vathi", 5).unwrap().items.len(), 1);
    }

    #[test]
    fn test_failed_rebuild_keeps_current() {
        let engine = Engine::new(
            Snapshot::build(catalog(&["Kaavaalaa", "Hukum"]), &BuildOptions::default()).unwrap(),
        );
        let genreless = Catalog::new(vec![
            TrackRecord::new("a", "One"),
            TrackRecord::new("b", "Two"),
        ])
        .unwrap();

        assert!(engine.rebuild(genreless, &BuildOptions::default()).is_err());
        assert_eq!(engine.snapshot().catalog().get(0).unwrap().name, "Kaavaalaa");
    }

    #[test]
    fn test_open_builds_then_reuses_artifacts() {
        let store = ArtifactStore::open_in_memory().unwrap();
        let tracks = catalog(&["Kaavaalaa", "Hukum", "Jailer Theme"]);

        let first = Engine::open(&store, tracks.clone(), &BuildOptions::default()).unwrap();
        let second = Engine::open(&store, tracks, &BuildOptions::default()).unwrap();
        assert_eq!(second.snapshot().model(), first.snapshot().model());

        // loaded snapshots carry the stored build time
        let stored = store
            .info(raaga_core::schema::ArtifactKind::CatalogManifest)
            .unwrap()
            .unwrap();
        assert_eq!(second.snapshot().built_at(), stored.built_at);
    }

    #[test]
    fn test_open_rebuilds_for_other_strategy() {
        let store = ArtifactStore::open_in_memory().unwrap();
        let tracks = catalog(&["Kaavaalaa", "Hukum"]);
        Engine::open(&store, tracks.clone(), &BuildOptions::default()).unwrap();

        let options = BuildOptions {
            strategy: StrategyKind::NeighborIndex,
            ..BuildOptions::default()
        };
        let engine = Engine::open(&store, tracks, &options).unwrap();
        assert_eq!(engine.snapshot().kind(), StrategyKind::NeighborIndex);
        assert_eq!(
            Snapshot::stored_strategy(&store).unwrap(),
            Some(StrategyKind::NeighborIndex)
        );
    }

    #[test]
    fn test_open_rebuilds_for_changed_catalog() {
        let store = ArtifactStore::open_in_memory().unwrap();
        Engine::open(&store, catalog(&["Kaavaalaa", "Hukum"]), &BuildOptions::default()).unwrap();

        let engine = Engine::open(
            &store,
            catalog(&["Kaavaalaa", "Hukum", "Jailer Theme"]),
            &BuildOptions::default(),
        )
        .unwrap();
        assert_eq!(engine.snapshot().catalog().len(), 3);
    }

    fn pair_score(snapshot: &Snapshot, i: usize, j: usize) -> f32 {
        let Model::DenseCosine { matrix, .. } = snapshot.model() else {
            panic!("expected the dense strategy");
        };
        matrix.get(i, j)
    }

    #[test]
    fn test_open_rebuilds_for_changed_weights() {
        let store = ArtifactStore::open_in_memory().unwrap();
        // a and b share numbers but no genre
        let tracks = Catalog::new(vec![
            TrackRecord::new("a", "Kaavaalaa")
                .with_genres("kuthu")
                .with_popularity(80.0)
                .with_duration_ms(200_000.0),
            TrackRecord::new("b", "Hukum")
                .with_genres("tamil pop")
                .with_popularity(80.0)
                .with_duration_ms(200_000.0),
            TrackRecord::new("c", "Jailer Theme")
                .with_genres("melody")
                .with_popularity(20.0)
                .with_duration_ms(100_000.0),
        ])
        .unwrap();
        let stale = Engine::open(&store, tracks.clone(), &BuildOptions::default()).unwrap();
        assert!((pair_score(&stale.snapshot(), 0, 1) - 0.5).abs() < 1e-6);

        let numeric_only = BuildOptions {
            weights: CombineWeights {
                numeric: 1.0,
                genre: 0.0,
            },
            ..BuildOptions::default()
        };
        let engine = Engine::open(&store, tracks, &numeric_only).unwrap();
        let fresh = engine.snapshot();
        assert!((pair_score(&fresh, 0, 1) - 1.0).abs() < 1e-6);
        assert_eq!(fresh.options().weights, numeric_only.weights);

        // the rebuilt set is what the store now holds
        let reopened = Engine::open(&store, fresh.catalog().clone(), &numeric_only).unwrap();
        assert_eq!(reopened.snapshot().built_at(), fresh.built_at());
    }

    #[test]
    fn test_open_rebuilds_for_changed_genres() {
        let store = ArtifactStore::open_in_memory().unwrap();
        let tracks = catalog(&["Alpha", "Beta", "Gamma"]);
        Engine::open(&store, tracks.clone(), &BuildOptions::default()).unwrap();

        let mut rows = tracks.tracks().to_vec();
        rows[1].genres = "carnatic".to_string();
        let changed = Catalog::new(rows).unwrap();
        let engine = Engine::open(&store, changed, &BuildOptions::default()).unwrap();

        let snapshot = engine.snapshot();
        let Model::DenseCosine { vectorizer, .. } = snapshot.model() else {
            panic!("expected the dense strategy");
        };
        assert!(vectorizer.idf("carnatic").is_some());
    }
}
