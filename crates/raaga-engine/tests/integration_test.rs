//! End-to-end tests: catalog CSV → build → persist → reload → recommend.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use raaga_core::model::Catalog;
use raaga_core::schema::{ArtifactKind, ArtifactStore};
use raaga_core::Error;
use raaga_engine::{BuildOptions, Engine, Snapshot};
use raaga_search::StrategyKind;
use tempfile::TempDir;

const HEADER: &str = "id,name,artist,album,release_date,popularity,duration_ms,genres,album_art_url";

const TRACKS: &[&str] = &[
    "t1,Vaathi Coming,Anirudh Ravichander,Master,2020-03-15,72,228000,\"kuthu, tamil pop\",https://img/1",
    "t2,Kutti Story,Anirudh Ravichander,Master,2020-02-14,68,325000,\"tamil pop, melody\",https://img/2",
    "t3,Rowdy Baby,Yuvan Shankar Raja,Maari 2,2018-12-01,80,283000,\"kuthu, tamil pop\",https://img/3",
    "t4,Kannaana Kanney,D. Imman,Viswasam,2019-01-10,55,261000,melody,https://img/4",
    "t5,Arabic Kuthu,Anirudh Ravichander,Beast,2022-02-14,85,279000,kuthu,https://img/5",
    "t6,Kaavaalaa,Anirudh Ravichander,Jailer,2023-07-06,83,190000,kuthu,https://img/6",
];

fn write_catalog(dir: &Path, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.join("tracks.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    path
}

fn neighbor_options() -> BuildOptions {
    BuildOptions {
        strategy: StrategyKind::NeighborIndex,
        ..BuildOptions::default()
    }
}

/// Build from CSV, persist to disk, reopen and get the same answers.
#[test]
fn test_build_persist_reload_each_strategy() {
    for options in [BuildOptions::default(), neighbor_options()] {
        let temp_dir = TempDir::new().unwrap();
        let csv = write_catalog(temp_dir.path(), TRACKS);
        let db_path = temp_dir.path().join("raaga.db");

        let built = {
            let store = ArtifactStore::open(&db_path).unwrap();
            let engine = Engine::open(&store, Catalog::load_csv(&csv).unwrap(), &options).unwrap();
            engine.recommend("vaathi coming", 5).unwrap()
        };

        let store = ArtifactStore::open(&db_path).unwrap();
        let reloaded = Snapshot::load(&store, Catalog::load_csv(&csv).unwrap()).unwrap();
        assert_eq!(reloaded.kind(), options.strategy);
        assert_eq!(reloaded.recommend("vaathi coming", 5).unwrap(), built);
    }
}

#[test]
fn test_recommendations_are_ordered_and_exclude_seed() {
    let temp_dir = TempDir::new().unwrap();
    let csv = write_catalog(temp_dir.path(), TRACKS);
    let catalog = Catalog::load_csv(&csv).unwrap();

    for options in [BuildOptions::default(), neighbor_options()] {
        let snapshot = Snapshot::build(catalog.clone(), &options).unwrap();
        for track in catalog.iter() {
            for n in [1, 3, 5, 10] {
                let result = snapshot.recommend(&track.name, n).unwrap();
                assert_eq!(result.seed.id, track.id);
                assert_eq!(result.items.len(), n.min(catalog.len() - 1));
                assert!(result.items.iter().all(|item| item.track.id != track.id));
                for pair in result.items.windows(2) {
                    assert!(pair[0].score >= pair[1].score);
                }
            }
        }
    }
}

#[test]
fn test_dense_recommendation_prefers_shared_genres() {
    let temp_dir = TempDir::new().unwrap();
    let csv = write_catalog(temp_dir.path(), TRACKS);
    let snapshot =
        Snapshot::build(Catalog::load_csv(&csv).unwrap(), &BuildOptions::default()).unwrap();

    // identical genre tags and close popularity/duration
    let result = snapshot.recommend("vaathi coming", 1).unwrap();
    assert_eq!(result.names(), vec!["Rowdy Baby"]);
}

#[test]
fn test_neighbor_recommendation_prefers_same_album() {
    let temp_dir = TempDir::new().unwrap();
    let csv = write_catalog(temp_dir.path(), TRACKS);
    let snapshot = Snapshot::build(Catalog::load_csv(&csv).unwrap(), &neighbor_options()).unwrap();

    let result = snapshot.recommend("kutti story", 1).unwrap();
    assert_eq!(result.names(), vec!["Vaathi Coming"]);
}

#[test]
fn test_artifacts_from_other_catalog_do_not_fit() {
    let temp_dir = TempDir::new().unwrap();
    let csv = write_catalog(temp_dir.path(), TRACKS);
    let store = ArtifactStore::open(temp_dir.path().join("raaga.db")).unwrap();
    Snapshot::build(Catalog::load_csv(&csv).unwrap(), &BuildOptions::default())
        .unwrap()
        .persist(&store)
        .unwrap();

    // same size, different ids
    let other_dir = TempDir::new().unwrap();
    let renamed: Vec<String> = TRACKS.iter().map(|row| row.replacen('t', "x", 1)).collect();
    let rows: Vec<&str> = renamed.iter().map(String::as_str).collect();
    let other = Catalog::load_csv(write_catalog(other_dir.path(), &rows)).unwrap();
    assert!(matches!(
        Snapshot::load(&store, other),
        Err(Error::ModelNotFit(_))
    ));

    // fewer rows
    let smaller = Catalog::load_csv(write_catalog(other_dir.path(), &TRACKS[..4])).unwrap();
    assert!(matches!(
        Snapshot::load(&store, smaller),
        Err(Error::ModelNotFit(_))
    ));
}

#[test]
fn test_artifact_headers_after_build() {
    let temp_dir = TempDir::new().unwrap();
    let csv = write_catalog(temp_dir.path(), TRACKS);
    let store = ArtifactStore::open(temp_dir.path().join("raaga.db")).unwrap();
    Engine::open(&store, Catalog::load_csv(&csv).unwrap(), &BuildOptions::default()).unwrap();

    let kinds: Vec<ArtifactKind> = store.list().unwrap().iter().map(|info| info.kind).collect();
    assert_eq!(kinds.len(), 4);
    for kind in [
        ArtifactKind::CatalogManifest,
        ArtifactKind::NumericScaler,
        ArtifactKind::GenreVectorizer,
        ArtifactKind::SimilarityMatrix,
    ] {
        assert!(kinds.contains(&kind));
    }

    let matrix = store.info(ArtifactKind::SimilarityMatrix).unwrap().unwrap();
    assert_eq!(matrix.n_rows, TRACKS.len());
    assert_eq!(matrix.dims, TRACKS.len());
}

#[test]
fn test_two_builds_are_identical() {
    let temp_dir = TempDir::new().unwrap();
    let csv = write_catalog(temp_dir.path(), TRACKS);
    for options in [BuildOptions::default(), neighbor_options()] {
        let a = Snapshot::build(Catalog::load_csv(&csv).unwrap(), &options).unwrap();
        let b = Snapshot::build(Catalog::load_csv(&csv).unwrap(), &options).unwrap();
        assert_eq!(a.model(), b.model());
    }
}

/// Readers that grabbed a snapshot before a swap keep a consistent view.
#[test]
fn test_readers_survive_rebuild() {
    let temp_dir = TempDir::new().unwrap();
    let small = Catalog::load_csv(write_catalog(temp_dir.path(), &TRACKS[..3])).unwrap();
    let full = Catalog::load_csv(write_catalog(temp_dir.path(), TRACKS)).unwrap();

    let engine = Arc::new(Engine::new(
        Snapshot::build(small, &BuildOptions::default()).unwrap(),
    ));
    let held = engine.snapshot();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..50 {
                    let snapshot = engine.snapshot();
                    let result = snapshot.recommend("rowdy baby", 10).unwrap();
                    assert_eq!(result.items.len(), snapshot.catalog().len() - 1);
                }
            })
        })
        .collect();

    engine.rebuild(full, &BuildOptions::default()).unwrap();

    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(held.recommend("rowdy baby", 10).unwrap().items.len(), 2);
    assert_eq!(engine.recommend("rowdy baby", 10).unwrap().items.len(), 5);
}

#[test]
fn test_unknown_song_is_reported_not_panicked() {
    let temp_dir = TempDir::new().unwrap();
    let csv = write_catalog(temp_dir.path(), TRACKS);
    let snapshot =
        Snapshot::build(Catalog::load_csv(&csv).unwrap(), &BuildOptions::default()).unwrap();

    let err = snapshot.recommend("qzxwv", 5).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "no track found matching 'qzxwv'");
}
