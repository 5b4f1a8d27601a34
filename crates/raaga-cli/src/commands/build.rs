use anyhow::{Context, Result};
use raaga_engine::{Config, Snapshot};

use super::{load_catalog, open_store};

pub fn run_build(config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;
    let store = open_store(config)?;

    log::info!(
        "Building {} artifacts from {}",
        config.strategy,
        config.catalog_path.display()
    );
    let snapshot =
        Snapshot::build(catalog, &config.build_options()).context("Failed to build artifacts")?;
    snapshot
        .persist(&store)
        .context("Failed to persist artifacts")?;

    println!("✓ Built {} over {} tracks", snapshot.kind(), snapshot.catalog().len());
    println!("  vocabulary: {} terms", snapshot.model().vocabulary_size());
    println!("  artifacts: {}", config.artifact_path.display());

    Ok(())
}
