pub mod build;
pub mod config;
pub mod recommend;
pub mod status;

pub use build::run_build;
pub use recommend::{run_recommend, run_resolve, run_suggest, Seed};
pub use status::show_status;

use anyhow::{Context, Result};
use raaga_core::model::Catalog;
use raaga_core::schema::ArtifactStore;
use raaga_engine::Config;

fn load_catalog(config: &Config) -> Result<Catalog> {
    Catalog::load_csv(&config.catalog_path)
        .with_context(|| format!("Failed to load catalog {}", config.catalog_path.display()))
}

fn open_store(config: &Config) -> Result<ArtifactStore> {
    if let Some(parent) = config.artifact_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    ArtifactStore::open(&config.artifact_path).with_context(|| {
        format!(
            "Failed to open artifact database {}",
            config.artifact_path.display()
        )
    })
}
