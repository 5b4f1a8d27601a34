use anyhow::Result;
use raaga_engine::{Config, Snapshot};

use super::open_store;

pub fn show_status(config: &Config) -> Result<()> {
    println!("\n📊 Raaga Status\n");
    println!("  Catalog: {}", config.catalog_path.display());
    if !config.catalog_path.exists() {
        println!("    (missing)");
    }
    println!("  Artifacts: {}", config.artifact_path.display());
    println!("  Configured strategy: {}", config.strategy);

    if !config.artifact_path.exists() {
        println!("\n  No artifacts yet. Run `raaga build` to create them.");
        return Ok(());
    }

    let store = open_store(config)?;
    match Snapshot::stored_strategy(&store)? {
        Some(strategy) => println!("  Stored strategy: {strategy}"),
        None => {
            println!("\n  No artifacts yet. Run `raaga build` to create them.");
            return Ok(());
        }
    }

    println!();
    for info in store.list()? {
        println!(
            "  {:<20} rows={:<6} dims={:<6} {:>10} bytes  built {}",
            info.kind.as_str(),
            info.n_rows,
            info.dims,
            info.payload_bytes,
            info.built_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}
