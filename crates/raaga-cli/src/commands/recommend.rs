use anyhow::{Context, Result};
use raaga_core::model::TrackId;
use raaga_core::Error;
use raaga_engine::{Config, Engine, Recommendations};

use super::{load_catalog, open_store};

fn open_engine(config: &Config) -> Result<Engine> {
    let catalog = load_catalog(config)?;
    let store = open_store(config)?;
    Engine::open(&store, catalog, &config.build_options()).context("Failed to prepare recommender")
}

/// How the recommend command picks its seed track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seed<'a> {
    /// Fuzzy-matched against catalog names.
    Query(&'a str),
    /// An exact catalog track id.
    Id(&'a str),
}

pub fn run_recommend(
    config: &Config,
    seed: Seed<'_>,
    count: Option<usize>,
    json: bool,
) -> Result<()> {
    let engine = open_engine(config)?;
    let n = count.unwrap_or(config.default_results);
    let outcome = match seed {
        Seed::Query(query) => engine.recommend(query, n),
        Seed::Id(id) => engine.snapshot().recommend_by_id(&TrackId::from(id), n),
    };

    let result = match outcome {
        Ok(result) => result,
        Err(e) if e.is_recoverable() => {
            eprintln!("{}", user_message(&e));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_recommendations(&result);
    }
    Ok(())
}

/// What to tell the user when a request fails in a way they can fix by
/// asking again.
fn user_message(err: &Error) -> String {
    match err {
        Error::NotFound { query } => format!("No song found matching '{query}'. Try again."),
        Error::InvalidArgument(reason) => format!("Invalid request: {reason}. Try again."),
        other => other.to_string(),
    }
}

fn print_recommendations(result: &Recommendations) {
    println!("\n🎵 {} - {} ({})\n", result.seed.name, result.seed.artist, result.seed.album);
    if result.items.is_empty() {
        println!("  No other tracks in the catalog.");
        return;
    }
    for (rank, item) in result.items.iter().enumerate() {
        println!(
            "  {:>2}. {} - {} [{:.3}]",
            rank + 1,
            item.track.name,
            item.track.artist,
            item.score
        );
    }
}

pub fn run_resolve(config: &Config, query: &str) -> Result<()> {
    let engine = open_engine(config)?;
    let snapshot = engine.snapshot();
    let candidates = match snapshot.candidates(query) {
        Ok(candidates) => candidates,
        Err(e) if e.is_recoverable() => {
            eprintln!("{}", user_message(&e));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if candidates.is_empty() {
        println!("No track matches '{query}'");
        return Ok(());
    }

    for (rank, candidate) in candidates.iter().enumerate() {
        let track = &snapshot.catalog().tracks()[candidate.index];
        let marker = if rank == 0 { "→" } else { " " };
        println!(
            "{marker} {} - {} [{:.3}{}]",
            track.name,
            track.artist,
            candidate.score,
            if candidate.exact { ", exact" } else { "" }
        );
    }
    Ok(())
}

pub fn run_suggest(config: &Config, text: &str, limit: usize) -> Result<()> {
    let catalog = load_catalog(config)?;
    let resolver = raaga_search::QueryResolver::new(&catalog);
    for name in resolver.suggest(text, limit) {
        println!("{name}");
    }
    Ok(())
}
