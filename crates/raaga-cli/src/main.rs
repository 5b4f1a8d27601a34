use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use raaga_engine::Config;
use raaga_search::StrategyKind;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "raaga", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the track catalog CSV (default: ~/.local/share/raaga/tracks.csv)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Path to the artifact database (default: ~/.local/share/raaga/raaga.db)
    #[arg(long, global = true)]
    artifacts: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Build similarity artifacts from the catalog
    ///
    /// Loads the catalog CSV, fits the numeric scaler and TF-IDF vocabularies,
    /// and builds the chosen similarity strategy:
    ///
    /// - dense_cosine: every pair of tracks scored by a blend of
    ///   popularity/duration similarity and genre similarity
    /// - neighbor_index: nearest neighbors over artist, album and genre text
    ///
    /// The result replaces whatever the artifact database held. Later
    /// commands load it instead of rebuilding, as long as the catalog is
    /// unchanged.
    Build {
        /// Similarity strategy (default from config)
        #[arg(long)]
        strategy: Option<StrategyKind>,
    },
    /// Recommend songs similar to the one named
    Recommend {
        /// Song name; misspellings and partial names are matched fuzzily
        query: String,

        /// Treat the query as an exact catalog track id
        #[arg(long)]
        by_id: bool,

        /// Number of recommendations (default from config)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Similarity strategy (default from config)
        #[arg(long)]
        strategy: Option<StrategyKind>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which catalog songs a query matches
    Resolve {
        query: String,
    },
    /// List catalog song names containing some text
    Suggest {
        text: String,

        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show catalog and artifact status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults if it does not exist
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?.with_paths(cli.catalog, cli.artifacts);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    match cli.command {
        Commands::Build { strategy } => {
            let config = apply_strategy(config, strategy);
            commands::run_build(&config)?;
        }
        Commands::Recommend {
            query,
            by_id,
            count,
            strategy,
            json,
        } => {
            let config = apply_strategy(config, strategy);
            let seed = if by_id {
                commands::Seed::Id(&query)
            } else {
                commands::Seed::Query(&query)
            };
            commands::run_recommend(&config, seed, count, json)?;
        }
        Commands::Resolve { query } => {
            commands::run_resolve(&config, &query)?;
        }
        Commands::Suggest { text, limit } => {
            commands::run_suggest(&config, &text, limit)?;
        }
        Commands::Status => {
            commands::show_status(&config)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config)?,
            ConfigAction::Path => commands::config::show_path()?,
            ConfigAction::Example => commands::config::show_example()?,
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}

fn apply_strategy(config: Config, strategy: Option<StrategyKind>) -> Config {
    match strategy {
        Some(strategy) => config.with_strategy(strategy),
        None => config,
    }
}
