//! Argument parsing and dispatch for `imagerankctl`.

pub mod commands;

use std::{io::Write, num::NonZeroUsize, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imagerank_config::{Config, ConfigLoad, ConfigLoader, ConfigLoaderOptions};
use imagerank_core::RedisRankingStore;
use imagerank_model::ImageID;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "imagerankctl",
    about = "Record image views and inspect the most-viewed ranking",
    version
)]
pub struct Cli {
    /// Path to imagerank.toml (defaults to ./imagerank.toml or $IMAGERANK_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// .env file to load before reading the environment
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record one detail view and print the new total
    View {
        /// Image identifier
        #[arg(value_parser = ImageID::parse)]
        image: ImageID,
    },
    /// Print the view counter without incrementing it
    Count {
        /// Image identifier
        #[arg(value_parser = ImageID::parse)]
        image: ImageID,
    },
    /// Print the most viewed images, best first
    Top {
        /// How many images to list (defaults to ranking.top_n)
        #[arg(short = 'n', long)]
        limit: Option<NonZeroUsize>,
        /// Emit a JSON array instead of one id per line
        #[arg(long)]
        json: bool,
    },
    /// Print how many images are present in the ranking
    Stats,
    /// Configuration helpers
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Load and validate configuration, then print the effective values
    Check {
        /// Also open a connection to the store and read the ranking size
        #[arg(long)]
        connect: bool,
    },
}

pub fn load_config(cli: &Cli) -> Result<ConfigLoad> {
    let loader = ConfigLoader::with_options(ConfigLoaderOptions {
        config_path: cli.config.clone(),
        env_file: cli.env_file.clone(),
    });
    loader.load().context("failed to load imagerank configuration")
}

fn open_store(config: &Config) -> Result<RedisRankingStore> {
    RedisRankingStore::open(&config.redis.connection_url(), config.store_options())
        .with_context(|| {
            format!(
                "failed to set up ranking store at {}",
                config.redis.display_address()
            )
        })
}

pub async fn run(cli: Cli) -> Result<()> {
    let load = load_config(&cli)?;
    let mut out = std::io::stdout();

    if let Command::Config(ConfigCommand::Check { connect }) = &cli.command {
        commands::print_config(&load, &mut out)?;
        if *connect {
            let store = open_store(&load.config)?;
            commands::show_stats(&store, &mut out)
                .await
                .with_context(|| ranking_context(&load.config))?;
        }
        return Ok(());
    }

    for warning in load.warnings.iter() {
        match &warning.hint {
            Some(hint) => warn!(hint = %hint, "{}", warning.message),
            None => warn!("{}", warning.message),
        }
    }

    let config = &load.config;
    let store = open_store(config)?;

    let outcome = match cli.command {
        Command::View { image } => commands::record_view(&store, &image, &mut out)
            .await
            .map(|_| ()),
        Command::Count { image } => commands::show_count(&store, &image, &mut out)
            .await
            .map(|_| ()),
        Command::Top { limit, json } => {
            let limit = limit.unwrap_or(config.ranking.top_n);
            commands::show_top(&store, limit, json, &mut out)
                .await
                .map(|_| ())
        }
        Command::Stats => commands::show_stats(&store, &mut out).await.map(|_| ()),
        Command::Config(_) => Ok(()),
    };

    outcome.with_context(|| ranking_context(config))?;
    out.flush()?;
    Ok(())
}

fn ranking_context(config: &Config) -> String {
    format!("ranking store at {}", config.redis.display_address())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_or_padded_ids_are_rejected() {
        for command in ["view", "count"] {
            for raw in ["", "   ", " 42"] {
                let parsed = Cli::try_parse_from(["imagerankctl", command, raw]);
                assert!(parsed.is_err(), "{command} accepted {raw:?}");
            }
        }
    }

    #[test]
    fn plain_ids_parse() {
        let cli = Cli::try_parse_from(["imagerankctl", "view", "42"]).unwrap();
        match cli.command {
            Command::View { image } => assert_eq!(image, ImageID::from(42_i64)),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
