//! Command bodies, written against [`RankingStore`] so they run the same on
//! the Redis and in-memory backends.

use std::{io::Write, num::NonZeroUsize};

use anyhow::Result;
use imagerank_config::ConfigLoad;
use imagerank_core::RankingStore;
use imagerank_model::{ImageID, ViewCount};

pub async fn record_view(
    store: &dyn RankingStore,
    image: &ImageID,
    out: &mut dyn Write,
) -> Result<ViewCount> {
    let views = store.record_view(image).await?;
    writeln!(out, "{views}")?;
    Ok(views)
}

pub async fn show_count(
    store: &dyn RankingStore,
    image: &ImageID,
    out: &mut dyn Write,
) -> Result<ViewCount> {
    let views = store.view_count(image).await?;
    writeln!(out, "{views}")?;
    Ok(views)
}

pub async fn show_top(
    store: &dyn RankingStore,
    limit: NonZeroUsize,
    json: bool,
    out: &mut dyn Write,
) -> Result<Vec<ImageID>> {
    let ranked = store.top_ranked(limit).await?;

    if json {
        writeln!(out, "{}", serde_json::to_string(&ranked)?)?;
    } else {
        for id in &ranked {
            writeln!(out, "{id}")?;
        }
    }

    Ok(ranked)
}

pub async fn show_stats(store: &dyn RankingStore, out: &mut dyn Write) -> Result<u64> {
    let ranked = store.ranked_count().await?;
    writeln!(out, "ranked images: {ranked}")?;
    Ok(ranked)
}

pub fn print_config(load: &ConfigLoad, out: &mut dyn Write) -> Result<()> {
    let config = &load.config;

    match &config.metadata.config_path {
        Some(path) => writeln!(out, "config file:     {}", path.display())?,
        None => writeln!(out, "config file:     (none)")?,
    }
    writeln!(out, "redis:           {}", config.redis.display_address())?;
    writeln!(
        out,
        "connect timeout: {}",
        humantime::format_duration(config.redis.connect_timeout)
    )?;
    writeln!(
        out,
        "command timeout: {}",
        humantime::format_duration(config.redis.command_timeout)
    )?;
    writeln!(out, "namespace:       {}", config.ranking.namespace)?;
    writeln!(out, "ranking key:     {}", config.ranking.ranking_key)?;
    writeln!(out, "write mode:      {}", config.ranking.write_mode)?;
    writeln!(out, "top n:           {}", config.ranking.top_n)?;

    for warning in load.warnings.iter() {
        match &warning.hint {
            Some(hint) => writeln!(out, "warning: {} ({hint})", warning.message)?,
            None => writeln!(out, "warning: {}", warning.message)?,
        }
    }

    Ok(())
}
