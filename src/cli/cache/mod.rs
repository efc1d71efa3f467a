//! Cache maintenance commands - stats and clear

use clap::Args;
use tracing::info;

use crate::api::types::CacheStatsResponse;

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Confirm deletion of every cached answer
    #[arg(long)]
    pub yes: bool,
}

/// Print collection statistics as JSON
pub async fn stats() -> anyhow::Result<()> {
    let config = super::init_oneshot()?;
    let engine = crate::build_cache_engine(&config).await?;

    let output = CacheStatsResponse {
        collection: engine.store().spec().name.clone(),
        stats: engine.stats().await,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// Delete and re-provision the collection
pub async fn clear(args: ClearArgs) -> anyhow::Result<()> {
    if !args.yes {
        anyhow::bail!("refusing to clear the answer cache without --yes");
    }

    let config = super::init_oneshot()?;
    let engine = crate::build_cache_engine(&config).await?;

    engine.clear().await?;
    info!(collection = %engine.store().spec().name, "Answer cache cleared");
    println!("Cleared collection '{}'", engine.store().spec().name);

    Ok(())
}
