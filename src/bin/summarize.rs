//! Summarize Binary
//!
//! Samples representative street-level images for every spatial unit of
//! one municipality at one grid resolution.
//!
//! Panoramas come from PostgreSQL (`DB_URL`) or, with `--catalog`, from a
//! JSON export. Type Q + Enter to stop after the current unit.

use anyhow::Context;
use clap::Parser;
use hexsample::database::Source;
use hexsample::imagery::Catalog;
use hexsample::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log()?;
    kys();
    brb();
    let config = Config::parse();
    config.validate().context("validate configuration")?;
    log::info!("{:<32}{:<32}", "municipality", config.municipality);
    log::info!("{:<32}{:<32}", "resolution", config.resolution);
    let source: Box<dyn Source> = match config.catalog {
        Some(ref path) => Box::new(Catalog::new(path)),
        None => Box::new(database::db().await.context("connect to database")?),
    };
    let panoramas = source
        .panoramas(&config.municipality, &config.resolution)
        .await
        .context("fetch panoramas")?;
    log::info!("{:<32}{:<32}", "panoramas", panoramas.len());
    let summary = tokio::task::spawn_blocking(move || pipeline::summarize(&config, panoramas))
        .await
        .context("pipeline task")?
        .context("run pipeline")?;
    if summary.interrupted {
        log::warn!("rerun with --resume to continue");
    }
    Ok(())
}
