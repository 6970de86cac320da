//! Representative sampling of street-level imagery per spatial unit.
//!
//! Each hexagonal grid cell of a municipality holds hundreds of directional
//! street-level images. This crate picks a small, visually diverse subset of
//! them per cell so downstream visual analysis never has to touch every
//! captured image.
//!
//! ## Pipeline
//!
//! 1. **Filter**: drop images at or below the size threshold, probing the
//!    filesystem with a fixed retry budget
//! 2. **Embed**: map every surviving image to a feature vector
//! 3. **Reduce**: project the unit's vectors onto its leading principal components
//! 4. **Cluster**: seeded k-means++ with many restarts
//! 5. **Select**: one uniformly chosen member per cluster
//! 6. **Persist**: checkpoint the growing result table after every unit
//!
//! ## Modules
//!
//! - [`imagery`]: panoramas, directional image records, spatial units
//! - [`filter`]: retrying size probes
//! - [`embedding`]: backbone trait and the ordered extractor
//! - [`sampling`]: PCA, Elkan k-means, representative selection
//! - [`results`]: result rows and the checkpointing accumulator
//! - [`pipeline`]: the per-run driver and file transfer
#![allow(dead_code)]

pub mod config;
pub mod embedding;
pub mod error;
pub mod filter;
pub mod imagery;
pub mod pipeline;
pub mod results;
pub mod sampling;

#[cfg(feature = "database")]
pub mod database;

pub use config::*;
pub use error::*;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Raw embedding and reduced-coordinate values.
pub type Feature = f32;
/// Euclidean distances and inertia during clustering.
pub type Energy = f32;
/// File sizes as reported by the size probe.
pub type Kilobytes = f64;

// ============================================================================
// FILTERING
// ============================================================================
/// Images at or below this size are low-information or corrupt.
pub const THRESHOLD_KB: Kilobytes = 60.0;
/// Probe attempts per image before it is dropped.
pub const PROBE_ATTEMPTS: usize = 5;
/// Fixed delay between probe attempts.
pub const PROBE_BACKOFF: std::time::Duration = std::time::Duration::from_secs(1);
/// Spatial units with fewer usable images than this are skipped.
pub const MINIMUM_USABLE: usize = 5;

// ============================================================================
// K-MEANS CLUSTERING
// One partition per spatial unit, fit on its PCA-reduced embeddings.
// ============================================================================
/// Clusters sought per unit, and so the most representatives a unit yields.
pub const CLUSTERS: usize = 5;
/// Independent k-means++ restarts; the lowest-inertia fit wins.
pub const KMEANS_RESTARTS: usize = 1000;
/// Lloyd iterations per restart before giving up on convergence.
pub const KMEANS_ITERATIONS: usize = 300;
/// Convergence threshold on the largest centroid drift.
pub const KMEANS_TOLERANCE: Energy = 1e-4;
/// Run seed shared by clustering and representative selection.
pub const SEED: u64 = 2102;

// ============================================================================
// DIMENSIONALITY REDUCTION
// ============================================================================
/// Principal components kept per unit.
pub const DIMENSIONS: usize = 5;
/// Jacobi sweep budget for the per-unit eigen-decomposition.
pub const PCA_SWEEPS: usize = 64;
/// Off-diagonal mass, relative to the whole matrix, considered diagonal.
pub const PCA_TOLERANCE: f64 = 1e-12;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() -> anyhow::Result<()> {
    use anyhow::Context;
    std::fs::create_dir_all("logs").context("create logs directory")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .context("time moves slow")?
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).context("create log file")?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).context("initialize logger")
}

/// Register Ctrl+C handler for immediate (non-graceful) termination.
/// The last completed unit is already checkpointed, so nothing is lost but
/// the unit in flight.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("violent interrupt received, exiting immediately");
            std::process::exit(0);
        }
    });
}

/// Global interrupt flag for graceful shutdown coordination.
static INTERRUPTED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// Check if graceful shutdown was requested via stdin "Q".
pub fn interrupted() -> bool {
    INTERRUPTED.load(std::sync::atomic::Ordering::Relaxed)
}

/// Register graceful interrupt handler. Type "Q" + Enter to stop after the
/// current spatial unit has been checkpointed.
#[cfg(feature = "server")]
pub fn brb() {
    std::thread::spawn(|| {
        loop {
            let ref mut buffer = String::new();
            match std::io::stdin().read_line(buffer) {
                Ok(0) | Err(_) => break,
                Ok(_) if buffer.trim().to_uppercase() == "Q" => {
                    log::warn!("graceful interrupt requested, finishing current unit...");
                    INTERRUPTED.store(true, std::sync::atomic::Ordering::Relaxed);
                    break;
                }
                Ok(_) => continue,
            }
        }
    });
}
