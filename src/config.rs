use crate::Failure;
use crate::Kilobytes;
use crate::embedding::Device;
use crate::embedding::Family;
use std::path::PathBuf;
use std::time::Duration;

/// How a unit reacts to images the backbone cannot decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Policy {
    /// Any undecodable image abandons the whole unit.
    #[default]
    Strict,
    /// Undecodable images are dropped and the survivors re-checked
    /// against the usable minimum.
    Lenient,
}

/// Immutable run parameters for one municipality/resolution pair.
///
/// Built once at startup and passed by reference into the pipeline.
#[derive(Debug, Clone, clap::Parser)]
#[command(author, version, about = "Sample diverse street-level images per spatial unit", long_about = None)]
pub struct Config {
    /// Municipality name as stored in the spatial-unit source.
    #[arg(long)]
    pub municipality: String,
    /// Grid resolution column, e.g. h3_10.
    #[arg(long, default_value = "h3_10")]
    pub resolution: String,
    /// Root folder holding `<municipality>_NL/imagedb`.
    #[arg(long, default_value = "../stv_database")]
    pub images: PathBuf,
    /// Root folder for sampled images and the result snapshot.
    #[arg(long, default_value = "municipalities")]
    pub output: PathBuf,
    /// JSON panorama catalog to read instead of the database.
    #[arg(long)]
    pub catalog: Option<PathBuf>,
    /// Backbone family; fixes the embedding width.
    #[arg(long, value_enum, default_value_t = Family::Resnet152)]
    pub family: Family,
    /// Compute device for the backbone.
    #[arg(long, value_enum, default_value_t = Device::Cpu)]
    pub device: Device,
    /// ONNX weights; defaults to `models/<family>.onnx`.
    #[arg(long)]
    pub model: Option<PathBuf>,
    /// Use the model-free thumbnail backbone (dry runs).
    #[arg(long)]
    pub synthetic: bool,
    /// Clusters, and so representatives, per unit.
    #[arg(long, default_value_t = crate::CLUSTERS)]
    pub k: usize,
    /// Seed for clustering and representative selection.
    #[arg(long, default_value_t = crate::SEED)]
    pub seed: u64,
    /// Principal components kept per unit.
    #[arg(long, default_value_t = crate::DIMENSIONS)]
    pub dimensions: usize,
    /// Independent k-means++ restarts per unit.
    #[arg(long, default_value_t = crate::KMEANS_RESTARTS)]
    pub restarts: usize,
    /// Lloyd iterations per restart.
    #[arg(long, default_value_t = crate::KMEANS_ITERATIONS)]
    pub iterations: usize,
    /// Largest centroid drift considered converged.
    #[arg(long, default_value_t = crate::KMEANS_TOLERANCE)]
    pub tolerance: f32,
    /// Usable images a unit needs before it is clustered.
    #[arg(long, default_value_t = crate::MINIMUM_USABLE)]
    pub minimum: usize,
    /// Strict lower bound on image size.
    #[arg(long, default_value_t = crate::THRESHOLD_KB)]
    pub threshold_kb: Kilobytes,
    /// Size probe attempts per image.
    #[arg(long, default_value_t = crate::PROBE_ATTEMPTS)]
    pub attempts: usize,
    /// Fixed delay between probe attempts, in milliseconds.
    #[arg(long, default_value_t = crate::PROBE_BACKOFF.as_millis() as u64)]
    pub backoff_ms: u64,
    /// Embedding worker threads.
    #[arg(long, default_value_t = 1)]
    pub workers: usize,
    /// Reaction to undecodable images.
    #[arg(long, value_enum, default_value_t = Policy::Strict)]
    pub policy: Policy,
    /// Continue from an existing snapshot, skipping finished units.
    #[arg(long)]
    pub resume: bool,
    /// Also persist the full-width embeddings.
    #[arg(long)]
    pub raw: bool,
}

impl Config {
    /// Rejects parameters that would make the run meaningless, before any I/O.
    pub fn validate(&self) -> Result<(), Failure> {
        let bad = |reason: &str| -> Result<(), Failure> { Err(Failure::Config(reason.to_string())) };
        if self.municipality.trim().is_empty() {
            return bad("municipality must not be empty");
        }
        if self.municipality.contains(['/', '\\']) {
            return bad("municipality must not contain path separators");
        }
        if !Self::is_resolution(&self.resolution) {
            return bad("resolution must look like h3_<digits>");
        }
        if self.k == 0 {
            return bad("k must be positive");
        }
        if self.dimensions == 0 {
            return bad("dimensions must be positive");
        }
        if self.restarts == 0 {
            return bad("restarts must be positive");
        }
        if self.iterations == 0 {
            return bad("iterations must be positive");
        }
        if self.attempts == 0 {
            return bad("attempts must be positive");
        }
        if self.minimum == 0 {
            return bad("minimum must be positive");
        }
        if self.workers == 0 {
            return bad("workers must be positive");
        }
        if !(self.tolerance >= 0.) {
            return bad("tolerance must be non-negative");
        }
        if self.workers > num_cpus::get() {
            log::warn!(
                "{} embedding workers requested on {} cpus",
                self.workers,
                num_cpus::get()
            );
        }
        Ok(())
    }

    /// The resolution names a column in the unit query, so it is held to
    /// `h3_` followed by one or two digits.
    pub fn is_resolution(resolution: &str) -> bool {
        resolution
            .strip_prefix("h3_")
            .filter(|digits| (1..=2).contains(&digits.len()))
            .is_some_and(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Folder holding this municipality's source images.
    pub fn imagedb(&self) -> PathBuf {
        self.images
            .join(format!("{}_NL", self.municipality))
            .join("imagedb")
    }
    /// Folder for everything this run writes.
    pub fn folder(&self) -> PathBuf {
        self.output
            .join(format!("{}_{}", self.municipality, self.resolution))
    }
    /// Root under which every unit gets its own image folder.
    pub fn destinations(&self) -> PathBuf {
        self.folder().join("spatial_units")
    }
    /// The checkpointed result table.
    pub fn snapshot(&self) -> PathBuf {
        self.folder().join("spatial_units.json")
    }
    /// ONNX weights for the configured family.
    pub fn weights(&self) -> PathBuf {
        self.model
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("models/{}.onnx", self.family)))
    }
    /// Delay between probe attempts.
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}
