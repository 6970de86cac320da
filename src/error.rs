use std::path::PathBuf;

/// Everything that can go wrong below the run boundary.
///
/// Skips that are part of normal control flow (a unit with too few usable
/// images, a k clamped to the candidate count) are not failures; they are
/// reported through [`crate::sampling::Outcome`] instead.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// Size probe kept failing after the whole retry budget.
    #[error("could not probe {path} after {attempts} attempts: {source}")]
    TransientFile {
        path: PathBuf,
        attempts: usize,
        source: std::io::Error,
    },
    /// The backbone could not decode the image.
    #[error("unreadable image {path}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },
    /// Model loading or inference failed for reasons unrelated to the image.
    #[error("embedding backbone: {0}")]
    Backbone(String),
    /// Copying a representative to its destination failed.
    #[error("copy {from} -> {into}: {source}")]
    Copy {
        from: PathBuf,
        into: PathBuf,
        source: std::io::Error,
    },
    /// Persisting or resuming the result snapshot failed.
    #[error("snapshot {path}: {reason}")]
    Snapshot { path: PathBuf, reason: String },
    /// Run parameters are unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A panorama catalog file could not be read.
    #[error("catalog {path}: {reason}")]
    Catalog { path: PathBuf, reason: String },
    /// The spatial-unit source could not be queried.
    #[error("database: {0}")]
    Database(String),
}

impl Failure {
    /// Whether the failure comes from a single undecodable image.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, Self::UnreadableImage { .. })
    }
}

#[cfg(feature = "database")]
impl From<tokio_postgres::Error> for Failure {
    fn from(e: tokio_postgres::Error) -> Self {
        Self::Database(e.to_string())
    }
}
