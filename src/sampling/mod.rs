//! Per-unit reduction, clustering, and representative selection.
//!
//! - [`Pca`]: per-unit principal component projection
//! - [`Elkan`]: bound-accelerated Lloyd iterations
//! - [`Clustering`]: seeded k-means++ with parallel restarts
//! - [`UnitSampler`]: filter, embed, reduce, cluster, select
mod absorb;
mod bounds;
mod elkan;
mod kmeans;
mod outcome;
mod pca;
mod sample;
mod sampler;

pub use absorb::*;
pub use bounds::*;
pub use elkan::*;
pub use kmeans::*;
pub use outcome::*;
pub use pca::*;
pub use sample::*;
pub use sampler::*;

/// A row of reduced coordinates, or a centroid in that space.
pub type Point = Vec<crate::Feature>;
