//! Panoramas, directional image records, and spatial units.
//!
//! - [`Panorama`]: one source row with its panoid, unit and image references
//! - [`Side`]: the four viewing directions and their file-name tags
//! - [`Record`]: one directional image with its source and destination paths
//! - [`Unit`]: a grid cell's candidate records
//! - [`Catalog`]: panoramas read from a JSON export
//! - [`Units`]: panoramas grouped by unit in ascending id order
mod catalog;
mod panorama;
mod record;
mod side;
mod unit;

pub use catalog::*;
pub use panorama::*;
pub use record::*;
pub use side::*;
pub use unit::*;
