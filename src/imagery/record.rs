use super::*;
use std::path::Path;
use std::path::PathBuf;

/// Where source images live and where sampled ones go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Folder the panoramas' image references are relative to.
    pub imagedb: PathBuf,
    /// Folder holding one sub-folder per spatial unit.
    pub destinations: PathBuf,
}

impl From<&crate::Config> for Layout {
    fn from(config: &crate::Config) -> Self {
        Self {
            imagedb: config.imagedb(),
            destinations: config.destinations(),
        }
    }
}

impl Layout {
    /// Folder for one unit's sampled images.
    pub fn folder(&self, unit: &str) -> PathBuf {
        self.destinations.join(unit)
    }
    /// `<destinations>/<unit>/PANO_<panoid>_<tag>.png`
    pub fn destination(&self, unit: &str, panoid: &str, side: Side) -> PathBuf {
        self.folder(unit)
            .join(format!("PANO_{}_{}.png", panoid, side))
    }
}

/// One directional image candidate of a spatial unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub panoid: String,
    pub side: Side,
    pub unit: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl Record {
    /// Builds the record for one direction of a panorama, if it has an image.
    pub fn build(layout: &Layout, panorama: &Panorama, side: Side) -> Option<Self> {
        panorama.image(side).map(|image| Self {
            panoid: panorama.panoid.clone(),
            side,
            unit: panorama.unit.clone(),
            source: layout.imagedb.join(image),
            destination: layout.destination(&panorama.unit, &panorama.panoid, side),
        })
    }
    pub fn source(&self) -> &Path {
        &self.source
    }
    pub fn destination(&self) -> &Path {
        &self.destination
    }
}
