use super::*;
use crate::embedding::FeatureVector;
use crate::imagery::Record;

/// The image chosen to stand in for one cluster of a spatial unit.
#[derive(Debug, Clone, PartialEq)]
pub struct RepresentativeSample {
    pub record: Record,
    /// Full-width backbone output.
    pub embedding: FeatureVector,
    /// Coordinates after per-unit PCA.
    pub reduced: Point,
    pub cluster: usize,
}

impl RepresentativeSample {
    pub fn unit(&self) -> &str {
        &self.record.unit
    }
}
