use super::*;

/// One captured panorama as returned by the spatial-unit source.
///
/// Only `panoid`, `unit` and the four image references drive sampling;
/// the remaining columns ride along for provenance.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Panorama {
    pub panoid: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<i32>,
    #[serde(default)]
    pub front: Option<String>,
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub back: Option<String>,
    #[serde(default)]
    pub right: Option<String>,
    #[serde(default)]
    pub density: Option<f64>,
    pub unit: String,
    /// WKT point geometry.
    #[serde(default)]
    pub geometry: Option<String>,
}

impl Panorama {
    /// Image reference for one direction, if the panorama has it.
    pub fn image(&self, side: Side) -> Option<&str> {
        match side {
            Side::Front => self.front.as_deref(),
            Side::Left => self.left.as_deref(),
            Side::Back => self.back.as_deref(),
            Side::Right => self.right.as_deref(),
        }
    }
}
