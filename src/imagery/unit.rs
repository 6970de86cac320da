use super::*;
use std::collections::BTreeMap;

/// One hexagonal grid cell and its candidate images.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    id: String,
    records: Vec<Record>,
}

impl Unit {
    /// Expands panoramas into directional records, direction-major:
    /// every front image first, then left, back, right, each in panorama order.
    /// Panoramas missing a direction contribute no record for it.
    pub fn build(id: &str, panoramas: &[Panorama], layout: &Layout) -> Self {
        let records = Side::all()
            .into_iter()
            .flat_map(|side| {
                panoramas
                    .iter()
                    .filter_map(move |panorama| Record::build(layout, panorama, side))
            })
            .collect();
        Self {
            id: id.to_string(),
            records,
        }
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn records(&self) -> &[Record] {
        &self.records
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Panoramas grouped by spatial unit, iterating in ascending unit id.
#[derive(Debug, Clone, Default)]
pub struct Units(BTreeMap<String, Vec<Panorama>>);

impl Units {
    /// Number of distinct spatial units.
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Materializes every unit's records under the given layout.
    pub fn expand(&self, layout: &Layout) -> Vec<Unit> {
        self.0
            .iter()
            .map(|(id, panoramas)| Unit::build(id, panoramas, layout))
            .collect()
    }
}

impl From<Vec<Panorama>> for Units {
    fn from(panoramas: Vec<Panorama>) -> Self {
        Self(panoramas.into_iter().fold(
            BTreeMap::<String, Vec<Panorama>>::new(),
            |mut units, panorama| {
                units.entry(panorama.unit.clone()).or_default().push(panorama);
                units
            },
        ))
    }
}
