use crate::Feature;
use crate::sampling::RepresentativeSample;
use serde::Serialize;
use serde::ser::SerializeMap;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One persisted representative, flattened into a single table row.
///
/// Serializes as `source`, `destination`, `cluster`, `unit`, then the
/// reduced coordinates `x0..x{m-1}` and, when kept, the raw embedding
/// `e0..e{d-1}`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(from = "Flat")]
pub struct Row {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub cluster: usize,
    pub unit: String,
    pub reduced: Vec<Feature>,
    pub embedding: Option<Vec<Feature>>,
}

impl Row {
    pub fn from_sample(sample: &RepresentativeSample, raw: bool) -> Self {
        Self {
            source: sample.record.source.clone(),
            destination: sample.record.destination.clone(),
            cluster: sample.cluster,
            unit: sample.record.unit.clone(),
            reduced: sample.reduced.clone(),
            embedding: raw.then(|| sample.embedding.clone()),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let width = self.embedding.as_ref().map_or(0, Vec::len);
        let mut map = serializer.serialize_map(Some(4 + self.reduced.len() + width))?;
        map.serialize_entry("source", &self.source)?;
        map.serialize_entry("destination", &self.destination)?;
        map.serialize_entry("cluster", &self.cluster)?;
        map.serialize_entry("unit", &self.unit)?;
        for (i, x) in self.reduced.iter().enumerate() {
            map.serialize_entry(&format!("x{}", i), x)?;
        }
        for (i, e) in self.embedding.iter().flatten().enumerate() {
            map.serialize_entry(&format!("e{}", i), e)?;
        }
        map.end()
    }
}

/// Wire shape of a row before the numbered columns are regrouped.
#[derive(serde::Deserialize)]
struct Flat {
    source: PathBuf,
    destination: PathBuf,
    cluster: usize,
    unit: String,
    #[serde(flatten)]
    columns: BTreeMap<String, Feature>,
}

impl From<Flat> for Row {
    fn from(flat: Flat) -> Self {
        let column = |prefix: char| {
            let mut indexed = flat
                .columns
                .iter()
                .filter_map(|(name, value)| {
                    name.strip_prefix(prefix)
                        .and_then(|i| i.parse::<usize>().ok())
                        .map(|i| (i, *value))
                })
                .collect::<Vec<(usize, Feature)>>();
            indexed.sort_by_key(|(i, _)| *i);
            indexed.into_iter().map(|(_, v)| v).collect::<Vec<Feature>>()
        };
        let reduced = column('x');
        let embedding = Some(column('e')).filter(|e| !e.is_empty());
        Self {
            source: flat.source,
            destination: flat.destination,
            cluster: flat.cluster,
            unit: flat.unit,
            reduced,
            embedding,
        }
    }
}
