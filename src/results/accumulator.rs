use super::*;
use crate::Failure;
use crate::sampling::RepresentativeSample;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

/// Sole owner of the run's result table.
///
/// Every append rewrites the whole snapshot through a temporary file and a
/// rename, so a crash leaves either the previous snapshot or the new one,
/// never a torn file.
#[derive(Debug)]
pub struct Accumulator {
    path: PathBuf,
    rows: Vec<Row>,
    units: BTreeSet<String>,
    raw: bool,
    pending: bool,
}

impl Accumulator {
    /// Empty table that will be written to `path`.
    pub fn new(path: &Path, raw: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            rows: Vec::new(),
            units: BTreeSet::new(),
            raw,
            pending: false,
        }
    }

    /// Continues from the snapshot at `path`, or starts empty if there is none.
    pub fn resume(path: &Path, raw: bool) -> Result<Self, Failure> {
        if !path.exists() {
            log::info!("{:<32}{}", "no snapshot to resume", path.display());
            return Ok(Self::new(path, raw));
        }
        let failure = |reason: String| Failure::Snapshot {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| failure(e.to_string()))?;
        let rows = serde_json::from_str::<Vec<Row>>(&text).map_err(|e| failure(e.to_string()))?;
        let units = rows.iter().map(|row| row.unit.clone()).collect::<BTreeSet<String>>();
        log::info!("{:<32}{} rows / {} units", "resumed snapshot", rows.len(), units.len());
        Ok(Self {
            path: path.to_path_buf(),
            rows,
            units,
            raw,
            pending: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    /// Whether a unit already has rows in the table.
    pub fn contains(&self, unit: &str) -> bool {
        self.units.contains(unit)
    }
    /// Rows belonging to one unit, in table order.
    pub fn rows_of<'a>(&'a self, unit: &'a str) -> impl Iterator<Item = &'a Row> + 'a {
        self.rows.iter().filter(move |row| row.unit == unit)
    }
    /// Whether rows in memory have not reached the snapshot yet.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Adds one unit's representatives and checkpoints the whole table.
    ///
    /// The rows stay in memory even when the checkpoint fails; the next
    /// successful write carries them.
    pub fn append(&mut self, unit: &str, samples: &[RepresentativeSample]) -> Result<usize, Failure> {
        debug_assert!(samples.iter().all(|s| s.unit() == unit));
        let raw = self.raw;
        self.rows
            .extend(samples.iter().map(|sample| Row::from_sample(sample, raw)));
        self.units.insert(unit.to_string());
        self.pending = true;
        self.flush()?;
        Ok(samples.len())
    }

    /// Retries the checkpoint if an earlier one failed.
    pub fn flush(&mut self) -> Result<(), Failure> {
        if self.pending {
            self.persist()?;
            self.pending = false;
        }
        Ok(())
    }

    /// Serializes to `<path>.tmp`, then renames over the snapshot.
    fn persist(&self) -> Result<(), Failure> {
        let failure = |reason: String| Failure::Snapshot {
            path: self.path.clone(),
            reason,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| failure(e.to_string()))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let bytes = serde_json::to_vec_pretty(&self.rows).map_err(|e| failure(e.to_string()))?;
        std::fs::write(&tmp, bytes).map_err(|e| failure(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| failure(e.to_string()))?;
        log::debug!("{:<32}{}", "checkpointed rows", self.rows.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::Record;
    use crate::imagery::Side;

    fn sample(unit: &str, panoid: &str, cluster: usize) -> RepresentativeSample {
        RepresentativeSample {
            record: Record {
                panoid: panoid.to_string(),
                side: Side::Back,
                unit: unit.to_string(),
                source: PathBuf::from(format!("/db/{}.jpg", panoid)),
                destination: PathBuf::from(format!("/out/{}/PANO_{}_r.png", unit, panoid)),
            },
            embedding: vec![0.25; 4],
            reduced: vec![cluster as f32, 1.5],
            cluster,
        }
    }

    #[test]
    fn every_append_is_checkpointed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run").join("spatial_units.json");
        let mut results = Accumulator::new(&path, false);
        results.append("u1", &[sample("u1", "a", 0), sample("u1", "b", 1)]).unwrap();
        let first = serde_json::from_str::<Vec<Row>>(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(first.len(), 2);
        results.append("u2", &[sample("u2", "c", 0)]).unwrap();
        let second = serde_json::from_str::<Vec<Row>>(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(second.len(), 3);
        assert_eq!(second[2].unit, "u2");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn resume_restores_rows_and_units() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spatial_units.json");
        let mut results = Accumulator::new(&path, true);
        results.append("u1", &[sample("u1", "a", 0)]).unwrap();
        let resumed = Accumulator::resume(&path, true).unwrap();
        assert_eq!(resumed.rows(), results.rows());
        assert!(resumed.contains("u1"));
        assert!(!resumed.contains("u2"));
        assert_eq!(resumed.rows()[0].embedding, Some(vec![0.25; 4]));
    }

    #[test]
    fn failed_checkpoint_keeps_rows_for_the_next_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spatial_units.json");
        std::fs::create_dir_all(&path).unwrap();
        let mut results = Accumulator::new(&path, false);
        let result = results.append("u1", &[sample("u1", "a", 0), sample("u1", "b", 1)]);
        assert!(matches!(result, Err(Failure::Snapshot { .. })));
        assert_eq!(results.len(), 2);
        assert!(results.contains("u1"));
        assert!(results.is_pending());
        std::fs::remove_dir(&path).unwrap();
        results.flush().unwrap();
        assert!(!results.is_pending());
        let rows = serde_json::from_str::<Vec<Row>>(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(results.rows_of("u1").count(), 2);
        assert_eq!(results.rows_of("u2").count(), 0);
    }

    #[test]
    fn resume_without_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let resumed = Accumulator::resume(&dir.path().join("missing.json"), false).unwrap();
        assert!(resumed.is_empty());
    }

    #[test]
    fn corrupt_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spatial_units.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Accumulator::resume(&path, false),
            Err(Failure::Snapshot { .. })
        ));
    }
}
