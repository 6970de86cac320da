use super::*;
use crate::Failure;
use std::path::Path;
use std::path::PathBuf;

/// Panoramas exported to a JSON file, standing in for the database.
///
/// The file holds an array of [`Panorama`] objects for a single
/// municipality and resolution; `unit` carries the grid cell id. Missing
/// optional columns read as absent.
#[derive(Debug, Clone)]
pub struct Catalog {
    path: PathBuf,
}

impl Catalog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    /// Reads every panorama, sorted by unit then panoid.
    pub fn load(&self) -> Result<Vec<Panorama>, Failure> {
        let failure = |reason: String| Failure::Catalog {
            path: self.path.clone(),
            reason,
        };
        let text = std::fs::read_to_string(&self.path).map_err(|e| failure(e.to_string()))?;
        let mut panoramas =
            serde_json::from_str::<Vec<Panorama>>(&text).map_err(|e| failure(e.to_string()))?;
        panoramas.sort_by(|a, b| a.unit.cmp(&b.unit).then_with(|| a.panoid.cmp(&b.panoid)));
        Ok(panoramas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_sparse_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[
                {"panoid": "b", "unit": "8a2", "front": "b_f.jpg"},
                {"panoid": "a", "unit": "8a2", "front": "a_f.jpg", "right": "a_b.jpg", "year": 2017},
                {"panoid": "z", "unit": "8a1", "back": "z_r.jpg", "geometry": "POINT(4.4 51.9)"}
            ]"#,
        )
        .unwrap();
        let panoramas = Catalog::new(&path).load().unwrap();
        let order = panoramas.iter().map(|p| p.panoid.as_str()).collect::<Vec<_>>();
        assert_eq!(order, vec!["z", "a", "b"]);
        assert_eq!(panoramas[1].year, Some(2017));
        assert_eq!(panoramas[1].image(Side::Right), Some("a_b.jpg"));
        assert_eq!(panoramas[1].image(Side::Back), None);
    }

    #[test]
    fn malformed_catalog_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"[{"unit": "8a1"}]"#).unwrap();
        assert!(matches!(
            Catalog::new(&path).load(),
            Err(Failure::Catalog { .. })
        ));
        assert!(matches!(
            Catalog::new(&dir.path().join("missing.json")).load(),
            Err(Failure::Catalog { .. })
        ));
    }
}
