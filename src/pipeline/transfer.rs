use crate::Failure;
use std::path::Path;

/// Copies one representative into place, creating its unit folder first.
/// Returns the number of bytes copied.
pub fn transfer(from: &Path, into: &Path) -> Result<u64, Failure> {
    let failure = |source: std::io::Error| Failure::Copy {
        from: from.to_path_buf(),
        into: into.to_path_buf(),
        source,
    };
    if let Some(parent) = into.parent() {
        std::fs::create_dir_all(parent).map_err(failure)?;
    }
    std::fs::copy(from, into).map_err(failure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_folders() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.png");
        let into = dir.path().join("out").join("8a1").join("PANO_a_f.png");
        std::fs::write(&from, b"pixels").unwrap();
        assert_eq!(transfer(&from, &into).unwrap(), 6);
        assert_eq!(std::fs::read(&into).unwrap(), b"pixels");
    }

    #[test]
    fn missing_source_is_a_copy_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = transfer(&dir.path().join("gone.png"), &dir.path().join("x.png"));
        assert!(matches!(result, Err(Failure::Copy { .. })));
    }
}
