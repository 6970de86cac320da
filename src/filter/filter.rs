use super::*;
use crate::Failure;
use crate::Kilobytes;
use crate::imagery::Record;
use std::path::Path;
use std::time::Duration;

/// Screens candidate images by file size before any embedding work.
///
/// Sizes are probed with a fixed retry budget and a fixed (non-exponential)
/// delay between attempts. An image whose probe never succeeds, or whose
/// size is at or below the threshold, is dropped without failing the unit.
pub struct SizeFilter<P = Disk> {
    probe: P,
    threshold: Kilobytes,
    attempts: usize,
    backoff: Duration,
}

impl SizeFilter<Disk> {
    pub fn new(config: &crate::Config) -> Self {
        Self::with_probe(Disk, config)
    }
}

impl<P: Probe> SizeFilter<P> {
    pub fn with_probe(probe: P, config: &crate::Config) -> Self {
        Self {
            probe,
            threshold: config.threshold_kb,
            attempts: config.attempts,
            backoff: config.backoff(),
        }
    }

    /// Size in kilobytes, retrying transient I/O failures.
    pub fn probe(&self, path: &Path) -> Result<Kilobytes, Failure> {
        let mut attempt = 0;
        loop {
            match self.probe.bytes(path) {
                Ok(bytes) => return Ok(bytes as Kilobytes / 1024.),
                Err(e) => {
                    attempt += 1;
                    log::debug!("attempt {} failed for {}: {}", attempt, path.display(), e);
                    if attempt >= self.attempts {
                        return Err(Failure::TransientFile {
                            path: path.to_path_buf(),
                            attempts: attempt,
                            source: e,
                        });
                    }
                    std::thread::sleep(self.backoff);
                }
            }
        }
    }

    /// Strictly larger than the threshold counts as informative.
    pub fn accepts(&self, kb: Kilobytes) -> bool {
        kb > self.threshold
    }

    /// Keeps the records whose images probe successfully above the threshold,
    /// preserving their order.
    pub fn screen(&self, records: &[Record]) -> Vec<Record> {
        records
            .iter()
            .filter(|record| match self.probe(record.source()) {
                Ok(kb) if self.accepts(kb) => true,
                Ok(kb) => {
                    log::debug!("{:<32}{:.1}kb", "too small", kb);
                    false
                }
                Err(e) => {
                    log::warn!("{}", e);
                    false
                }
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::Side;
    use clap::Parser;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Fails a fixed number of times per path before reporting its size.
    struct Flaky {
        sizes: HashMap<PathBuf, u64>,
        failures: usize,
        calls: Mutex<HashMap<PathBuf, usize>>,
    }

    impl Flaky {
        fn new(sizes: &[(&str, u64)], failures: usize) -> Self {
            Self {
                sizes: sizes
                    .iter()
                    .map(|(p, s)| (PathBuf::from(p), *s))
                    .collect(),
                failures,
                calls: Mutex::new(HashMap::new()),
            }
        }
        fn calls(&self, path: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .get(Path::new(path))
                .copied()
                .unwrap_or(0)
        }
    }

    impl Probe for Flaky {
        fn bytes(&self, path: &Path) -> std::io::Result<u64> {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.entry(path.to_path_buf()).or_default();
            *n += 1;
            if *n <= self.failures {
                return Err(std::io::Error::new(std::io::ErrorKind::Interrupted, "flaky"));
            }
            self.sizes
                .get(path)
                .copied()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
        }
    }

    fn config() -> crate::Config {
        crate::Config::parse_from(["summarize", "--municipality", "Test", "--backoff-ms", "0"])
    }

    fn record(path: &str) -> Record {
        Record {
            panoid: path.to_string(),
            side: Side::Front,
            unit: "u".to_string(),
            source: PathBuf::from(path),
            destination: PathBuf::from(format!("/out/{}.png", path)),
        }
    }

    #[test]
    fn boundary_is_excluded() {
        let probe = Flaky::new(&[("at", 60 * 1024), ("above", 60 * 1024 + 1), ("below", 1024)], 0);
        let filter = SizeFilter::with_probe(&probe, &config());
        let kept = filter.screen(&[record("at"), record("above"), record("below")]);
        assert_eq!(kept, vec![record("above")]);
    }

    #[test]
    fn transient_failures_are_retried() {
        let probe = Flaky::new(&[("img", 100 * 1024)], 4);
        let filter = SizeFilter::with_probe(&probe, &config());
        assert_eq!(filter.probe(Path::new("img")).unwrap(), 100.);
        assert_eq!(probe.calls("img"), 5);
    }

    #[test]
    fn retries_wait_the_fixed_backoff() {
        let probe = Flaky::new(&[("img", 100 * 1024)], 5);
        let config = crate::Config::parse_from(["summarize", "--municipality", "Test", "--backoff-ms", "20"]);
        let filter = SizeFilter::with_probe(&probe, &config);
        let start = std::time::Instant::now();
        assert!(filter.probe(Path::new("img")).is_err());
        assert!(start.elapsed() >= Duration::from_millis(4 * 20));
        assert_eq!(probe.calls("img"), 5);
    }

    #[test]
    fn exhausted_probe_drops_candidate() {
        let probe = Flaky::new(&[("img", 100 * 1024), ("ok", 100 * 1024)], 5);
        let filter = SizeFilter::with_probe(&probe, &config());
        let result = filter.probe(Path::new("img"));
        assert!(matches!(
            result,
            Err(Failure::TransientFile { attempts: 5, .. })
        ));
        assert_eq!(probe.calls("img"), 5);
        let fresh = Flaky::new(&[("img", 100 * 1024), ("ok", 100 * 1024)], 5);
        let filter = SizeFilter::with_probe(&fresh, &config());
        assert!(filter.screen(&[record("img")]).is_empty());
    }

    #[test]
    fn missing_files_never_raise() {
        let filter = SizeFilter::new(&config());
        let kept = filter.screen(&[record("/definitely/not/here.jpg")]);
        assert!(kept.is_empty());
    }

    #[test]
    fn order_is_preserved() {
        let probe = Flaky::new(&[("a", 90 * 1024), ("b", 10), ("c", 70 * 1024), ("d", 61 * 1024)], 0);
        let filter = SizeFilter::with_probe(&probe, &config());
        let kept = filter.screen(&[record("d"), record("b"), record("a"), record("c")]);
        assert_eq!(kept, vec![record("d"), record("a"), record("c")]);
    }
}
