use super::*;
use crate::Failure;
use crate::imagery::Record;
use rayon::prelude::*;
use std::path::Path;

/// Maps candidate images to feature vectors through a shared backbone.
///
/// Extraction fans out over a bounded worker pool; output `i` always
/// corresponds to input `i` regardless of pool width.
pub struct VectorExtractor<B> {
    backbone: B,
    pool: rayon::ThreadPool,
}

impl<B: Backbone> VectorExtractor<B> {
    pub fn new(backbone: B, workers: usize) -> Result<Self, Failure> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("embed-{}", i))
            .build()
            .map_err(|e| Failure::Config(format!("embedding pool: {}", e)))?;
        Ok(Self { backbone, pool })
    }

    /// Width of every vector this extractor yields.
    pub fn width(&self) -> usize {
        self.backbone.width()
    }

    /// Embeds one image, rejecting vectors of the wrong width or with
    /// non-finite values.
    pub fn extract(&self, path: &Path) -> Result<FeatureVector, Failure> {
        let vector = self.backbone.embed(path)?;
        if vector.len() != self.width() {
            return Err(Failure::Backbone(format!(
                "{} yielded {} values, expected {}",
                path.display(),
                vector.len(),
                self.width()
            )));
        }
        if let Some(i) = vector.iter().position(|x| !x.is_finite()) {
            return Err(Failure::Backbone(format!(
                "{} yielded {} at index {}",
                path.display(),
                vector[i],
                i
            )));
        }
        Ok(vector)
    }

    /// One result per record, in record order.
    pub fn extract_each(&self, records: &[Record]) -> Vec<Result<FeatureVector, Failure>> {
        self.pool.install(|| {
            records
                .par_iter()
                .map(|record| self.extract(record.source()))
                .collect()
        })
    }

    /// All vectors in record order, or the first failure.
    pub fn extract_batch(&self, records: &[Record]) -> Result<Vec<FeatureVector>, Failure> {
        self.extract_each(records).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Feature;
    use crate::imagery::Side;
    use std::path::PathBuf;

    /// Encodes the numeric file stem into every coordinate.
    struct Stem(usize);

    impl Backbone for Stem {
        fn embed(&self, path: &Path) -> Result<FeatureVector, Failure> {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            match stem.parse::<u32>() {
                Ok(n) => Ok(vec![n as Feature; self.0]),
                Err(_) => Err(Failure::UnreadableImage {
                    path: path.to_path_buf(),
                    reason: "not a number".to_string(),
                }),
            }
        }
        fn width(&self) -> usize {
            self.0
        }
    }

    fn records(stems: &[&str]) -> Vec<Record> {
        stems
            .iter()
            .map(|stem| Record {
                panoid: stem.to_string(),
                side: Side::Front,
                unit: "u".to_string(),
                source: PathBuf::from(format!("{}.png", stem)),
                destination: PathBuf::from(format!("/out/{}.png", stem)),
            })
            .collect()
    }

    #[test]
    fn order_survives_parallelism() {
        let stems = (0..64).map(|i| i.to_string()).collect::<Vec<_>>();
        let stems = stems.iter().map(String::as_str).collect::<Vec<_>>();
        let extractor = VectorExtractor::new(Stem(3), 4).unwrap();
        let vectors = extractor.extract_batch(&records(&stems)).unwrap();
        for (i, v) in vectors.iter().enumerate() {
            assert_eq!(v, &vec![i as Feature; 3]);
        }
    }

    #[test]
    fn each_reports_failures_in_place() {
        let extractor = VectorExtractor::new(Stem(2), 1).unwrap();
        let results = extractor.extract_each(&records(&["1", "x", "3"]));
        assert!(results[0].is_ok());
        assert!(results[1].as_ref().is_err_and(Failure::is_unreadable));
        assert!(results[2].is_ok());
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let extractor = VectorExtractor::new(Stem(2), 1).unwrap();
        assert!(extractor.extract_batch(&records(&["1", "x", "3"])).is_err());
    }

    #[test]
    fn wrong_width_is_rejected() {
        struct Short;
        impl Backbone for Short {
            fn embed(&self, _: &Path) -> Result<FeatureVector, Failure> {
                Ok(vec![0.; 3])
            }
            fn width(&self) -> usize {
                4
            }
        }
        let extractor = VectorExtractor::new(Short, 1).unwrap();
        let result = extractor.extract(Path::new("a.png"));
        assert!(matches!(result, Err(Failure::Backbone(_))));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        struct Broken;
        impl Backbone for Broken {
            fn embed(&self, _: &Path) -> Result<FeatureVector, Failure> {
                Ok(vec![0., Feature::NAN, 1.])
            }
            fn width(&self) -> usize {
                3
            }
        }
        let extractor = VectorExtractor::new(Broken, 1).unwrap();
        let result = extractor.extract(Path::new("a.png"));
        assert!(matches!(result, Err(Failure::Backbone(_))));
        assert!(extractor.extract_batch(&records(&["1", "2"])).is_err());
    }
}
