use super::*;
use crate::Config;
use crate::Failure;
use crate::Policy;
use crate::embedding::Backbone;
use crate::embedding::FeatureVector;
use crate::embedding::VectorExtractor;
use crate::filter::Disk;
use crate::filter::Probe;
use crate::filter::SizeFilter;
use crate::imagery::Record;
use crate::imagery::Unit;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::hash::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

/// Runs one spatial unit from candidate records to representatives.
///
/// 1. screen candidates by size, skipping the unit below the minimum
/// 2. embed the survivors, per the decode [`Policy`]
/// 3. project onto the leading principal components of this unit alone
/// 4. cluster into `min(k, n)` groups
/// 5. keep the first member of each cluster in a seeded shuffle
pub struct UnitSampler<B, P = Disk> {
    filter: SizeFilter<P>,
    extractor: VectorExtractor<B>,
    pca: Pca,
    clustering: Clustering,
    minimum: usize,
    policy: Policy,
}

impl<B: Backbone, P: Probe> UnitSampler<B, P> {
    pub fn new(filter: SizeFilter<P>, extractor: VectorExtractor<B>, config: &Config) -> Self {
        Self {
            filter,
            extractor,
            pca: Pca::new(config.dimensions),
            clustering: Clustering::from(config),
            minimum: config.minimum,
            policy: config.policy,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.pca.dimensions()
    }
    pub fn width(&self) -> usize {
        self.extractor.width()
    }

    pub fn sample(&self, unit: &Unit) -> Outcome {
        let candidates = self.filter.screen(unit.records());
        log::debug!("{:<32}{}/{}", "candidates passing filter", candidates.len(), unit.len());
        if candidates.len() < self.minimum {
            return Outcome::Unusable {
                candidates: candidates.len(),
            };
        }
        let (records, embeddings) = match self.embed(candidates) {
            Ok(embedded) => embedded,
            Err(failure) => return Outcome::Failed { failure },
        };
        if records.len() < self.minimum {
            return Outcome::Unusable {
                candidates: records.len(),
            };
        }
        let n = records.len();
        let clamped = self.clustering.k() > n;
        if clamped {
            log::warn!("{:<32}{} -> {} in {}", "clamping k", self.clustering.k(), n, unit.id());
        }
        let reduced = self.pca.reduce(&embeddings);
        let partition = self.clustering.clamp(n).fit(&reduced);
        log::debug!("{:<32}{:.4}", "inertia", partition.inertia);
        let picks = self.select(unit.id(), &partition.labels);
        let mut records = records.into_iter().map(Some).collect::<Vec<Option<Record>>>();
        let samples = picks
            .into_iter()
            .filter_map(|i| {
                records[i].take().map(|record| RepresentativeSample {
                    record,
                    embedding: embeddings[i].clone(),
                    reduced: reduced[i].clone(),
                    cluster: partition.labels[i],
                })
            })
            .collect();
        Outcome::Sampled { samples, clamped }
    }

    /// Embeds candidates in order, keeping only the records that embedded.
    fn embed(&self, candidates: Vec<Record>) -> Result<(Vec<Record>, Vec<FeatureVector>), Failure> {
        match self.policy {
            Policy::Strict => {
                let embeddings = self.extractor.extract_batch(&candidates)?;
                Ok((candidates, embeddings))
            }
            Policy::Lenient => {
                let results = self.extractor.extract_each(&candidates);
                let mut records = Vec::with_capacity(candidates.len());
                let mut embeddings = Vec::with_capacity(candidates.len());
                for (record, result) in candidates.into_iter().zip(results) {
                    match result {
                        Ok(embedding) => {
                            records.push(record);
                            embeddings.push(embedding);
                        }
                        Err(e) if e.is_unreadable() => log::warn!("{}", e),
                        Err(e) => return Err(e),
                    }
                }
                Ok((records, embeddings))
            }
        }
    }

    /// Indices of one member per cluster, in ascending cluster order.
    ///
    /// Shuffles all candidate indices once with a generator derived from
    /// the run seed and the unit id, then keeps the first index seen for
    /// each label.
    pub fn select(&self, unit: &str, labels: &[usize]) -> Vec<usize> {
        let ref mut hasher = DefaultHasher::default();
        self.clustering.seed().hash(hasher);
        unit.hash(hasher);
        let ref mut rng = SmallRng::seed_from_u64(hasher.finish());
        let mut order = (0..labels.len()).collect::<Vec<usize>>();
        order.shuffle(rng);
        order
            .into_iter()
            .fold(BTreeMap::new(), |mut firsts, i| {
                firsts.entry(labels[i]).or_insert(i);
                firsts
            })
            .into_values()
            .collect()
    }
}
