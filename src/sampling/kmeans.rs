use super::*;
use crate::Config;
use crate::Energy;
use rand::Rng;
use rand::SeedableRng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use std::hash::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

/// Result of clustering one unit: a label per point, `k` centroids,
/// and the within-cluster sum of squared distances.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub labels: Vec<usize>,
    pub centroids: Vec<Point>,
    pub inertia: Energy,
}

/// Seeded k-means++ with many independent restarts.
///
/// Each restart derives its own generator from `(seed, restart)` so the
/// winning partition does not depend on how restarts are scheduled across
/// threads. The lowest inertia wins; ties go to the earliest restart.
#[derive(Debug, Clone, Copy)]
pub struct Clustering {
    k: usize,
    restarts: usize,
    iterations: usize,
    tolerance: Energy,
    seed: u64,
}

impl From<&Config> for Clustering {
    fn from(config: &Config) -> Self {
        Self {
            k: config.k,
            restarts: config.restarts,
            iterations: config.iterations,
            tolerance: config.tolerance,
            seed: config.seed,
        }
    }
}

impl Clustering {
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            seed,
            restarts: crate::KMEANS_RESTARTS,
            iterations: crate::KMEANS_ITERATIONS,
            tolerance: crate::KMEANS_TOLERANCE,
        }
    }
    pub fn restarts(self, restarts: usize) -> Self {
        Self { restarts, ..self }
    }
    pub fn k(&self) -> usize {
        self.k
    }
    pub fn seed(&self) -> u64 {
        self.seed
    }
    /// Same parameters with a smaller cluster count.
    pub fn clamp(self, n: usize) -> Self {
        Self {
            k: self.k.min(n),
            ..self
        }
    }

    /// Partitions `points` into `min(k, n)` clusters.
    pub fn fit(&self, points: &[Point]) -> Partition {
        let k = self.k.min(points.len());
        if k == 0 {
            return Partition {
                labels: vec![],
                centroids: vec![],
                inertia: 0.,
            };
        }
        (0..self.restarts.max(1))
            .into_par_iter()
            .map(|r| self.restart(points, k, r))
            .collect::<Vec<Partition>>()
            .into_iter()
            .min_by(|a, b| a.inertia.total_cmp(&b.inertia))
            .expect("at least one restart")
    }

    /// One full k-means run from a fresh k-means++ seeding.
    fn restart(&self, points: &[Point], k: usize, r: usize) -> Partition {
        let mut layer = Layer {
            points,
            k,
            seed: self.derive(r),
            kmeans: Vec::new(),
        };
        layer.kmeans = layer.init_kmeans();
        let ref mut bounds = layer.init_bounds();
        for i in 0..self.iterations {
            let (kmeans, drifts) = layer.step_elkan(bounds);
            layer.kmeans = kmeans;
            if drifts.iter().all(|d| *d <= self.tolerance) {
                log::trace!("restart {:>4} converged after {:>3}", r, i + 1);
                break;
            }
        }
        Partition {
            labels: layer.labels(),
            inertia: layer.inertia(),
            centroids: layer.kmeans,
        }
    }

    /// Generator seed for one restart.
    fn derive(&self, r: usize) -> u64 {
        let ref mut hasher = DefaultHasher::default();
        self.seed.hash(hasher);
        r.hash(hasher);
        hasher.finish()
    }
}

/// Points of one unit together with the centroids of one restart.
struct Layer<'a> {
    points: &'a [Point],
    kmeans: Vec<Point>,
    k: usize,
    seed: u64,
}

impl Elkan for Layer<'_> {
    fn points(&self) -> &[Point] {
        self.points
    }
    fn kmeans(&self) -> &[Point] {
        &self.kmeans
    }
    fn k(&self) -> usize {
        self.k
    }
    /// k-means++: the first centroid uniformly, every later one with
    /// probability proportional to its squared distance from the nearest
    /// centroid chosen so far. Once every point coincides with a centroid
    /// the remaining picks fall back to uniform.
    fn init_kmeans(&self) -> Vec<Point> {
        let ref mut rng = SmallRng::seed_from_u64(self.seed);
        let n = self.points.len();
        let mut potentials = vec![Energy::INFINITY; n];
        let mut kmeans = Vec::with_capacity(self.k);
        while kmeans.len() < self.k {
            let i = match kmeans.is_empty() {
                true => rng.random_range(0..n),
                false => match WeightedIndex::new(potentials.iter()) {
                    Ok(weights) => weights.sample(rng),
                    Err(_) => rng.random_range(0..n),
                },
            };
            let ref x = self.points[i];
            potentials = self
                .points
                .iter()
                .map(|p| self.distance(x, p))
                .map(|d| d * d)
                .zip(potentials.iter())
                .map(|(d0, d1)| Energy::min(d0, *d1))
                .collect();
            kmeans.push(x.clone());
        }
        kmeans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Feature;

    /// Three tight blobs far apart in the plane.
    fn blobs(per: usize, seed: u64) -> Vec<Point> {
        let ref mut rng = SmallRng::seed_from_u64(seed);
        let centres: [[Feature; 2]; 3] = [[0., 0.], [10., 0.], [0., 10.]];
        centres
            .iter()
            .flat_map(|c| std::iter::repeat(c).take(per))
            .map(|c| {
                c.iter()
                    .map(|x| x + rng.random_range(-0.5..0.5))
                    .collect()
            })
            .collect()
    }

    fn cloud(n: usize, d: usize, seed: u64) -> Vec<Point> {
        let ref mut rng = SmallRng::seed_from_u64(seed);
        (0..n)
            .map(|_| (0..d).map(|_| rng.random_range(-1.0..1.0)).collect())
            .collect()
    }

    #[test]
    fn separates_obvious_blobs() {
        let points = blobs(10, 1);
        let partition = Clustering::new(3, 7).restarts(20).fit(&points);
        assert_eq!(partition.centroids.len(), 3);
        for blob in points.chunks(10).zip(partition.labels.chunks(10)) {
            assert!(blob.1.iter().all(|l| *l == blob.1[0]));
        }
        let mut firsts = partition
            .labels
            .chunks(10)
            .map(|c| c[0])
            .collect::<Vec<usize>>();
        firsts.sort();
        firsts.dedup();
        assert_eq!(firsts.len(), 3);
    }

    #[test]
    fn labels_are_in_range() {
        let points = cloud(40, 5, 2);
        let partition = Clustering::new(5, 2102).restarts(8).fit(&points);
        assert_eq!(partition.labels.len(), 40);
        assert!(partition.labels.iter().all(|l| *l < 5));
        assert!(partition.inertia >= 0.);
    }

    #[test]
    fn deterministic_across_runs() {
        let points = cloud(30, 5, 3);
        let clustering = Clustering::new(4, 11).restarts(16);
        assert_eq!(clustering.fit(&points), clustering.fit(&points));
    }

    #[test]
    fn more_restarts_never_hurt() {
        let points = cloud(30, 3, 4);
        let few = Clustering::new(4, 5).restarts(1).fit(&points);
        let many = Clustering::new(4, 5).restarts(32).fit(&points);
        assert!(many.inertia <= few.inertia);
    }

    #[test]
    fn k_is_clamped_to_points() {
        let points = cloud(3, 2, 5);
        let partition = Clustering::new(5, 1).restarts(4).fit(&points);
        assert_eq!(partition.centroids.len(), 3);
        let mut labels = partition.labels.clone();
        labels.sort();
        assert_eq!(labels, vec![0, 1, 2]);
        assert!(partition.inertia.abs() < 1e-6);
    }

    #[test]
    fn duplicate_points_still_yield_k_clusters() {
        let mut points = vec![vec![1., 1.]; 6];
        points.push(vec![4., 4.]);
        let partition = Clustering::new(3, 9).restarts(4).fit(&points);
        assert_eq!(partition.centroids.len(), 3);
        assert_eq!(partition.labels.len(), 7);
        assert!(partition.labels.iter().all(|l| *l < 3));
    }

    #[test]
    fn empty_input_is_empty_partition() {
        let partition = Clustering::new(5, 1).fit(&[]);
        assert!(partition.labels.is_empty());
        assert!(partition.centroids.is_empty());
    }

    #[test]
    fn elkan_matches_naive() {
        let points = cloud(60, 4, 6);
        let mut elkan = Layer {
            points: &points,
            kmeans: Vec::new(),
            k: 5,
            seed: 42,
        };
        elkan.kmeans = elkan.init_kmeans();
        let mut naive = Layer {
            points: &points,
            kmeans: elkan.kmeans.clone(),
            k: 5,
            seed: 42,
        };
        let ref mut bounds = elkan.init_bounds();
        for _ in 0..20 {
            elkan.kmeans = elkan.step_elkan(bounds).0;
            naive.kmeans = naive.step_naive().0;
            for (a, b) in elkan.kmeans.iter().zip(naive.kmeans.iter()) {
                assert!(euclidean(a, b) < 1e-4, "{:?} vs {:?}", a, b);
            }
        }
        assert_eq!(elkan.labels(), naive.labels());
    }

    #[test]
    fn seeding_picks_distinct_points() {
        let points = cloud(20, 3, 7);
        let layer = Layer {
            points: &points,
            kmeans: Vec::new(),
            k: 6,
            seed: 3,
        };
        let mut seeds = layer.init_kmeans();
        assert_eq!(seeds.len(), 6);
        seeds.sort_by(|a, b| a[0].total_cmp(&b[0]));
        seeds.dedup();
        assert_eq!(seeds.len(), 6);
    }
}
