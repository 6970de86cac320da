use super::*;
use crate::Energy;

/// Triangle-inequality accelerated k-means.
///
/// Implements Elkan (2003) to cut the distance computations of naive
/// Lloyd iterations. Upper/lower bounds on point-centroid distances let most
/// comparisons be skipped while producing the same assignments as the naive
/// algorithm.
///
/// # Implementation
///
/// - `step_elkan()`: single iteration with bound maintenance
/// - `step_naive()`: reference implementation for verification
/// - `init_kmeans()`: k-means++ seeding
pub trait Elkan: Sync {
    /// Returns the data points to cluster.
    fn points(&self) -> &[Point];
    /// Returns current centroid positions.
    fn kmeans(&self) -> &[Point];
    /// Initializes centroids.
    fn init_kmeans(&self) -> Vec<Point>;

    /// Number of clusters.
    fn k(&self) -> usize {
        self.kmeans().len()
    }
    /// Gets point by index.
    fn point(&self, i: usize) -> &Point {
        &self.points()[i]
    }
    /// Gets centroid by index.
    fn kmean(&self, j: usize) -> &Point {
        &self.kmeans()[j]
    }
    /// Euclidean distance; the triangle inequality must hold for pruning.
    fn distance(&self, a: &Point, b: &Point) -> Energy {
        euclidean(a, b)
    }

    /// Initializes bounds by computing all point-centroid distances.
    fn init_bounds(&self) -> Vec<Bounds> {
        (0..self.points().len())
            .map(|i| self.neighbor(i))
            .map(|(j, d)| Bounds::new(self.k(), j, d))
            .collect()
    }

    /// Finds nearest centroid for a point; ties go to the lower index.
    fn neighbor(&self, i: usize) -> (usize, Energy) {
        let ref x = self.point(i);
        self.kmeans()
            .iter()
            .enumerate()
            .map(|(j, c)| (j, self.distance(c, x)))
            .fold((0, Energy::INFINITY), |best, next| {
                if next.1 < best.1 { next } else { best }
            })
    }

    /// Computes pairwise distances between all centroids.
    fn pairwises(&self) -> Vec<Vec<Energy>> {
        (0..self.k())
            .map(|i| (0..self.k()).map(|j| self.pairwise(i, j)).collect())
            .collect()
    }
    /// Computes distance between two centroids.
    fn pairwise(&self, i: usize, j: usize) -> Energy {
        if i == j {
            0.0
        } else {
            self.distance(self.kmean(i), self.kmean(j))
        }
    }

    /// Computes s(c) = (1/2) min_{c'≠c} d(c, c') for each centroid.
    fn midpoints(&self, pairwise: &[Vec<Energy>]) -> Vec<Energy> {
        pairwise
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .fold(Energy::MAX, |s, (_, d)| s.min(d * 0.5))
            })
            .collect()
    }

    /// Computes how far each centroid moved this iteration.
    fn drift(&self, news: &[Point]) -> Vec<Energy> {
        (0..self.k())
            .map(|j| self.distance(&news[j], self.kmean(j)))
            .collect()
    }

    /// Refreshes stale upper bound before triangle inequality check.
    fn refresh(&self, b: &mut Bounds, x: &Point) {
        if b.stale() {
            b.refresh(self.distance(x, self.kmean(b.j())));
        }
    }
    /// Updates bound for point-centroid pair, possibly reassigning.
    fn rebound(&self, b: &mut Bounds, j: usize, pairwise: &[Vec<Energy>], x: &Point) {
        if b.has_shifted(pairwise, j) {
            b.witness(self.distance(x, self.kmean(j)), j);
        }
    }

    /// Computes new centroids from assignments.
    ///
    /// A cluster left without members is re-seeded at the point farthest
    /// from its own centroid (exact distances, ties to the lower index),
    /// each such point used at most once.
    fn centroids(&self, assignments: &[usize]) -> Vec<Point> {
        let dimensions = self.kmean(0).len();
        let means = (0..self.k())
            .map(|j| {
                assignments
                    .iter()
                    .enumerate()
                    .filter(|(_, a)| **a == j)
                    .map(|(i, _)| self.point(i))
                    .fold(Mean::empty(dimensions), Mean::absorb)
            })
            .collect::<Vec<Mean>>();
        let orphans = means.iter().filter(|m| m.count() == 0).count();
        let mut donors = Vec::new();
        if orphans > 0 {
            donors = assignments
                .iter()
                .enumerate()
                .map(|(i, a)| (i, self.distance(self.point(i), self.kmean(*a))))
                .collect::<Vec<(usize, Energy)>>();
            donors.sort_by(|(i, a), (j, b)| b.total_cmp(a).then(i.cmp(j)));
            donors.truncate(orphans);
            donors.reverse();
        }
        means
            .iter()
            .map(|mean| match mean.resolve() {
                Some(centroid) => centroid,
                None => match donors.pop() {
                    Some((i, _)) => self.point(i).clone(),
                    None => vec![0.; dimensions],
                },
            })
            .collect()
    }

    /// Executes one Elkan iteration with bound maintenance.
    ///
    /// 1. Update bounds and reassign points using current centroids
    /// 2. Compute new centroids from updated assignments
    /// 3. Compute drift (how far each centroid moved)
    /// 4. Shift bounds to account for centroid movement
    fn step_elkan(&self, bounds: &mut [Bounds]) -> (Vec<Point>, Vec<Energy>) {
        let pairwise = self.pairwises();
        let midpoints = self.midpoints(&pairwise);
        bounds
            .iter_mut()
            .enumerate()
            .filter(|(_, b)| !b.can_exclude(&midpoints))
            .for_each(|(i, b)| {
                self.refresh(b, self.point(i));
                (0..self.k()).for_each(|j| self.rebound(b, j, &pairwise, self.point(i)))
            });
        let assignments = bounds.iter().map(Bounds::j).collect::<Vec<usize>>();
        let kmeans = self.centroids(&assignments);
        let drifts = self.drift(&kmeans);
        bounds.iter_mut().for_each(|b| b.update(&drifts));
        (kmeans, drifts)
    }

    /// Executes one naive iteration (for verification/benchmarking).
    fn step_naive(&self) -> (Vec<Point>, Vec<Energy>) {
        let assignments = (0..self.points().len())
            .map(|i| self.neighbor(i).0)
            .collect::<Vec<usize>>();
        let kmeans = self.centroids(&assignments);
        let drifts = self.drift(&kmeans);
        (kmeans, drifts)
    }

    /// Nearest-centroid label of every point.
    fn labels(&self) -> Vec<usize> {
        (0..self.points().len())
            .map(|i| self.neighbor(i).0)
            .collect()
    }

    /// Sum of squared distances to the nearest centroid.
    fn inertia(&self) -> Energy {
        (0..self.points().len())
            .map(|i| self.neighbor(i).1)
            .map(|d| d * d)
            .sum::<Energy>()
    }
}

/// Straight-line distance between two points of equal dimension.
pub fn euclidean(a: &Point, b: &Point) -> Energy {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<Energy>()
        .sqrt()
}
