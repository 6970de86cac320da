use crate::Energy;

/// Per-point metadata for Elkan's accelerated k-means algorithm.
///
/// Stores distance bounds that enable triangle inequality pruning, so most
/// point-centroid distances are never computed. Each point keeps a lower
/// bound to every centroid plus an upper bound to its assigned one.
///
/// # Algorithm (Elkan 2003)
///
/// If d(x, c) ≤ u and d(c, c') ≥ 2u, then d(x, c') ≥ d(x, c),
/// so c' cannot steal x and d(x, c') is skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds {
    /// Currently assigned centroid index.
    j: usize,
    /// Lower bounds on distance to each centroid.
    lower: Vec<Energy>,
    /// Upper bound on distance to assigned centroid.
    error: Energy,
    /// Whether the upper bound is potentially stale.
    stale: bool,
}

impl Bounds {
    /// Fresh bounds for a point assigned to `j` at exact distance `upper`,
    /// with trivially valid zero lower bounds to all `k` centroids.
    pub fn new(k: usize, j: usize, upper: Energy) -> Self {
        let mut lower = vec![0.; k];
        lower[j] = upper;
        Self {
            j,
            lower,
            error: upper,
            stale: false,
        }
    }
    /// Currently assigned centroid index.
    pub fn j(&self) -> usize {
        self.j
    }
    /// Upper bound on distance to assigned centroid.
    pub fn u(&self) -> Energy {
        self.error
    }
    /// Whether the upper bound may be outdated.
    pub fn stale(&self) -> bool {
        self.stale
    }
    /// Lower bound for centroid j.
    pub fn lower(&self, j: usize) -> Energy {
        self.lower[j]
    }
    /// Checks if centroid j could be closer than current assignment.
    ///
    /// Returns true (needs checking) if all triangle inequality filters fail:
    /// 1. j ≠ c(x): not currently assigned
    /// 2. u(x) > l(x,j): upper bound exceeds lower bound
    /// 3. u(x) > d(c(x),j)/2: upper bound exceeds half inter-centroid distance
    pub fn has_shifted(&self, pairs: &[Vec<Energy>], j: usize) -> bool {
        self.j() != j && self.u() > self.lower(j) && self.u() > 0.5 * pairs[self.j()][j]
    }
    /// Checks if this point can skip reassignment entirely.
    /// True when u(x) ≤ s(c(x)) where s(c) = min_{c'≠c} d(c,c')/2.
    pub fn can_exclude(&self, midpoints: &[Energy]) -> bool {
        self.u() <= midpoints[self.j()]
    }
    /// Updates bounds after centroids move.
    /// Lowers are decreased by movement; upper is increased.
    pub fn update(&mut self, movements: &[Energy]) {
        self.lower
            .iter_mut()
            .zip(movements.iter())
            .for_each(|(lower, movement)| *lower = (*lower - movement).max(0.0));
        self.error += movements[self.j()];
        self.stale = true;
    }
    /// Refreshes upper bound by computing actual distance.
    pub fn refresh(&mut self, distance: Energy) {
        self.lower[self.j] = distance;
        self.error = distance;
        self.stale = false;
    }
    /// Records distance to centroid j, reassigning if strictly closer.
    pub fn witness(&mut self, distance: Energy, j: usize) {
        self.lower[j] = distance;
        if distance < self.u() {
            self.j = j;
            self.error = distance;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn witness_reassigns_only_when_closer() {
        let mut b = Bounds::new(3, 0, 2.0);
        b.witness(3.0, 1);
        assert_eq!(b.j(), 0);
        assert_eq!(b.lower(1), 3.0);
        b.witness(1.0, 2);
        assert_eq!(b.j(), 2);
        assert_eq!(b.u(), 1.0);
    }

    #[test]
    fn update_loosens_bounds() {
        let mut b = Bounds::new(2, 1, 1.0);
        b.witness(4.0, 0);
        b.update(&[1.5, 0.25]);
        assert_eq!(b.lower(0), 2.5);
        assert_eq!(b.u(), 1.25);
        assert!(b.stale());
        b.refresh(0.5);
        assert!(!b.stale());
        assert_eq!(b.u(), 0.5);
    }

    #[test]
    fn pruning_respects_half_distance() {
        let b = Bounds::new(2, 0, 1.0);
        let far = vec![vec![0., 3.], vec![3., 0.]];
        let near = vec![vec![0., 1.], vec![1., 0.]];
        assert!(!b.has_shifted(&far, 1));
        assert!(b.has_shifted(&near, 1));
        assert!(!b.has_shifted(&near, 0));
        assert!(b.can_exclude(&[1.5, 1.5]));
    }
}
