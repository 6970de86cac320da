use super::*;

/// Trait for k-means centroid computation via incremental aggregation.
///
/// Points are folded one at a time into an accumulator; resolving the
/// accumulator yields the centroid of everything absorbed so far.
pub trait Absorb {
    /// Folds one more point in.
    fn absorb(self, point: &Point) -> Self;
}

/// Running coordinate sum and count, resolving to the arithmetic mean.
///
/// Sums are kept in double precision so the order-dependent rounding of
/// long folds stays far below the convergence tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct Mean {
    sum: Vec<f64>,
    count: usize,
}

impl Mean {
    pub fn empty(dimensions: usize) -> Self {
        Self {
            sum: vec![0.; dimensions],
            count: 0,
        }
    }
    pub fn count(&self) -> usize {
        self.count
    }
    /// The mean of the absorbed points, or nothing if none were absorbed.
    pub fn resolve(&self) -> Option<Point> {
        match self.count {
            0 => None,
            n => Some(
                self.sum
                    .iter()
                    .map(|s| (s / n as f64) as crate::Feature)
                    .collect(),
            ),
        }
    }
}

impl Absorb for Mean {
    fn absorb(mut self, point: &Point) -> Self {
        self.sum
            .iter_mut()
            .zip(point.iter())
            .for_each(|(s, x)| *s += *x as f64);
        self.count += 1;
        self
    }
}
