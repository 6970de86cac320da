use super::*;
use crate::Feature;
use crate::embedding::FeatureVector;

/// Principal component projection, fit independently for each spatial unit.
///
/// The eigen-decomposition runs on whichever of the n × n Gram matrix
/// `X Xᵀ` and the d × d scatter matrix `Xᵀ X` of the centred data is
/// smaller. Both share their non-zero eigenvalues. If `u` is a unit
/// eigenvector of `X Xᵀ` with eigenvalue `λ`, the matching scores `X v` are
/// exactly `√λ · u`, so on the Gram side no d-dimensional eigenvector is
/// ever formed; on the scatter side the scores are `X v` directly.
///
/// Each component's sign is fixed so its largest-magnitude score is
/// positive. Components past the rank of the data carry no variance and
/// come out as zero columns, so every unit yields exactly `dimensions`
/// coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Pca {
    dimensions: usize,
    sweeps: usize,
    tolerance: f64,
}

impl Pca {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            sweeps: crate::PCA_SWEEPS,
            tolerance: crate::PCA_TOLERANCE,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Projects the rows of `matrix` onto their leading principal components.
    pub fn reduce(&self, matrix: &[FeatureVector]) -> Vec<Point> {
        let n = matrix.len();
        let mut scores = vec![vec![0 as Feature; self.dimensions]; n];
        if n < 2 {
            return scores;
        }
        let ref centered = Self::center(matrix);
        let width = centered[0].len();
        let gramian = n <= width;
        let inner = match gramian {
            true => Self::gram(centered),
            false => Self::gram(&Self::transpose(centered)),
        };
        let size = inner.len();
        let trace = (0..size).map(|i| inner[i][i]).sum::<f64>();
        if trace <= f64::MIN_POSITIVE {
            return scores;
        }
        let (values, vectors) = self.eigen(inner);
        let mut order = (0..size).collect::<Vec<usize>>();
        order.sort_by(|a, b| values[*b].total_cmp(&values[*a]));
        for (c, &e) in order.iter().take(self.dimensions).enumerate() {
            let lambda = values[e];
            if lambda <= trace * 1e-10 {
                break;
            }
            let column = match gramian {
                true => (0..n)
                    .map(|i| vectors[i][e] * lambda.sqrt())
                    .collect::<Vec<f64>>(),
                false => centered
                    .iter()
                    .map(|row| (0..width).map(|k| row[k] * vectors[k][e]).sum())
                    .collect::<Vec<f64>>(),
            };
            let pivot = column
                .iter()
                .fold(0f64, |best, x| if x.abs() > best.abs() { *x } else { best });
            for (row, x) in scores.iter_mut().zip(column.iter()) {
                row[c] = (x * pivot.signum()) as Feature;
            }
        }
        scores
    }

    /// Subtracts the column means, in double precision.
    fn center(matrix: &[FeatureVector]) -> Vec<Vec<f64>> {
        let n = matrix.len() as f64;
        let d = matrix.first().map_or(0, Vec::len);
        let means = (0..d)
            .map(|j| matrix.iter().map(|row| row[j] as f64).sum::<f64>() / n)
            .collect::<Vec<f64>>();
        matrix
            .iter()
            .map(|row| {
                row.iter()
                    .zip(means.iter())
                    .map(|(x, m)| *x as f64 - m)
                    .collect()
            })
            .collect()
    }

    fn transpose(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let width = rows.first().map_or(0, Vec::len);
        (0..width)
            .map(|k| rows.iter().map(|row| row[k]).collect())
            .collect()
    }

    /// Pairwise inner products of the centred rows.
    fn gram(centered: &[Vec<f64>]) -> Vec<Vec<f64>> {
        use rayon::prelude::*;
        let n = centered.len();
        let upper = (0..n)
            .into_par_iter()
            .map(|i| {
                (i..n)
                    .map(|j| dot(&centered[i], &centered[j]))
                    .collect::<Vec<f64>>()
            })
            .collect::<Vec<Vec<f64>>>();
        let mut gram = vec![vec![0.; n]; n];
        for (i, row) in upper.into_iter().enumerate() {
            for (offset, value) in row.into_iter().enumerate() {
                gram[i][i + offset] = value;
                gram[i + offset][i] = value;
            }
        }
        gram
    }

    /// Cyclic Jacobi eigen-decomposition of a symmetric matrix.
    ///
    /// Returns the eigenvalues and a matrix whose column `e` is the unit
    /// eigenvector for eigenvalue `e`. Each rotation zeroes one off-diagonal
    /// pair; sweeps repeat until the off-diagonal mass is negligible.
    fn eigen(&self, mut a: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
        let n = a.len();
        let mut v = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1. } else { 0. }).collect())
            .collect::<Vec<Vec<f64>>>();
        let scale = a.iter().flatten().map(|x| x * x).sum::<f64>().sqrt();
        for _ in 0..self.sweeps {
            let off = (0..n)
                .flat_map(|p| (p + 1..n).map(move |q| (p, q)))
                .map(|(p, q)| a[p][q] * a[p][q])
                .sum::<f64>()
                .sqrt();
            if off <= self.tolerance * scale {
                break;
            }
            for p in 0..n {
                for q in p + 1..n {
                    if a[p][q].abs() <= f64::MIN_POSITIVE {
                        continue;
                    }
                    let theta = (a[q][q] - a[p][p]) / (2. * a[p][q]);
                    let t = if theta.abs() > 1e150 {
                        0.5 / theta
                    } else {
                        theta.signum() / (theta.abs() + (theta * theta + 1.).sqrt())
                    };
                    let c = 1. / (t * t + 1.).sqrt();
                    let s = t * c;
                    for k in 0..n {
                        let (akp, akq) = (a[k][p], a[k][q]);
                        a[k][p] = c * akp - s * akq;
                        a[k][q] = s * akp + c * akq;
                    }
                    for k in 0..n {
                        let (apk, aqk) = (a[p][k], a[q][k]);
                        a[p][k] = c * apk - s * aqk;
                        a[q][k] = s * apk + c * aqk;
                    }
                    for row in v.iter_mut() {
                        let (vkp, vkq) = (row[p], row[q]);
                        row[p] = c * vkp - s * vkq;
                        row[q] = s * vkp + c * vkq;
                    }
                }
            }
        }
        ((0..n).map(|i| a[i][i].max(0.)).collect(), v)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
