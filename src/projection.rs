//! Principal-component projection of document-term matrices.
//!
//! Centers (and optionally scales) the columns, then extracts the leading
//! eigenvectors of the covariance matrix by power iteration with deflation.
//! Component signs are fixed deterministically: the largest-magnitude loading
//! of each component is made positive.

use log::debug;
use ndarray::{Array1, Array2};

use crate::error::{Error, Result};
use crate::matrix::builder::TermMatrix;

const POWER_ITERATIONS: usize = 100;
const CONVERGENCE_TOL: f64 = 1e-10;
const VARIANCE_EPS: f64 = 1e-12;

/// A reduced matrix plus the explained-variance fraction per component.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Shape (rows x k); same row order as the input.
    pub scores: Array2<f64>,
    /// Length k, descending. Fractions of total column variance.
    pub explained: Vec<f64>,
}

/// Principal-component projection utility.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pca {
    scale: bool,
}

impl Pca {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale centered columns to unit variance before projecting.
    /// Zero-variance columns are left as-is (all zero after centering).
    pub fn with_scaling(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }

    /// Project a dense matrix onto its `k` leading principal components.
    pub fn fit(&self, data: &Array2<f64>, k: usize) -> Result<Projection> {
        let (rows, cols) = data.dim();
        let bound = rows.min(cols);
        if k > bound {
            return Err(Error::DimensionError {
                requested: k,
                bound,
            });
        }

        let mut centered = data.clone();
        for mut col in centered.columns_mut() {
            let mean = col.sum() / rows as f64;
            col.mapv_inplace(|v| v - mean);
        }
        if self.scale {
            for mut col in centered.columns_mut() {
                let var = col.iter().map(|v| v * v).sum::<f64>() / (rows.max(2) - 1) as f64;
                if var > VARIANCE_EPS {
                    let std = var.sqrt();
                    col.mapv_inplace(|v| v / std);
                }
            }
        }

        // Covariance of the centered columns.
        let denom = (rows.max(2) - 1) as f64;
        let mut cov = centered.t().dot(&centered) / denom;
        let total_variance: f64 = cov.diag().sum();

        let mut scores = Array2::zeros((rows, k));
        let mut explained = Vec::with_capacity(k);
        for component in 0..k {
            let (eigenvalue, mut eigenvector) = power_iteration(&cov);
            if eigenvalue <= VARIANCE_EPS {
                // Rank exhausted; remaining components carry nothing.
                explained.push(0.0);
                continue;
            }
            fix_sign(&mut eigenvector);
            let projected = centered.dot(&eigenvector);
            scores.column_mut(component).assign(&projected);
            explained.push(if total_variance > VARIANCE_EPS {
                eigenvalue / total_variance
            } else {
                0.0
            });
            // Deflate: cov -= eigenvalue * v * v^T
            let outer = outer_product(&eigenvector);
            cov.zip_mut_with(&outer, |c, &o| *c -= eigenvalue * o);
        }

        debug!(
            "projected {}x{} matrix onto {} components, first explains {:.3}",
            rows,
            cols,
            k,
            explained.first().copied().unwrap_or(0.0)
        );
        Ok(Projection { scores, explained })
    }

    /// Convenience wrapper: densify a term matrix and project it.
    pub fn project_matrix(&self, matrix: &TermMatrix, k: usize) -> Result<Projection> {
        self.fit(&matrix.to_dense(), k)
    }
}

/// Largest eigenvalue/eigenvector of a symmetric matrix by power iteration,
/// with the Rayleigh quotient as the eigenvalue estimate.
fn power_iteration(matrix: &Array2<f64>) -> (f64, Array1<f64>) {
    let n = matrix.nrows();
    let mut v = Array1::from_elem(n, 1.0 / (n as f64).sqrt());
    let mut eigenvalue = 0.0;

    for _ in 0..POWER_ITERATIONS {
        let mut next = matrix.dot(&v);
        let new_eigenvalue: f64 = v.dot(&next);
        let norm = next.dot(&next).sqrt();
        if norm > CONVERGENCE_TOL {
            next /= norm;
        } else {
            return (new_eigenvalue, v);
        }
        if (new_eigenvalue - eigenvalue).abs() < CONVERGENCE_TOL {
            return (new_eigenvalue, next);
        }
        eigenvalue = new_eigenvalue;
        v = next;
    }
    (eigenvalue, v)
}

/// Make the largest-magnitude loading positive; ties break on the first such
/// position, so repeated runs agree.
fn fix_sign(v: &mut Array1<f64>) {
    let mut max_abs = 0.0;
    let mut max_val = 0.0;
    for &x in v.iter() {
        if x.abs() > max_abs {
            max_abs = x.abs();
            max_val = x;
        }
    }
    if max_val < 0.0 {
        v.mapv_inplace(|x| -x);
    }
}

fn outer_product(v: &Array1<f64>) -> Array2<f64> {
    let n = v.len();
    let mut out = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            out[[i, j]] = v[i] * v[j];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn component_count_is_bounded() {
        let data = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let err = Pca::new().fit(&data, 3);
        assert!(matches!(
            err,
            Err(Error::DimensionError {
                requested: 3,
                bound: 2
            })
        ));
    }

    #[test]
    fn rank_one_input_explains_everything_in_one_component() {
        // Three linearly dependent rows: multiples 1x, 2x, 3x of (1, 2, 3).
        let data = array![[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [3.0, 6.0, 9.0]];
        let proj = Pca::new().fit(&data, 1).unwrap();
        assert!((proj.explained[0] - 1.0).abs() < 1e-6);
        // Rows map to values proportional to their scalar multiple: the
        // middle row sits at the centroid, the outer rows mirror each other.
        assert!(proj.scores[[1, 0]].abs() < 1e-9);
        assert!((proj.scores[[0, 0]] + proj.scores[[2, 0]]).abs() < 1e-9);
        assert!(proj.scores[[2, 0]].abs() > 1.0);
    }

    #[test]
    fn sign_is_stable_across_runs() {
        let data = array![[1.0, 0.5], [2.0, 1.8], [0.2, 3.0], [4.0, 0.1]];
        let a = Pca::new().fit(&data, 2).unwrap();
        let b = Pca::new().fit(&data, 2).unwrap();
        assert_eq!(a.scores, b.scores);
        assert_eq!(a.explained, b.explained);
    }

    #[test]
    fn components_come_out_in_descending_order() {
        let data = array![
            [10.0, 0.1, 0.0],
            [-10.0, -0.2, 0.1],
            [9.5, 0.3, -0.1],
            [-9.5, -0.1, 0.0]
        ];
        let proj = Pca::new().fit(&data, 3).unwrap();
        assert!(proj.explained[0] >= proj.explained[1]);
        assert!(proj.explained[1] >= proj.explained[2]);
    }

    #[test]
    fn zero_variance_column_never_yields_nan() {
        let mut rows = Vec::new();
        for i in 0..10 {
            rows.push([i as f64, 7.0, (i % 3) as f64]);
        }
        let data = Array2::from(rows);
        let proj = Pca::new().with_scaling(true).fit(&data, 2).unwrap();
        assert!(proj.scores.iter().all(|v| v.is_finite()));
        assert!(proj.explained.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn single_row_is_degenerate_but_safe() {
        let data = array![[1.0, 2.0, 3.0]];
        let proj = Pca::new().fit(&data, 1).unwrap();
        assert_eq!(proj.scores.dim(), (1, 1));
        assert!(proj.scores[[0, 0]].abs() < 1e-12);
        assert_eq!(proj.explained[0], 0.0);
    }
}
