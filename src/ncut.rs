//! Normalized-cut spectral clustering of a weighted adjacency matrix
//!
//! Clustering runs in two stages behind [`SpectralOracle`]: continuous eigenvectors of the
//! normalized affinity matrix, then a discretisation into a one-hot assignment matrix. The
//! bridge [`compute_ncut`] turns that matrix into one cluster id per node, refusing rows that
//! aren't a single 1.

use crate::record::MalformedInput;
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use thiserror::Error;
use tracing::*;

const EPS: f64 = 2.2204e-16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NcutError {
    #[error(transparent)]
    Malformed(#[from] MalformedInput),
    #[error("eigendecomposition did not converge")]
    Eigen,
    #[error("SVD did not converge after {0} restarts")]
    Svd(usize),
}

/// Source of spectral embeddings and their discretisation
pub trait SpectralOracle {
    /// The `clusters` leading eigenvectors, one column each, one row per node.
    fn eigenvectors(
        &self,
        adj: &DMatrix<f64>,
        clusters: usize,
    ) -> Result<DMatrix<f64>, NcutError>;
    /// A one-hot `nodes x clusters` assignment derived from the eigenvectors.
    fn discretise(&self, eigenvectors: &DMatrix<f64>) -> Result<DMatrix<f64>, NcutError>;
}

/// Multiclass normalized cut, after Yu and Shi
#[derive(Debug, Clone, Copy)]
pub struct NormalizedCut {
    /// Added to every degree to keep isolated nodes finite
    pub offset: f64,
    pub max_restarts: usize,
    pub max_iterations: usize,
}
impl Default for NormalizedCut {
    fn default() -> Self {
        Self {
            offset: 0.5,
            max_restarts: 30,
            max_iterations: 20,
        }
    }
}

impl SpectralOracle for NormalizedCut {
    #[instrument(level = "debug", skip_all, fields(nodes = adj.nrows(), clusters = clusters))]
    fn eigenvectors(
        &self,
        adj: &DMatrix<f64>,
        clusters: usize,
    ) -> Result<DMatrix<f64>, NcutError> {
        let n = adj.nrows();
        let abs_deg = adj.abs().column_sum();
        let deg = adj.column_sum();
        let mut w = adj.clone();
        for i in 0..n {
            w[(i, i)] += 0.5 * (abs_deg[i] - deg[i]) + self.offset;
        }
        let dinv = abs_deg.map(|d| 1.0 / (d + 2.0 * self.offset + EPS).sqrt());
        let p = DMatrix::from_fn(n, n, |i, j| dinv[i] * w[(i, j)] * dinv[j]);
        let p = (&p + p.transpose()) * 0.5;
        let eigen = SymmetricEigen::try_new(p, EPS, 10_000).ok_or(NcutError::Eigen)?;

        let mut order = (0..n).collect::<Vec<_>>();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));
        let scale = (n as f64).sqrt();
        let mut out = DMatrix::zeros(n, clusters);
        for (c, &k) in order.iter().take(clusters).enumerate() {
            let mut v = eigen.eigenvectors.column(k).component_mul(&dinv);
            let norm = v.norm();
            if norm > 0.0 {
                let sign = if v[0] < 0.0 { -1.0 } else { 1.0 };
                v *= sign * scale / norm;
            }
            out.set_column(c, &v);
            trace!(cluster = c, eigenvalue = eigen.eigenvalues[k], "kept eigenvector");
        }
        Ok(out)
    }

    #[instrument(level = "debug", skip_all, fields(nodes = eigenvectors.nrows()))]
    fn discretise(&self, eigenvectors: &DMatrix<f64>) -> Result<DMatrix<f64>, NcutError> {
        let (n, k) = eigenvectors.shape();
        if n == 0 || k == 0 {
            return Ok(DMatrix::zeros(n, k));
        }
        let mut ev = eigenvectors.clone();
        for mut row in ev.row_iter_mut() {
            let norm = row.norm();
            row /= norm + EPS;
        }

        'restart: for restart in 0..self.max_restarts {
            let mut rot = DMatrix::zeros(k, k);
            rot.set_column(0, &ev.row(restart % n).transpose());
            let mut c = DVector::<f64>::zeros(n);
            for j in 1..k {
                c += (&ev * rot.column(j - 1)).abs();
                let next = c
                    .iter()
                    .enumerate()
                    .min_by(|a, b| a.1.total_cmp(b.1))
                    .map_or(0, |m| m.0);
                rot.set_column(j, &ev.row(next).transpose());
            }

            let mut last = 0.0;
            for iteration in 1.. {
                let t = &ev * &rot;
                let mut discrete = DMatrix::zeros(n, k);
                for (i, row) in t.row_iter().enumerate() {
                    let j = row
                        .iter()
                        .enumerate()
                        .max_by(|a, b| a.1.total_cmp(b.1))
                        .map_or(0, |m| m.0);
                    discrete[(i, j)] = 1.0;
                }
                let svd = (discrete.transpose() * &ev).try_svd(true, true, f64::EPSILON, 1000);
                let Some((u, v_t, sigma)) =
                    svd.and_then(|svd| Some((svd.u?, svd.v_t?, svd.singular_values)))
                else {
                    warn!(restart, "SVD failed, restarting");
                    continue 'restart;
                };
                let value = 2.0 * (n as f64 - sigma.sum());
                if (value - last).abs() < EPS || iteration > self.max_iterations {
                    debug!(restart, iteration, ncut = value, "discretised");
                    return Ok(discrete);
                }
                last = value;
                rot = v_t.transpose() * u.transpose();
            }
        }
        Err(NcutError::Svd(self.max_restarts))
    }
}

/// Cluster the nodes of `adj` into `clusters` groups with the default normalized cut.
pub fn compute_ncut(adj: &DMatrix<f64>, clusters: usize) -> Result<Vec<usize>, NcutError> {
    compute_ncut_with(&NormalizedCut::default(), adj, clusters)
}

/// Cluster with a caller-provided oracle, returning a 0-based cluster id per node.
pub fn compute_ncut_with<O: SpectralOracle + ?Sized>(
    oracle: &O,
    adj: &DMatrix<f64>,
    clusters: usize,
) -> Result<Vec<usize>, NcutError> {
    let (rows, cols) = adj.shape();
    if rows != cols {
        return Err(MalformedInput::NotSquare { rows, cols }.into());
    }
    if clusters == 0 || clusters > rows {
        return Err(MalformedInput::ClusterCount {
            clusters,
            nodes: rows,
        }
        .into());
    }
    let eigenvectors = oracle.eigenvectors(adj, clusters)?;
    let discrete = oracle.discretise(&eigenvectors)?;
    assignment_to_ids(&discrete, rows, clusters)
}

/// Turn a one-hot `nodes x clusters` assignment matrix into cluster ids by dotting each row
/// with `1..=clusters`.
pub fn assignment_to_ids(
    discrete: &DMatrix<f64>,
    nodes: usize,
    clusters: usize,
) -> Result<Vec<usize>, NcutError> {
    if discrete.nrows() != nodes {
        return Err(MalformedInput::Length {
            what: "assignment matrix",
            expected: nodes,
            found: discrete.nrows(),
        }
        .into());
    }
    if discrete.ncols() != clusters {
        return Err(MalformedInput::Length {
            what: "assignment row",
            expected: clusters,
            found: discrete.ncols(),
        }
        .into());
    }
    for (row, values) in discrete.row_iter().enumerate() {
        let nonzero = values.iter().filter(|&&x| x != 0.0).count();
        if nonzero != 1 || values.iter().any(|&x| x != 0.0 && x != 1.0) {
            return Err(MalformedInput::AssignmentRow { row, nonzero }.into());
        }
    }
    let labels = DVector::from_fn(clusters, |i, _| (i + 1) as f64);
    let ids = discrete * labels;
    Ok(ids.iter().map(|&x| x.round() as usize - 1).collect())
}
