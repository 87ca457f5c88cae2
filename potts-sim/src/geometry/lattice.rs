use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// Determinant threshold (on the normalized basis) below which the basis is
/// treated as singular.
const SINGULAR_TOL: f64 = 1e-12;

/// Bravais lattice given by its basis vectors, stored as matrix rows.
///
/// The basis is kept normalized by the length of the first basis vector
/// (`scale`). `lat()` and `recip_lat()` undo the normalization, so that
/// `lat() * recip_lat().transpose() == 2π·I` up to rounding.
#[derive(Debug, Clone)]
pub struct Lattice {
    /// Basis divided by `scale`; row `i` is `a_i / scale`.
    lat: DMatrix<f64>,
    /// Reciprocal of the normalized basis, rows `b_i` with `a_i·b_j = 2π δ_ij`.
    recip_lat: DMatrix<f64>,
    /// Length of the first basis vector.
    scale: f64,
}

impl Lattice {
    /// Build a lattice from a square basis matrix whose rows are the basis vectors.
    pub fn new(basis: DMatrix<f64>) -> Result<Self> {
        if basis.nrows() == 0 || !basis.is_square() {
            return Err(Error::Geometry(format!(
                "basis must be a non-empty square matrix, got {}x{}",
                basis.nrows(),
                basis.ncols()
            )));
        }
        if basis.iter().any(|x| !x.is_finite()) {
            return Err(Error::Geometry("basis contains non-finite entries".into()));
        }

        let scale = basis.row(0).norm();
        if scale == 0.0 {
            return Err(Error::Geometry("first basis vector has zero length".into()));
        }

        let lat = &basis / scale;
        if lat.determinant().abs() < SINGULAR_TOL {
            return Err(Error::Geometry("basis vectors are linearly dependent".into()));
        }
        let inv = lat
            .clone()
            .try_inverse()
            .ok_or_else(|| Error::Geometry("basis matrix is not invertible".into()))?;
        let recip_lat = inv.transpose() * (2.0 * PI);

        Ok(Self {
            lat,
            recip_lat,
            scale,
        })
    }

    /// Build a lattice from basis vectors given as rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let dim = rows.len();
        if let Some(row) = rows.iter().find(|r| r.len() != dim) {
            return Err(Error::Geometry(format!(
                "basis vector has length {}, expected {dim}",
                row.len()
            )));
        }
        Self::new(DMatrix::from_fn(dim, dim, |i, j| rows[i][j]))
    }

    /// Hypercubic lattice with lattice constant `a`.
    pub fn hypercubic(n_dims: usize, a: f64) -> Result<Self> {
        Self::new(DMatrix::identity(n_dims, n_dims) * a)
    }

    pub fn dim(&self) -> usize {
        self.lat.nrows()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Real-space basis, rows are the basis vectors.
    pub fn lat(&self) -> DMatrix<f64> {
        &self.lat * self.scale
    }

    /// Reciprocal basis, rows are the reciprocal vectors.
    pub fn recip_lat(&self) -> DMatrix<f64> {
        &self.recip_lat / self.scale
    }

    /// Convert fractional coordinates `f` into the absolute position `Σ f_i a_i`.
    pub fn to_cartesian(&self, frac: &DVector<f64>) -> DVector<f64> {
        self.lat.transpose() * frac * self.scale
    }
}
