use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};

use super::site::Neighbor;

/// Grid spacing used to quantize vector components into hashable keys.
pub const KEY_RESOLUTION: f64 = 1e-9;

/// Tolerance-quantized key of a vector; vectors agreeing to within
/// `KEY_RESOLUTION` per component map to the same key.
pub fn vector_key(v: &DVector<f64>) -> Vec<i64> {
    v.iter()
        .map(|&x| (x / KEY_RESOLUTION).round() as i64)
        .collect()
}

/// Per-axis enumeration bounds `ceil(|dual_i| / 2π * r_max)`.
///
/// Covers the sphere of radius `r_max` with an axis-aligned box in lattice
/// coordinates; the box generally holds vectors longer than `r_max` too.
pub fn axis_bounds(dual: &DMatrix<f64>, r_max: f64) -> Vec<i64> {
    let r_max = r_max.max(0.0);
    dual.row_iter()
        .map(|row| (row.norm() / (2.0 * std::f64::consts::PI) * r_max).ceil() as i64)
        .collect()
}

/// Radius below which every lattice vector has all coefficients within
/// `[-n_steps, n_steps]`, i.e. `min_i (n_steps + 1) · 2π / |dual_i|`.
///
/// Inverse of [`axis_bounds`]: a search over that offset range finds every
/// vector strictly shorter than this.
pub fn covered_radius(dual: &DMatrix<f64>, n_steps: usize) -> f64 {
    dual.row_iter()
        .map(|row| (n_steps + 1) as f64 * 2.0 * std::f64::consts::PI / row.norm())
        .fold(f64::INFINITY, f64::min)
}

/// All nonzero integer combinations `Σ n_i basis_i` with `|n_i| <= bounds[i]`,
/// deduplicated and sorted by ascending norm.
///
/// Axes are folded in one at a time: each nonzero multiple of the new basis
/// vector is kept on its own and added to every vector accumulated from the
/// previous axes.
pub fn lattice_vectors(basis: &DMatrix<f64>, bounds: &[i64]) -> Vec<DVector<f64>> {
    let mut acc: Vec<DVector<f64>> = Vec::new();
    for (axis, &n_max) in bounds.iter().enumerate() {
        let n_max = n_max.max(0);
        let a: DVector<f64> = basis.row(axis).transpose();
        let mut folded = Vec::new();
        for n in -n_max..=n_max {
            if n == 0 {
                continue;
            }
            let step = &a * n as f64;
            for v in &acc {
                folded.push(v + &step);
            }
            folded.push(step);
        }
        acc.extend(folded);
    }
    unique_by_norm(acc)
}

/// Deduplicate vectors by quantized key, drop the zero vector, sort by norm.
pub fn unique_by_norm(vectors: Vec<DVector<f64>>) -> Vec<DVector<f64>> {
    let mut unique: BTreeMap<Vec<i64>, DVector<f64>> = BTreeMap::new();
    for v in vectors {
        let key = vector_key(&v);
        if key.iter().all(|&k| k == 0) {
            continue;
        }
        unique.entry(key).or_insert(v);
    }
    let mut res: Vec<DVector<f64>> = unique.into_values().collect();
    res.sort_by(|a, b| a.norm().total_cmp(&b.norm()));
    res
}

/// Deduplicate `(peer, displacement)` pairs and sort by displacement norm.
///
/// Ties keep the key order (peer index, then displacement components), so the
/// result does not depend on insertion order.
pub fn unique_neighbours(list: Vec<Neighbor>) -> Vec<Neighbor> {
    let mut unique: BTreeMap<(usize, Vec<i64>), Neighbor> = BTreeMap::new();
    for nb in list {
        unique
            .entry((nb.index, vector_key(&nb.displacement)))
            .or_insert(nb);
    }
    let mut res: Vec<Neighbor> = unique.into_values().collect();
    res.sort_by(|a, b| a.distance().total_cmp(&b.distance()));
    res
}
