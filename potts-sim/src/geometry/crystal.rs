use nalgebra::DVector;
use tracing::{debug, trace};

use super::lattice::Lattice;
use super::offsets::ShellOffsets;
use super::shells::{determine_nn_shells, Shell};
use super::site::{coords_of, index_of, strides, Neighbor, Site};
use super::translations::{axis_bounds, covered_radius, lattice_vectors, unique_neighbours};
use crate::error::{Error, Result};

/// A finite box of lattice sites together with the lattice it lives on.
///
/// Owns the lattice, the site list, the real (`R`) and reciprocal (`K`)
/// translation-vector sets and the box shape, and builds per-site neighbor
/// lists from them.
#[derive(Debug, Clone)]
pub struct Crystal {
    lattice: Lattice,
    sites: Vec<Site>,
    rn: Vec<DVector<f64>>,
    kn: Vec<DVector<f64>>,
    size: Option<Vec<usize>>,
    periodic: bool,
}

impl Crystal {
    pub fn new(lattice: Lattice) -> Self {
        Self {
            lattice,
            sites: Vec::new(),
            rn: Vec::new(),
            kn: Vec::new(),
            size: None,
            periodic: false,
        }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Real-space translation vectors from the last [`Crystal::set_rn`].
    pub fn rn(&self) -> &[DVector<f64>] {
        &self.rn
    }

    /// Reciprocal translation vectors from the last [`Crystal::set_kn`].
    pub fn kn(&self) -> &[DVector<f64>] {
        &self.kn
    }

    pub fn size(&self) -> Option<&[usize]> {
        self.size.as_deref()
    }

    pub fn periodic(&self) -> bool {
        self.periodic
    }

    /// Set the box shape, one extent per lattice axis.
    pub fn set_size(&mut self, size: Vec<usize>) -> Result<()> {
        if size.len() != self.lattice.dim() {
            return Err(Error::Configuration(format!(
                "box size has {} axes, lattice has {}",
                size.len(),
                self.lattice.dim()
            )));
        }
        if size.contains(&0) {
            return Err(Error::Configuration(format!(
                "box extents must be positive, got {size:?}"
            )));
        }
        self.size = Some(size);
        Ok(())
    }

    pub fn set_periodic(&mut self, periodic: bool) {
        self.periodic = periodic;
    }

    /// Collect lattice vectors of length up to about `r_max` into `rn()`.
    pub fn set_rn(&mut self, r_max: f64) {
        let bounds = axis_bounds(&self.lattice.recip_lat(), r_max);
        self.rn = lattice_vectors(&self.lattice.lat(), &bounds);
        debug!(r_max, n_vectors = self.rn.len(), "generated real-space translations");
    }

    /// Collect reciprocal lattice vectors of length up to about `k_max` into `kn()`.
    pub fn set_kn(&mut self, k_max: f64) {
        let bounds = axis_bounds(&self.lattice.lat(), k_max);
        self.kn = lattice_vectors(&self.lattice.recip_lat(), &bounds);
        debug!(k_max, n_vectors = self.kn.len(), "generated reciprocal translations");
    }

    fn require_size(&self) -> Result<&[usize]> {
        self.size
            .as_deref()
            .ok_or_else(|| Error::Configuration("box size not set".into()))
    }

    /// Append sites at the given fractional positions, indexed sequentially.
    pub fn add_sites(&mut self, positions: &[DVector<f64>]) -> Result<()> {
        let size = self.require_size()?.to_vec();
        let dim = self.lattice.dim();
        if let Some(p) = positions.iter().find(|p| p.len() != dim) {
            return Err(Error::Configuration(format!(
                "site position has {} components, lattice has {dim}",
                p.len()
            )));
        }

        let first = self.sites.len();
        for (i, frac) in positions.iter().enumerate() {
            let position = self.lattice.to_cartesian(frac);
            self.sites.push(Site::new(first + i, position, &size));
        }
        Ok(())
    }

    /// Add one site per box coordinate, placed at that coordinate.
    pub fn add_box_sites(&mut self) -> Result<()> {
        let size = self.require_size()?.to_vec();
        let n_sites: usize = size.iter().product();
        let positions: Vec<DVector<f64>> = (0..n_sites)
            .map(|i| {
                let coord = coords_of(i, &size);
                DVector::from_iterator(size.len(), coord.into_iter().map(|c| c as f64))
            })
            .collect();
        self.add_sites(&positions)
    }

    /// Flat index of a box coordinate.
    pub fn site_index(&self, coord: &[usize]) -> Result<usize> {
        let size = self.require_size()?;
        if coord.len() != size.len() || coord.iter().zip(size).any(|(&c, &s)| c >= s) {
            return Err(Error::Configuration(format!(
                "coordinate {coord:?} outside box {size:?}"
            )));
        }
        Ok(index_of(coord, size))
    }

    /// Neighbor lists between the sites of one cell and their images under `rn()`.
    ///
    /// For every unordered pair `(i, j)` and every translation `R` (including
    /// the zero translation) both `r_j + R - r_i` and `r_i - R - r_j` are
    /// recorded. Each list is deduplicated and sorted by distance.
    pub fn calc_cell_neighbours(&self) -> Vec<Vec<Neighbor>> {
        let n = self.sites.len();
        let zero: DVector<f64> = DVector::zeros(self.lattice.dim());
        let mut res: Vec<Vec<Neighbor>> = vec![Vec::new(); n];

        for i in 0..n {
            let ri = &self.sites[i].position;
            for j in 0..i {
                let rj = &self.sites[j].position;
                for r in std::iter::once(&zero).chain(self.rn.iter()) {
                    res[i].push(Neighbor::new(j, rj + r - ri));
                    res[j].push(Neighbor::new(i, ri - r - rj));
                }
            }
        }

        res.into_iter().map(unique_neighbours).collect()
    }

    /// Neighbor lists of every box site up to `n_steps` lattice steps per axis.
    ///
    /// With periodic boundaries targets wrap around the box and the
    /// displacement carries the image translation `Σ wraps_d * size_d * a_d`,
    /// so it always equals `Σ offset_d * a_d`. Without, offsets leaving the box
    /// are skipped. Requires a fully populated box (see [`Crystal::add_box_sites`]).
    pub fn calc_nearest_neighbours(&self, n_steps: usize) -> Result<Vec<Vec<Neighbor>>> {
        let size = self.require_size()?;
        let n_sites: usize = size.iter().product();
        if self.sites.len() != n_sites {
            return Err(Error::Configuration(format!(
                "box of {n_sites} sites holds {} sites",
                self.sites.len()
            )));
        }

        let n_dims = size.len();
        let basis = self.lattice.lat();
        let strides = strides(size);
        let mut res = Vec::with_capacity(n_sites);

        for site in &self.sites {
            let mut list = Vec::new();
            'offsets: for offset in ShellOffsets::new(n_dims, n_steps) {
                let mut target = 0usize;
                let mut translation: DVector<f64> = DVector::zeros(n_dims);
                for (d, &step) in offset.iter().enumerate() {
                    let extent = size[d] as isize;
                    let moved = site.coord[d] as isize + step;
                    let c = if self.periodic {
                        let wraps = moved.div_euclid(extent);
                        if wraps != 0 {
                            translation += basis.row(d).transpose() * (wraps * extent) as f64;
                        }
                        moved.rem_euclid(extent)
                    } else if (0..extent).contains(&moved) {
                        moved
                    } else {
                        continue 'offsets;
                    };
                    target += c as usize * strides[d];
                }
                let displacement = &self.sites[target].position + translation - &site.position;
                list.push(Neighbor::new(target, displacement));
            }
            let list = unique_neighbours(list);
            trace!(site = site.index, n_neighbors = list.len(), "built neighbor list");
            res.push(list);
        }

        debug!(
            n_sites,
            n_steps,
            periodic = self.periodic,
            "computed box neighbor lists"
        );
        Ok(res)
    }

    /// Radius below which [`Crystal::calc_nearest_neighbours`] at `n_steps`
    /// finds every lattice translation. Shells further out may be partial.
    pub fn covered_radius(&self, n_steps: usize) -> f64 {
        covered_radius(&self.lattice.recip_lat(), n_steps)
    }

    /// [`Crystal::calc_nearest_neighbours`] followed by [`determine_nn_shells`].
    pub fn neighbour_shells(&self, n_steps: usize) -> Result<Vec<Vec<Shell>>> {
        determine_nn_shells(&self.calc_nearest_neighbours(n_steps)?)
    }
}
