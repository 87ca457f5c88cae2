use nalgebra::DVector;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{debug, warn};
use validator::Validate;

use crate::clusters::wolff_update;
use crate::config::PottsConfig;
use crate::error::{Error, Result};
use crate::geometry::{Crystal, Lattice, Shell, SHELL_TOLERANCE};
use crate::mcmc::metropolis_step;
use crate::spins;

/// One registered spin pair.
#[derive(Debug, Clone)]
struct Correlator {
    site: usize,
    peer: usize,
    displacement: DVector<f64>,
}

/// Snapshot of one registered correlator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelatorSample {
    /// Distance between the two sites.
    pub distance: f64,
    pub spin_i: u8,
    pub spin_j: u8,
}

/// q-state Potts model on a box of a crystal lattice.
///
/// Owns the crystal, the spin field (values in `[0, q)`, one per box site),
/// the neighbor shells of every site, the Hamiltonian parameters and its own
/// random stream. `q = 2` is the Ising model.
pub struct PottsModel {
    crystal: Crystal,
    q: u8,
    field: Vec<u8>,
    shells: Vec<Vec<Shell>>,
    /// Lattice steps per axis covered by `shells`.
    shell_depth: usize,
    /// Interaction strength per shell, `couplings[k]` for shell `k`.
    couplings: Vec<f64>,
    h: f64,
    beta: f64,
    correlators: Vec<Correlator>,
    rng: Xoshiro256StarStar,
}

impl PottsModel {
    /// Build a model with a random stream seeded from `config.seed`.
    pub fn new(lattice: Lattice, config: &PottsConfig) -> Result<Self> {
        let rng = Xoshiro256StarStar::seed_from_u64(config.seed);
        Self::with_rng(lattice, config, rng)
    }

    /// Build a model drawing all randomness from `rng`.
    ///
    /// The field starts with independent uniform spins and the shells are
    /// computed to `config.initial_shell_depth` steps.
    pub fn with_rng(
        lattice: Lattice,
        config: &PottsConfig,
        mut rng: Xoshiro256StarStar,
    ) -> Result<Self> {
        config.validate()?;

        let mut crystal = Crystal::new(lattice);
        crystal.set_size(config.size.clone())?;
        crystal.set_periodic(config.periodic);
        crystal.add_box_sites()?;

        let n_sites = crystal.sites().len();
        let field: Vec<u8> = (0..n_sites).map(|_| rng.gen_range(0..config.q)).collect();
        let shells = crystal.neighbour_shells(config.initial_shell_depth)?;

        debug!(
            n_sites,
            q = config.q,
            periodic = config.periodic,
            "initialized Potts model"
        );

        Ok(Self {
            crystal,
            q: config.q,
            field,
            shells,
            shell_depth: config.initial_shell_depth,
            couplings: Vec::new(),
            h: 0.0,
            beta: 0.0,
            correlators: Vec::new(),
            rng,
        })
    }

    pub fn crystal(&self) -> &Crystal {
        &self.crystal
    }

    pub fn q(&self) -> u8 {
        self.q
    }

    pub fn n_sites(&self) -> usize {
        self.field.len()
    }

    /// Current spin field, indexed like the crystal's sites.
    pub fn field(&self) -> &[u8] {
        &self.field
    }

    /// Neighbor shells of every site.
    pub fn shells(&self) -> &[Vec<Shell>] {
        &self.shells
    }

    pub fn shell_depth(&self) -> usize {
        self.shell_depth
    }

    /// Interaction strength per shell.
    pub fn j(&self) -> &[f64] {
        &self.couplings
    }

    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Set one interaction strength per shell, nearest shell first.
    ///
    /// A shell counts only when it lies inside the radius the neighbor search
    /// fully covers, so every coupling acts on a complete shell. When too few
    /// such shells exist, the search is redone at depth
    /// `max(current, ceil(|J|/2) + 1)` and then widened one step at a time. A
    /// bounded box may run out of neighbors first; the surplus couplings then
    /// act on nothing. On error the previous couplings and shells are kept.
    pub fn set_interaction_parameters(&mut self, couplings: Vec<f64>) -> Result<()> {
        let needed = couplings.len();
        let complete = complete_shell_count(&self.shells, self.complete_radius(self.shell_depth));
        if complete < needed {
            let start = self.shell_depth.max(needed.div_ceil(2) + 1);
            self.grow_shells(start, |shells, radius| {
                complete_shell_count(shells, radius) >= needed
            })?;
        }
        self.couplings = couplings;
        Ok(())
    }

    /// Distance below which every shell built at `depth` is complete.
    fn complete_radius(&self, depth: usize) -> f64 {
        self.crystal.covered_radius(depth) - SHELL_TOLERANCE
    }

    /// Rebuild the shells from depth `start` upward until `enough` holds for
    /// the shells and their complete radius, or the box stops yielding new
    /// neighbors. The model is untouched when a rebuild fails.
    fn grow_shells(
        &mut self,
        start: usize,
        enough: impl Fn(&[Vec<Shell>], f64) -> bool,
    ) -> Result<()> {
        let mut depth = start;
        let mut shells = self.crystal.neighbour_shells(depth)?;
        while !enough(&shells, self.complete_radius(depth)) {
            let wider = self.crystal.neighbour_shells(depth + 1)?;
            if neighbor_count(&wider) == neighbor_count(&shells) {
                warn!(
                    depth,
                    available = complete_shell_count(&shells, self.complete_radius(depth)),
                    "box exhausted before the neighbor shells were complete"
                );
                break;
            }
            depth += 1;
            shells = wider;
        }

        debug!(depth, "recomputed neighbor shells");
        self.shells = shells;
        self.shell_depth = depth;
        Ok(())
    }

    /// External field, coupling to spin value 0.
    pub fn set_h(&mut self, h: f64) {
        self.h = h;
    }

    /// Inverse temperature.
    pub fn set_beta(&mut self, beta: f64) {
        self.beta = beta;
    }

    /// Register every neighbor of `index` in shells of radius up to `r_max`.
    ///
    /// The neighbor search is widened first when `r_max` reaches past the
    /// radius it fully covers.
    pub fn add_spin_correlator(&mut self, index: usize, r_max: f64) -> Result<()> {
        self.check_site(index)?;
        let cutoff = r_max + SHELL_TOLERANCE;
        if self.complete_radius(self.shell_depth) <= cutoff {
            self.grow_shells(self.shell_depth + 1, |_, radius| radius > cutoff)?;
        }
        for shell in &self.shells[index] {
            if shell.radius() > cutoff {
                break;
            }
            for nb in shell.neighbors() {
                self.correlators.push(Correlator {
                    site: index,
                    peer: nb.index,
                    displacement: nb.displacement.clone(),
                });
            }
        }
        Ok(())
    }

    /// [`PottsModel::add_spin_correlator`] addressed by box coordinate.
    pub fn add_spin_correlator_at(&mut self, coord: &[usize], r_max: f64) -> Result<()> {
        let index = self.crystal.site_index(coord)?;
        self.add_spin_correlator(index, r_max)
    }

    pub fn clear_spin_correlators(&mut self) {
        self.correlators.clear();
    }

    pub fn n_correlators(&self) -> usize {
        self.correlators.len()
    }

    /// Current `(distance, s_i, s_j)` of every registered correlator.
    pub fn measure_spin_correlators(&self) -> Vec<CorrelatorSample> {
        self.correlators
            .iter()
            .map(|c| CorrelatorSample {
                distance: c.displacement.norm(),
                spin_i: self.field[c.site],
                spin_j: self.field[c.peer],
            })
            .collect()
    }

    /// Product of the spin values at `i` and `j`.
    pub fn spin_spin(&self, i: usize, j: usize) -> Result<u32> {
        self.check_site(i)?;
        self.check_site(j)?;
        Ok(self.field[i] as u32 * self.field[j] as u32)
    }

    fn check_site(&self, index: usize) -> Result<()> {
        if index >= self.n_sites() {
            return Err(Error::Configuration(format!(
                "site {index} outside box of {} sites",
                self.n_sites()
            )));
        }
        Ok(())
    }

    /// One Monte Carlo move seeded at a uniformly random site.
    ///
    /// Returns the number of sites given a new spin: 0 or 1 for a Metropolis
    /// move, the cluster size for a cluster move.
    pub fn update(&mut self, use_cluster: bool) -> usize {
        let site = self.rng.gen_range(0..self.field.len());
        if use_cluster {
            wolff_update(
                &mut self.field,
                &self.shells,
                &self.couplings,
                self.beta,
                self.q,
                site,
                &mut self.rng,
            )
        } else {
            usize::from(metropolis_step(
                &mut self.field,
                &self.shells,
                &self.couplings,
                self.h,
                self.beta,
                self.q,
                site,
                &mut self.rng,
            ))
        }
    }

    pub fn site_energy(&self, index: usize) -> Result<f64> {
        self.check_site(index)?;
        Ok(spins::site_energy(
            &self.field,
            index,
            &self.shells[index],
            &self.couplings,
            self.h,
        ))
    }

    pub fn total_energy(&self) -> f64 {
        spins::total_energy(&self.field, &self.shells, &self.couplings, self.h)
    }

    pub fn average_site_energy(&self) -> f64 {
        self.total_energy() / self.n_sites() as f64
    }

    /// Mean spin value.
    pub fn magnetization(&self) -> f64 {
        spins::magnetization(&self.field)
    }
}

/// Fewest shells of radius below `radius` held by any site.
fn complete_shell_count(shells: &[Vec<Shell>], radius: f64) -> usize {
    shells
        .iter()
        .map(|site| site.iter().take_while(|s| s.radius() < radius).count())
        .min()
        .unwrap_or(0)
}

fn neighbor_count(shells: &[Vec<Shell>]) -> usize {
    shells.iter().flatten().map(Shell::len).sum()
}
