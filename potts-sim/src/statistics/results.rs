/// Observables averaged over the measured updates of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    /// ⟨e⟩, mean energy per site.
    pub energy: f64,
    /// ⟨e²⟩.
    pub energy2: f64,
    /// ⟨m⟩, mean spin value.
    pub magnetization: f64,
    /// ⟨m²⟩.
    pub magnetization2: f64,
    /// Fraction of updates that changed the field (Metropolis) or mean
    /// cluster size in sites (cluster mode), over all updates.
    pub mean_update_size: f64,
    /// Number of recorded measurements.
    pub n_measurements: usize,
}

impl SweepResult {
    /// `⟨e²⟩ - ⟨e⟩²`.
    pub fn energy_variance(&self) -> f64 {
        self.energy2 - self.energy * self.energy
    }

    /// `⟨m²⟩ - ⟨m⟩²`.
    pub fn magnetization_variance(&self) -> f64 {
        self.magnetization2 - self.magnetization * self.magnetization
    }

    /// Specific heat per site, `β² N (⟨e²⟩ - ⟨e⟩²)`.
    pub fn specific_heat(&self, beta: f64, n_sites: usize) -> f64 {
        beta * beta * n_sites as f64 * self.energy_variance()
    }

    /// Average results of independent runs. Returns `None` for an empty slice.
    pub fn aggregate(results: &[Self]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        let n = results.len() as f64;
        let mean = |f: fn(&Self) -> f64| results.iter().map(f).sum::<f64>() / n;
        Some(Self {
            energy: mean(|r| r.energy),
            energy2: mean(|r| r.energy2),
            magnetization: mean(|r| r.magnetization),
            magnetization2: mean(|r| r.magnetization2),
            mean_update_size: mean(|r| r.mean_update_size),
            n_measurements: results.iter().map(|r| r.n_measurements).sum(),
        })
    }
}
