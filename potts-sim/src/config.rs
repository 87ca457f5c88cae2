use validator::{Validate, ValidationError};

/// Lattice steps per axis used for the initial neighbor search.
pub const DEFAULT_SHELL_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateMode {
    Metropolis,
    Cluster,
}

impl UpdateMode {
    pub fn use_cluster(&self) -> bool {
        matches!(self, Self::Cluster)
    }
}

impl TryFrom<&str> for UpdateMode {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "metropolis" | "single" => Ok(Self::Metropolis),
            "cluster" | "wolff" => Ok(Self::Cluster),
            _ => Err(format!(
                "unknown update_mode '{s}', expected 'metropolis' or 'cluster'"
            )),
        }
    }
}

fn validate_potts_config(cfg: &PottsConfig) -> Result<(), ValidationError> {
    if cfg.size.is_empty() {
        return Err(ValidationError::new("size must have at least one axis"));
    }
    if cfg.size.contains(&0) {
        return Err(ValidationError::new("every box extent must be >= 1"));
    }
    if cfg.q < 2 {
        return Err(ValidationError::new("q must be >= 2"));
    }
    if cfg.initial_shell_depth < 1 {
        return Err(ValidationError::new("initial_shell_depth must be >= 1"));
    }
    Ok(())
}

/// Static description of one Potts simulation box.
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_potts_config"))]
pub struct PottsConfig {
    /// Box extent along each lattice axis.
    pub size: Vec<usize>,
    pub periodic: bool,
    /// Number of spin states.
    pub q: u8,
    /// Seed of the engine's random stream.
    pub seed: u64,
    pub initial_shell_depth: usize,
}

impl PottsConfig {
    /// Periodic box with seed 0 and the default shell depth.
    pub fn new(size: Vec<usize>, q: u8) -> Self {
        Self {
            size,
            periodic: true,
            q,
            seed: 0,
            initial_shell_depth: DEFAULT_SHELL_DEPTH,
        }
    }

    pub fn with_periodic(mut self, periodic: bool) -> Self {
        self.periodic = periodic;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

fn validate_sim_config(cfg: &SimConfig) -> Result<(), ValidationError> {
    if cfg.n_updates < 1 {
        return Err(ValidationError::new("n_updates must be >= 1"));
    }
    if cfg.warmup_updates > cfg.n_updates {
        return Err(ValidationError::new("warmup_updates must be <= n_updates"));
    }
    if cfg.measure_interval < 1 {
        return Err(ValidationError::new("measure_interval must be >= 1"));
    }
    Ok(())
}

/// Parameters of one Monte Carlo run.
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_sim_config"))]
pub struct SimConfig {
    pub n_updates: usize,
    pub warmup_updates: usize,
    /// Record observables every `measure_interval` updates after warm-up.
    pub measure_interval: usize,
    pub update_mode: UpdateMode,
    /// Run ensemble members on the current thread instead of the rayon pool.
    pub sequential: bool,
}
