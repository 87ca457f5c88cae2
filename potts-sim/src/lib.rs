pub mod config;
pub mod error;
pub mod geometry;
pub mod simulation;
pub mod statistics;

mod clusters;
mod mcmc;
mod parallel;
mod spins;

pub use config::{PottsConfig, SimConfig, UpdateMode};
pub use error::{Error, Result};
pub use geometry::{Crystal, Lattice, Neighbor, Shell, ShellOffsets, Site};
pub use simulation::{run_ensemble, run_sweep_loop, CorrelatorSample, PottsModel};
pub use statistics::SweepResult;
