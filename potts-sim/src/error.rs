//! Error types for potts-sim.

use thiserror::Error;

/// Result type for potts-sim operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building lattice geometry or running a simulation.
#[derive(Debug, Error)]
pub enum Error {
    /// The basis matrix is degenerate, so the reciprocal lattice is undefined.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Setup is incomplete or a query falls outside the simulated box.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Neighbor distances could not be partitioned into well-formed shells.
    #[error("numeric instability: {0}")]
    NumericInstability(String),

    /// The sweep loop observed the interruption flag.
    #[error("interrupted")]
    Interrupted,
}

impl From<validator::ValidationErrors> for Error {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::Configuration(e.to_string())
    }
}
