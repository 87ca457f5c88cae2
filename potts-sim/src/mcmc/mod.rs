pub mod sweep;

pub use sweep::{metropolis_step, propose_spin};
