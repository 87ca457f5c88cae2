pub mod energy;

pub use energy::{magnetization, site_energy, total_energy};
