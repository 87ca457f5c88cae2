pub mod crystal;
pub mod lattice;
pub mod offsets;
pub mod shells;
pub mod site;
pub mod translations;

pub use crystal::Crystal;
pub use lattice::Lattice;
pub use offsets::ShellOffsets;
pub use shells::{determine_nn_shells, Shell, SHELL_TOLERANCE};
pub use site::{Neighbor, Site};
