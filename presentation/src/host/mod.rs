//! Line-oriented simulation host

pub mod command;
pub mod session;

pub use command::HostCommand;
pub use session::{Flow, SimulationHost};
