//! Presentation layer for denkeeper
//!
//! This crate contains CLI definitions, console rendering of notices,
//! and the simulation host that feeds chat events to the coordinator.

pub mod cli;
pub mod console;
pub mod host;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use console::{ConsoleNotifier, ConsoleRenderer};
pub use host::{Flow, HostCommand, SimulationHost};
