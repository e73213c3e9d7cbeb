//! Console output: notice rendering and a terminal-backed notifier

pub mod notifier;
pub mod render;

pub use notifier::ConsoleNotifier;
pub use render::ConsoleRenderer;
