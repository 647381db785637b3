//! CLI-specific output implementations

pub mod console;

pub use console::ConsoleOutput;
