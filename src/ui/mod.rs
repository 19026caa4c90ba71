//! Operator-facing terminal output

pub mod console;

pub use console::Console;
