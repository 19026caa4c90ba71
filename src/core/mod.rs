//! Core engine for pkg-pilot
//!
//! - **artifact**: the built distributable (location, size, checksum)
//! - **clean**: removal of previous build output
//! - **config**: project settings (pilot.toml) and per-run pipeline flags
//! - **context**: project root + config, built once in main
//! - **error**: error types with contextual help messages
//! - **pipeline**: the stage sequencer driving a release run
//! - **repository**: upload target and install coordinates
//! - **runner**: external command execution
//! - **summary**: final report formatting
//! - **version**: release version fallback chain

pub mod artifact;
pub mod clean;
pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod repository;
pub mod runner;
pub mod summary;
pub mod version;

#[cfg(test)]
pub mod testing;
