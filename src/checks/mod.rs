//! Prerequisite checks run before any pipeline stage touches the workspace
//!
//! All checks implement the `Check` trait and are registered in
//! `create_default_runner()`.
//!
//! # Built-in Checks
//!
//! - **runtime-version**: the build runtime exists and meets the minimum version
//! - **uploader**: the artifact uploader is installed (self-installs once if not)
//! - **frontend-toolchain**: JS toolchain is present (warning only, frontend runs only)
//!
//! `PrerequisiteChecker` turns a runner's results into the single go/no-go
//! answer the pipeline needs: error severity blocks, warnings do not.

mod frontend;
mod runner;
mod runtime;
mod trait_def;
mod uploader;

// Re-export public API
pub use runner::{PrerequisiteChecker, create_default_runner};
pub use trait_def::{CheckContext, Severity};

// Individual checks are not exported - they're registered in create_default_runner()
