//! CLI commands for pkg-pilot
//!
//! ## Release
//! - **build**: full pipeline (frontend, package, upload, optional install check)
//! - **quick**: fast pipeline without frontend assets
//!
//! ## Setup & Inspection
//! - **doctor**: run the prerequisite checks on their own
//! - **version**: print the version the pipeline would publish
//! - **init**: write a default pilot.toml
//!
//! Everything except `init` takes the `&ProjectContext` built in main.

pub mod build;
pub mod doctor;
pub mod init;
pub mod version;

pub use build::{run_build, run_quick};
pub use doctor::run_doctor;
pub use init::run_init;
pub use version::run_version;
