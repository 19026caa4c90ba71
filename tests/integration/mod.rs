//! Integration tests driving the pkg-pilot binary
//!
//! Stub tools are `sh` scripts, so these only run on unix.

#![cfg(unix)]

mod helpers;
mod test_doctor;
mod test_init;
mod test_pipeline;
mod test_version;
