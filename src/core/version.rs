//! Release version resolution
//!
//! Sources are tried in order; the first one that exits zero with a non-empty
//! first line wins. When every source fails the result is [`UNKNOWN_VERSION`],
//! so resolution never blocks the pipeline.

use crate::core::runner::{CommandRunner, ExternalCommandSpec};
use std::path::{Path, PathBuf};

/// Sentinel returned when no source produced a version
pub const UNKNOWN_VERSION: &str = "unknown";

pub struct VersionResolver<'a> {
  runner: &'a dyn CommandRunner,
  root: PathBuf,
  sources: &'a [Vec<String>],
}

impl<'a> VersionResolver<'a> {
  pub fn new(runner: &'a dyn CommandRunner, root: &Path, sources: &'a [Vec<String>]) -> Self {
    Self {
      runner,
      root: root.to_path_buf(),
      sources,
    }
  }

  pub fn resolve(&self) -> String {
    for source in self.sources {
      let spec = ExternalCommandSpec::new(source.iter().cloned(), &self.root);
      match self.runner.run(&spec, true) {
        Ok(out) => match first_line(&out.stdout) {
          Some(version) => {
            tracing::debug!(source = %spec.display(), %version, "version resolved");
            return version.to_string();
          }
          None => tracing::debug!(source = %spec.display(), "empty version output, falling through"),
        },
        Err(e) => tracing::debug!(source = %spec.display(), error = %e, "version source failed, falling through"),
      }
    }

    UNKNOWN_VERSION.to_string()
  }
}

fn first_line(stdout: &str) -> Option<&str> {
  stdout.lines().map(str::trim).find(|l| !l.is_empty())
}
