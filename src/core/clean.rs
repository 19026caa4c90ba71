//! Best-effort removal of stale build output
//!
//! Cleaning never fails the pipeline: a path that cannot be removed is
//! recorded in the report and skipped.

use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};

/// What a clean pass did
#[derive(Debug, Default)]
pub struct CleanReport {
  pub removed: Vec<PathBuf>,
  pub failed: Vec<(PathBuf, String)>,
}

impl CleanReport {
  pub fn is_empty(&self) -> bool {
    self.removed.is_empty() && self.failed.is_empty()
  }
}

/// Removes build directories, caches and egg metadata from the project root
pub struct WorkspaceCleaner {
  root: PathBuf,
  patterns: Vec<String>,
  /// Extra directories removed outright (frontend build output)
  extra_dirs: Vec<PathBuf>,
}

impl WorkspaceCleaner {
  pub fn new(root: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
    Self {
      root: root.into(),
      patterns,
      extra_dirs: Vec::new(),
    }
  }

  pub fn with_extra_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.extra_dirs.push(dir.into());
    self
  }

  /// Remove every match. Idempotent: a second call finds nothing.
  pub fn clean(&self) -> CleanReport {
    let mut report = CleanReport::default();

    for target in self.matches(&mut report) {
      match remove_path(&target) {
        Ok(()) => report.removed.push(target),
        Err(e) => {
          tracing::debug!(path = %target.display(), error = %e, "cleanup skipped");
          report.failed.push((target, e.to_string()));
        }
      }
    }

    report
  }

  fn matches(&self, report: &mut CleanReport) -> Vec<PathBuf> {
    let mut targets = Vec::new();
    let escaped_root = Pattern::escape(&self.root.to_string_lossy());
    let options = MatchOptions {
      require_literal_leading_dot: false,
      ..MatchOptions::new()
    };

    for pattern in &self.patterns {
      let full = format!("{}/{}", escaped_root, pattern);
      match glob::glob_with(&full, options) {
        Ok(paths) => {
          for entry in paths {
            match entry {
              Ok(path) => push_unique(&mut targets, path),
              Err(e) => report.failed.push((e.path().to_path_buf(), e.error().to_string())),
            }
          }
        }
        Err(e) => report.failed.push((self.root.join(pattern), e.to_string())),
      }
    }

    for dir in &self.extra_dirs {
      if dir.exists() {
        push_unique(&mut targets, dir.clone());
      }
    }

    targets
  }
}

fn push_unique(targets: &mut Vec<PathBuf>, path: PathBuf) {
  if !targets.contains(&path) {
    targets.push(path);
  }
}

fn remove_path(path: &Path) -> std::io::Result<()> {
  // symlink_metadata: never follow a link out of the project
  let meta = fs::symlink_metadata(path)?;
  if meta.is_dir() {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  }
}
