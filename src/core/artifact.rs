//! The distributable produced by the package build
//!
//! The file on disk is the source of truth; `Artifact` only records where it
//! is and what it measured when located.

use crate::core::error::{PilotError, PilotResult, ResultExt};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
  pub path: PathBuf,
  pub name: String,
  pub size_bytes: u64,
  /// Hex SHA-256 of the file contents
  pub sha256: String,
}

impl Artifact {
  /// Inspect a file on disk
  pub fn inspect(path: &Path) -> PilotResult<Self> {
    let meta = fs::metadata(path).with_context(|| format!("Failed to stat {}", path.display()))?;
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .ok_or_else(|| PilotError::message(format!("Artifact path has no file name: {}", path.display())))?;

    Ok(Self {
      path: path.to_path_buf(),
      name,
      size_bytes: meta.len(),
      sha256: sha256_file(path)?,
    })
  }

  /// Find the artifact in `dir` matching `pattern`
  ///
  /// With several matches (stale builds left behind without `--clean`) the
  /// most recently modified file is taken.
  pub fn locate(dir: &Path, pattern: &str) -> PilotResult<Self> {
    let full = format!("{}/{}", glob::Pattern::escape(&dir.to_string_lossy()), pattern);

    let newest = glob::glob(&full)?
      .filter_map(Result::ok)
      .filter(|p| p.is_file())
      .map(|p| {
        let modified = fs::metadata(&p).and_then(|m| m.modified()).unwrap_or(SystemTime::UNIX_EPOCH);
        (modified, p)
      })
      .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    match newest {
      Some((_, path)) => Self::inspect(&path),
      None => Err(PilotError::ArtifactNotFound {
        dir: dir.to_path_buf(),
        pattern: pattern.to_string(),
      }),
    }
  }
}

fn sha256_file(path: &Path) -> PilotResult<String> {
  let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
  let mut hasher = Sha256::new();
  io::copy(&mut file, &mut hasher).with_context(|| format!("Failed to read {}", path.display()))?;
  Ok(format!("{:x}", hasher.finalize()))
}
