//! Project context - build once in main, pass everywhere
//!
//! Holds the project root and the loaded configuration so no component reads
//! the ambient working directory or process-wide settings on its own.

use crate::core::config::PilotConfig;
use crate::core::error::PilotResult;
use crate::core::repository::TargetRepository;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProjectContext {
  /// Project root; every external command runs relative to it
  pub root: PathBuf,

  /// pilot.toml (or defaults) with environment overrides applied
  pub config: PilotConfig,

  /// Repository coordinates derived from `config`
  pub target: TargetRepository,
}

impl ProjectContext {
  /// Build context for a project root, loading pilot.toml
  pub fn build(root: &Path, config_path: Option<&Path>) -> PilotResult<Self> {
    let config = PilotConfig::load(root, config_path)?;
    Ok(Self::from_config(root, config))
  }

  pub fn from_config(root: &Path, config: PilotConfig) -> Self {
    let target = TargetRepository::from_config(&config);
    Self {
      root: root.to_path_buf(),
      config,
      target,
    }
  }

  /// Directory the package build drops artifacts into
  pub fn dist_dir(&self) -> PathBuf {
    self.root.join(&self.config.package.dist_dir)
  }

  /// Frontend project directory
  pub fn frontend_dir(&self) -> PathBuf {
    self.root.join(&self.config.frontend.dir)
  }
}
