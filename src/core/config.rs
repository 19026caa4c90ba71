//! Project configuration (pilot.toml) and per-run pipeline flags
//!
//! `PilotConfig` holds everything that used to be hard-coded in the operator
//! scripts: repository coordinates, credentials, tool invocations and paths.
//! It is loaded once per process and passed by reference to every component.
//!
//! `PipelineConfig` is the immutable set of CLI flags for one pipeline run.

use crate::core::error::{ConfigError, PilotError, PilotResult, ResultExt};
use crate::utils::parse_lenient_version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, written by `pkg-pilot init`
pub const CONFIG_FILE_NAME: &str = "pilot.toml";

/// Environment variables that override `[repository]` after load
pub const ENV_REPOSITORY_URL: &str = "PKG_PILOT_REPOSITORY_URL";
pub const ENV_USERNAME: &str = "PKG_PILOT_USERNAME";
pub const ENV_PASSWORD: &str = "PKG_PILOT_PASSWORD";

fn argv(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

/// Configuration for pkg-pilot
/// Searched in order: pilot.toml, .pilot.toml, .config/pilot.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
  pub project: ProjectConfig,
  pub runtime: RuntimeConfig,
  pub repository: RepositoryConfig,
  pub frontend: FrontendConfig,
  pub package: PackageConfig,
  pub version: VersionConfig,
  pub upload: UploadConfig,
  pub install: InstallConfig,
  pub clean: CleanConfig,
  pub runner: RunnerConfig,

  /// File the config was read from (None = built-in defaults)
  #[serde(skip)]
  pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
  /// Distribution name used for the install pin (`name==version`)
  pub name: String,
}

impl Default for ProjectConfig {
  fn default() -> Self {
    Self {
      name: "xinference".to_string(),
    }
  }
}

/// Host language runtime the build tools run on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
  /// Command printing the runtime version (e.g. `Python 3.11.4`)
  pub probe: Vec<String>,
  /// Lowest acceptable version; `3.7` and `3.7.0` are equivalent
  pub min_version: String,
}

impl Default for RuntimeConfig {
  fn default() -> Self {
    Self {
      probe: argv(&["python3", "--version"]),
      min_version: "3.7.0".to_string(),
    }
  }
}

/// Private package repository that receives uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
  /// Upload URL, scheme included (`http://host:port`)
  pub url: String,
  pub username: String,
  pub password: String,
  /// Path of the simple index below `url`
  pub index_path: String,
}

impl Default for RepositoryConfig {
  fn default() -> Self {
    Self {
      url: "http://192.2.123.34:8081".to_string(),
      username: "admin".to_string(),
      password: "admin123".to_string(),
      index_path: "simple/".to_string(),
    }
  }
}

/// Web UI bundled into the package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
  /// Frontend project directory (relative to project root)
  pub dir: PathBuf,
  /// Version probes for the JS toolchain; failures only warn
  pub toolchain: Vec<Vec<String>>,
  pub install: Vec<String>,
  pub build: Vec<String>,
  /// Build output directory (relative to `dir`), also removed by `--clean`
  pub output_dir: PathBuf,
  /// File inside `output_dir` proving a successful build
  pub entry: PathBuf,
}

impl Default for FrontendConfig {
  fn default() -> Self {
    Self {
      dir: PathBuf::from("xinference/ui/web/ui"),
      toolchain: vec![argv(&["node", "--version"]), argv(&["npm", "--version"])],
      install: argv(&["npm", "install"]),
      build: argv(&["npm", "run", "build"]),
      output_dir: PathBuf::from("build"),
      entry: PathBuf::from("index.html"),
    }
  }
}

impl FrontendConfig {
  /// Absolute path to the build output directory
  pub fn output_path(&self, root: &Path) -> PathBuf {
    root.join(&self.dir).join(&self.output_dir)
  }

  /// Absolute path to the entry file checked after the build
  pub fn entry_path(&self, root: &Path) -> PathBuf {
    self.output_path(root).join(&self.entry)
  }
}

/// Distributable package build
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
  pub build: Vec<String>,
  /// Where the build tool drops the artifact (relative to project root)
  pub dist_dir: PathBuf,
  pub artifact_glob: String,
  /// Env var read by the build tool: "0" embeds frontend assets, "1" omits them
  pub omit_assets_env: String,
}

impl Default for PackageConfig {
  fn default() -> Self {
    Self {
      build: argv(&["python3", "setup.py", "sdist"]),
      dist_dir: PathBuf::from("dist"),
      artifact_glob: "*.tar.gz".to_string(),
      omit_assets_env: "NO_WEB_UI".to_string(),
    }
  }
}

/// Version resolution chain, tried in order before falling back to "unknown"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionConfig {
  pub sources: Vec<Vec<String>>,
}

impl Default for VersionConfig {
  fn default() -> Self {
    Self {
      sources: vec![
        argv(&["python3", "versioneer.py", "version"]),
        argv(&["git", "describe", "--tags", "--always"]),
      ],
    }
  }
}

/// Artifact uploader
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
  /// Succeeds when the uploader is installed
  pub probe: Vec<String>,
  /// One-shot self-install when the probe fails
  pub bootstrap: Vec<String>,
  /// Upload command; repository flags and the artifact path are appended
  pub command: Vec<String>,
}

impl Default for UploadConfig {
  fn default() -> Self {
    Self {
      probe: argv(&["python3", "-m", "twine", "--version"]),
      bootstrap: argv(&["python3", "-m", "pip", "install", "twine"]),
      command: argv(&["python3", "-m", "twine", "upload"]),
    }
  }
}

/// Package installer used by `--test` and shown in the summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
  pub command: Vec<String>,
  /// Installer prefix printed in the copy-paste install line
  pub hint: Vec<String>,
}

impl Default for InstallConfig {
  fn default() -> Self {
    Self {
      command: argv(&["python3", "-m", "pip", "install"]),
      hint: argv(&["pip3", "install"]),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
  /// Glob patterns relative to the project root
  pub patterns: Vec<String>,
}

impl Default for CleanConfig {
  fn default() -> Self {
    Self {
      patterns: argv(&["build", "dist", "*.egg-info", "__pycache__", ".pytest_cache"]),
    }
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
  /// Kill external commands running longer than this
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timeout_secs: Option<u64>,
}

impl PilotConfig {
  /// Find config file in search order: pilot.toml, .pilot.toml, .config/pilot.toml
  pub fn find_config_path(root: &Path) -> Option<PathBuf> {
    let candidates = vec![
      root.join(CONFIG_FILE_NAME),
      root.join(".pilot.toml"),
      root.join(".config").join(CONFIG_FILE_NAME),
    ];

    candidates.into_iter().find(|p| p.is_file())
  }

  /// Load config for a project root
  ///
  /// An explicit path must exist. Without one, the search order is tried and
  /// built-in defaults are used when nothing is found.
  pub fn load(root: &Path, explicit: Option<&Path>) -> PilotResult<Self> {
    let path = match explicit {
      Some(p) => {
        let p = if p.is_absolute() { p.to_path_buf() } else { root.join(p) };
        if !p.is_file() {
          return Err(ConfigError::NotFound { path: p }.into());
        }
        Some(p)
      }
      None => Self::find_config_path(root),
    };

    let mut config = match &path {
      Some(p) => Self::from_file(p)?,
      None => {
        tracing::debug!("no pilot.toml under {}, using defaults", root.display());
        Self::default()
      }
    };

    config.apply_env_overrides(|key| std::env::var(key).ok());
    config
      .validate()
      .with_context(|| match &path {
        Some(p) => format!("Invalid configuration in {}", p.display()),
        None => "Invalid built-in configuration".to_string(),
      })?;

    Ok(config)
  }

  fn from_file(path: &Path) -> PilotResult<Self> {
    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read config from {}", path.display()))?;
    let mut config: PilotConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", path.display()))?;
    config.source = Some(path.to_path_buf());
    Ok(config)
  }

  /// Replace repository fields with values from the environment
  pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_REPOSITORY_URL) {
      self.repository.url = url;
    }
    if let Some(user) = lookup(ENV_USERNAME) {
      self.repository.username = user;
    }
    if let Some(pass) = lookup(ENV_PASSWORD) {
      self.repository.password = pass;
    }
  }

  /// Validate configuration values
  pub fn validate(&self) -> PilotResult<()> {
    require_argv("runtime.probe", &self.runtime.probe)?;
    require_argv("frontend.install", &self.frontend.install)?;
    require_argv("frontend.build", &self.frontend.build)?;
    require_argv("package.build", &self.package.build)?;
    require_argv("upload.probe", &self.upload.probe)?;
    require_argv("upload.bootstrap", &self.upload.bootstrap)?;
    require_argv("upload.command", &self.upload.command)?;
    require_argv("install.command", &self.install.command)?;
    require_argv("install.hint", &self.install.hint)?;
    for (i, probe) in self.frontend.toolchain.iter().enumerate() {
      require_argv(&format!("frontend.toolchain[{}]", i), probe)?;
    }
    for (i, source) in self.version.sources.iter().enumerate() {
      require_argv(&format!("version.sources[{}]", i), source)?;
    }

    if parse_lenient_version(&self.runtime.min_version).is_none() {
      return Err(invalid(
        "runtime.min_version",
        format!("'{}' is not a version (e.g. '3.7.0')", self.runtime.min_version),
      ));
    }

    let url = &self.repository.url;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
      return Err(invalid(
        "repository.url",
        format!("'{}' must start with http:// or https://", url),
      ));
    }

    if self.project.name.trim().is_empty() {
      return Err(invalid("project.name", "must not be empty"));
    }

    glob::Pattern::new(&self.package.artifact_glob)
      .map_err(|e| invalid("package.artifact_glob", e.to_string()))?;
    for pattern in &self.clean.patterns {
      glob::Pattern::new(pattern).map_err(|e| invalid("clean.patterns", e.to_string()))?;
    }

    Ok(())
  }

  /// Save config to pilot.toml in `root`
  pub fn save(&self, root: &Path) -> PilotResult<PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(config_path)
  }
}

fn require_argv(field: &str, argv: &[String]) -> PilotResult<()> {
  match argv.first() {
    Some(program) if !program.trim().is_empty() => Ok(()),
    _ => Err(invalid(field, "command must name a program")),
  }
}

fn invalid(field: &str, reason: impl Into<String>) -> PilotError {
  ConfigError::InvalidField {
    field: field.to_string(),
    reason: reason.into(),
  }
  .into()
}

/// Which pipeline the operator asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineVariant {
  /// Frontend build, package, upload, optional install check
  Full,
  /// Package without frontend assets, optional upload
  Fast,
}

/// Flags for one pipeline run. Built once from the CLI, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
  pub variant: PipelineVariant,
  pub clean: bool,
  pub skip_frontend_build: bool,
  pub skip_upload: bool,
  pub verify_install: bool,
  /// Continue past a failed frontend build (and nothing else)
  pub force: bool,
}

impl PipelineConfig {
  /// Reduced pipeline: the frontend stage is never entered and assets are omitted
  pub fn fast(clean: bool, skip_upload: bool) -> Self {
    Self {
      variant: PipelineVariant::Fast,
      clean,
      skip_frontend_build: true,
      skip_upload,
      verify_install: false,
      force: false,
    }
  }

  /// Value of the assets flag handed to the package build
  pub fn embed_frontend_assets(&self) -> bool {
    !self.skip_frontend_build
  }
}
