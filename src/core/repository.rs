//! Coordinates of the private package index the pipeline publishes to

use crate::core::config::{InstallConfig, PilotConfig};
use crate::utils::{host_from_url, split_url};

/// Everything needed to upload to and install from one repository
#[derive(Debug, Clone)]
pub struct TargetRepository {
  /// Upload endpoint
  pub url: String,
  /// Simple index without credentials (safe to display)
  pub index_url: String,
  /// Host passed to the installer's trusted-host option
  pub trusted_host: String,
  pub package_name: String,
  username: String,
  password: String,
  install: InstallConfig,
}

impl TargetRepository {
  pub fn from_config(config: &PilotConfig) -> Self {
    let repo = &config.repository;
    Self {
      url: repo.url.clone(),
      index_url: join_index(&repo.url, &repo.index_path),
      trusted_host: host_from_url(&repo.url).to_string(),
      package_name: config.project.name.clone(),
      username: repo.username.clone(),
      password: repo.password.clone(),
      install: config.install.clone(),
    }
  }

  pub fn password(&self) -> &str {
    &self.password
  }

  /// Index URL with `user:password@` embedded for the installer
  pub fn credentialed_index_url(&self) -> String {
    let (scheme, authority, rest) = split_url(&self.index_url);
    if self.username.is_empty() {
      return self.index_url.clone();
    }
    format!("{}{}:{}@{}{}", scheme, self.username, self.password, authority, rest)
  }

  /// Exact pin for an installed version (`name==version`)
  pub fn requirement(&self, version: &str) -> String {
    format!("{}=={}", self.package_name, version)
  }

  /// Upload arguments appended after the configured upload command
  pub fn upload_args(&self, artifact: &std::path::Path) -> Vec<String> {
    vec![
      "--repository-url".to_string(),
      self.url.clone(),
      "--username".to_string(),
      self.username.clone(),
      "--password".to_string(),
      self.password.clone(),
      artifact.to_string_lossy().into_owned(),
    ]
  }

  /// Installer arguments for `version` (index, trusted host, pin)
  pub fn install_args(&self, version: &str) -> Vec<String> {
    vec![
      "--extra-index-url".to_string(),
      self.credentialed_index_url(),
      "--trusted-host".to_string(),
      self.trusted_host.clone(),
      self.requirement(version),
    ]
  }

  /// Installer argv used by install verification
  pub fn install_command(&self, version: &str) -> Vec<String> {
    let mut argv = self.install.command.clone();
    argv.extend(self.install_args(version));
    argv
  }

  /// Copy-paste install line shown in the summary
  pub fn install_hint(&self, version: &str) -> String {
    let mut argv = self.install.hint.clone();
    argv.extend(self.install_args(version));
    argv.join(" ")
  }
}

fn join_index(url: &str, index_path: &str) -> String {
  format!("{}/{}", url.trim_end_matches('/'), index_path.trim_start_matches('/'))
}
