//! Test helpers for integration tests
//!
//! Every external tool is an `sh -c` stub declared in the project's pilot.toml.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const ARTIFACT: &str = "demo-1.0.tar.gz";

/// Stub commands for one test project; each field is a TOML array literal
pub struct Stubs {
  pub runtime_probe: &'static str,
  pub frontend_build: &'static str,
  pub package_build: &'static str,
  pub version_sources: &'static str,
  pub upload_probe: &'static str,
  pub upload_bootstrap: &'static str,
  pub upload_command: &'static str,
}

impl Default for Stubs {
  fn default() -> Self {
    Self {
      runtime_probe: r#"["sh", "-c", "echo Python 3.11.4"]"#,
      frontend_build: r#"["sh", "-c", "mkdir -p build && echo '<html></html>' > build/index.html"]"#,
      package_build: r#"["sh", "-c", "mkdir -p dist && echo assets=$NO_WEB_UI > dist/demo-1.0.tar.gz"]"#,
      version_sources: r#"[["sh", "-c", "echo 1.0.0"]]"#,
      upload_probe: r#"["sh", "-c", "true"]"#,
      upload_bootstrap: r#"["sh", "-c", "exit 1"]"#,
      upload_command: r#"["sh", "-c", "echo \"$@\" > uploaded.txt", "upload"]"#,
    }
  }
}

/// A throwaway project root with a pilot.toml pointing at stubs
pub struct TestProject {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestProject {
  /// Project with healthy stubs and a frontend directory
  pub fn new() -> Result<Self> {
    Self::with_stubs(Stubs::default())
  }

  pub fn with_stubs(stubs: Stubs) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    std::fs::create_dir_all(path.join("ui"))?;
    std::fs::write(
      path.join("pilot.toml"),
      format!(
        r#"[project]
name = "demo"

[runtime]
probe = {runtime_probe}
min_version = "3.7"

[repository]
url = "http://127.0.0.1:8081"
username = "ci"
password = "s3cret"

[frontend]
dir = "ui"
toolchain = [["sh", "-c", "echo v20.11.0"]]
install = ["sh", "-c", "true"]
build = {frontend_build}

[package]
build = {package_build}
dist_dir = "dist"
artifact_glob = "*.tar.gz"
omit_assets_env = "NO_WEB_UI"

[version]
sources = {version_sources}

[upload]
probe = {upload_probe}
bootstrap = {upload_bootstrap}
command = {upload_command}

[install]
command = ["sh", "-c", "echo \"$@\" > installed.txt", "install"]
hint = ["pip3", "install"]

[clean]
patterns = ["build", "dist", "*.egg-info"]
"#,
        runtime_probe = stubs.runtime_probe,
        frontend_build = stubs.frontend_build,
        package_build = stubs.package_build,
        version_sources = stubs.version_sources,
        upload_probe = stubs.upload_probe,
        upload_bootstrap = stubs.upload_bootstrap,
        upload_command = stubs.upload_command,
      ),
    )?;

    Ok(Self { _root: root, path })
  }

  /// Project root with nothing in it
  pub fn empty() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    Ok(Self { _root: root, path })
  }

  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let full = self.path.join(path);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(full, content)?;
    Ok(())
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Run pkg-pilot in `cwd`, whatever the exit status
pub fn run_pkg_pilot(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_pkg-pilot");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("PKG_PILOT_REPOSITORY_URL")
    .env_remove("PKG_PILOT_USERNAME")
    .env_remove("PKG_PILOT_PASSWORD")
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run pkg-pilot")
}

/// Run pkg-pilot and fail unless it exits zero
pub fn run_pkg_pilot_ok(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_pkg_pilot(cwd, args)?;

  if !output.status.success() {
    anyhow::bail!(
      "pkg-pilot command failed: pkg-pilot {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout(&output),
      stderr(&output)
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}
