//! Tests for the `init` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_init_creates_config() -> Result<()> {
  let project = TestProject::empty()?;

  run_pkg_pilot_ok(&project.path, &["init"])?;

  assert!(project.file_exists("pilot.toml"));
  let config = project.read_file("pilot.toml")?;
  assert!(config.contains("[repository]"));
  assert!(config.contains("[frontend]"));
  assert!(config.contains("xinference"));

  Ok(())
}

#[test]
fn test_init_refuses_existing_config() -> Result<()> {
  let project = TestProject::new()?;
  let before = project.read_file("pilot.toml")?;

  let output = run_pkg_pilot(&project.path, &["init"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Config already exists"));
  assert!(stderr(&output).contains("--force"));
  assert_eq!(project.read_file("pilot.toml")?, before);

  Ok(())
}

#[test]
fn test_init_force_overwrites() -> Result<()> {
  let project = TestProject::new()?;

  run_pkg_pilot_ok(&project.path, &["init", "--force"])?;

  let config = project.read_file("pilot.toml")?;
  assert!(!config.contains("name = \"demo\""));
  assert!(config.contains("xinference"));

  Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<()> {
  let project = TestProject::empty()?;
  project.write_file("pilot.toml", "[repository]\nurl = \"ftp://example.com\"\n")?;

  let output = run_pkg_pilot(&project.path, &["version"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("repository.url"));

  Ok(())
}

#[test]
fn test_explicit_config_must_exist() -> Result<()> {
  let project = TestProject::empty()?;

  let output = run_pkg_pilot(&project.path, &["--config", "missing.toml", "version"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Config file not found"));

  Ok(())
}
