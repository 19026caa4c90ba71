//! Tests for the `version` command

use crate::helpers::*;
use anyhow::Result;
use std::time::{Duration, Instant};

#[test]
fn test_version_prints_first_source() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_pkg_pilot_ok(&project.path, &["version"])?;
  assert_eq!(stdout(&output).trim(), "1.0.0");

  Ok(())
}

#[test]
fn test_version_falls_back_to_next_source() -> Result<()> {
  let project = TestProject::with_stubs(Stubs {
    version_sources: r#"[["sh", "-c", "exit 1"], ["sh", "-c", "echo v0.9.1-3-gdeadbee"]]"#,
    ..Stubs::default()
  })?;

  let output = run_pkg_pilot_ok(&project.path, &["version"])?;
  assert_eq!(stdout(&output).trim(), "v0.9.1-3-gdeadbee");

  Ok(())
}

#[test]
fn test_version_exhausted_sources_yield_unknown() -> Result<()> {
  let project = TestProject::with_stubs(Stubs {
    version_sources: r#"[["sh", "-c", "exit 1"], ["sh", "-c", "echo"]]"#,
    ..Stubs::default()
  })?;

  let output = run_pkg_pilot_ok(&project.path, &["version", "--json"])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(json["version"], "unknown");
  assert_eq!(json["resolved"], false);
  assert_eq!(json["requirement"], "demo==unknown");

  Ok(())
}

#[test]
fn test_hung_version_source_times_out_and_falls_back() -> Result<()> {
  let project = TestProject::with_stubs(Stubs {
    version_sources: r#"[["sh", "-c", "exec sleep 30"], ["sh", "-c", "echo 1.2.3"]]"#,
    ..Stubs::default()
  })?;
  let config = project.read_file("pilot.toml")?;
  project.write_file("pilot.toml", &format!("{}\n[runner]\ntimeout_secs = 1\n", config))?;

  let started = Instant::now();
  let output = run_pkg_pilot_ok(&project.path, &["version"])?;

  assert_eq!(stdout(&output).trim(), "1.2.3");
  assert!(started.elapsed() < Duration::from_secs(20));

  Ok(())
}
