//! Tests for the `doctor` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_doctor_reports_every_check() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_pkg_pilot_ok(&project.path, &["doctor"])?;
  let out = stdout(&output);

  assert!(out.contains("runtime-version"));
  assert!(out.contains("frontend-toolchain"));
  assert!(out.contains("uploader"));
  assert!(out.contains("Summary: 3/3 checks passed"));

  Ok(())
}

#[test]
fn test_doctor_json_lists_results() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_pkg_pilot_ok(&project.path, &["doctor", "--json"])?;
  let results: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  let results = results.as_array().expect("array of check results");
  assert_eq!(results.len(), 3);
  assert!(results.iter().all(|r| r["passed"] == true));

  Ok(())
}

#[test]
fn test_doctor_fails_when_uploader_cannot_be_installed() -> Result<()> {
  let project = TestProject::with_stubs(Stubs {
    upload_probe: r#"["sh", "-c", "exit 127"]"#,
    ..Stubs::default()
  })?;

  let output = run_pkg_pilot(&project.path, &["doctor"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stdout(&output).contains("Uploader install failed"));

  Ok(())
}

#[test]
fn test_doctor_succeeds_after_uploader_self_install() -> Result<()> {
  let project = TestProject::with_stubs(Stubs {
    upload_probe: r#"["sh", "-c", "exit 127"]"#,
    upload_bootstrap: r#"["sh", "-c", "true"]"#,
    ..Stubs::default()
  })?;

  let output = run_pkg_pilot_ok(&project.path, &["doctor"])?;
  assert!(stdout(&output).contains("self-install"));

  Ok(())
}
