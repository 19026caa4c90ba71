//! Frontend toolchain check (soft prerequisite)

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::runner::ExternalCommandSpec;

/// Reports JS toolchain versions; a missing tool is only a warning because
/// the frontend build can be skipped or forced past.
pub struct FrontendToolchainCheck;

impl Check for FrontendToolchainCheck {
  fn name(&self) -> &str {
    "frontend-toolchain"
  }

  fn description(&self) -> &str {
    "Detects the frontend build toolchain"
  }

  fn applies(&self, ctx: &CheckContext) -> bool {
    ctx.include_frontend
  }

  fn run(&self, ctx: &CheckContext) -> anyhow::Result<CheckResult> {
    let mut found = Vec::new();
    let mut missing = Vec::new();

    for probe in &ctx.config.frontend.toolchain {
      let spec = ExternalCommandSpec::new(probe.iter().cloned(), ctx.root);
      let tool = spec.program().unwrap_or_default().to_string();
      match ctx.runner.run(&spec, true) {
        Ok(out) => found.push(format!("{} {}", tool, out.stdout.trim())),
        Err(e) => {
          tracing::debug!(%tool, error = %e, "toolchain probe failed");
          missing.push(tool);
        }
      }
    }

    if !missing.is_empty() {
      return Ok(CheckResult::warning(
        self.name(),
        format!("Frontend toolchain missing ({}), frontend build may fail", missing.join(", ")),
        Some("Install the toolchain, or pass --skip-ui"),
      ));
    }

    if found.is_empty() {
      return Ok(CheckResult::pass(self.name(), "No frontend toolchain probes configured"));
    }

    Ok(CheckResult::pass(self.name(), format!("Frontend toolchain: {}", found.join(", "))))
  }
}
