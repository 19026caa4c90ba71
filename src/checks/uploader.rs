//! Artifact uploader presence check (with one self-install attempt)

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::runner::ExternalCommandSpec;

/// Verifies the uploader is installed; installs it once if the probe fails
pub struct UploaderCheck;

impl Check for UploaderCheck {
  fn name(&self) -> &str {
    "uploader"
  }

  fn description(&self) -> &str {
    "Validates the artifact uploader is installed"
  }

  fn run(&self, ctx: &CheckContext) -> anyhow::Result<CheckResult> {
    let upload = &ctx.config.upload;
    let probe = ExternalCommandSpec::new(upload.probe.iter().cloned(), ctx.root);

    match ctx.runner.run(&probe, true) {
      Ok(_) => return Ok(CheckResult::pass(self.name(), "Uploader installed")),
      Err(e) => {
        tracing::debug!(probe = %probe.display(), error = %e, "uploader probe failed");
        ctx.console.warning("Uploader not installed, attempting to install it");
      }
    }

    if ctx.interrupt.is_raised() {
      return Ok(CheckResult::error(
        self.name(),
        "Interrupted, uploader self-install skipped",
        None::<String>,
      ));
    }

    let bootstrap = ExternalCommandSpec::new(upload.bootstrap.iter().cloned(), ctx.root);
    ctx.console.command(&bootstrap);
    match ctx.runner.run(&bootstrap, false) {
      Ok(_) => Ok(CheckResult::pass(self.name(), "Uploader installed (self-install)")),
      Err(e) => Ok(CheckResult::error(
        self.name(),
        format!("Uploader install failed: {}", e),
        Some(format!("Install it manually: {}", bootstrap.display())),
      )),
    }
  }
}
