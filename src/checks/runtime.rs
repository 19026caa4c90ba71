//! Host runtime version check

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::runner::ExternalCommandSpec;
use crate::utils::parse_lenient_version;
use anyhow::Context;

/// Verifies the build runtime answers its version probe with a new enough version
pub struct RuntimeVersionCheck;

impl Check for RuntimeVersionCheck {
  fn name(&self) -> &str {
    "runtime-version"
  }

  fn description(&self) -> &str {
    "Validates the build runtime meets the minimum version"
  }

  fn run(&self, ctx: &CheckContext) -> anyhow::Result<CheckResult> {
    let runtime = &ctx.config.runtime;
    let minimum = parse_lenient_version(&runtime.min_version)
      .with_context(|| format!("runtime.min_version '{}' is not a version", runtime.min_version))?;

    let spec = ExternalCommandSpec::new(runtime.probe.iter().cloned(), ctx.root);
    let output = match ctx.runner.run(&spec, true) {
      Ok(output) => output,
      Err(e) => {
        return Ok(CheckResult::error(
          self.name(),
          format!("Runtime probe `{}` failed: {}", spec.display(), e),
          Some("Install the runtime or point [runtime] probe at it in pilot.toml"),
        ));
      }
    };

    // Older interpreters print their version on stderr
    let text = format!("{}\n{}", output.stdout, output.stderr);
    let found = parse_lenient_version(&text)
      .with_context(|| format!("Unrecognized version output from `{}`: {}", spec.display(), text.trim()))?;

    if found < minimum {
      return Ok(CheckResult::error(
        self.name(),
        format!("Runtime version too old: {} (need {}+)", found, minimum),
        Some(format!("Upgrade the runtime to {} or newer", minimum)),
      ));
    }

    Ok(
      CheckResult::pass(self.name(), format!("Runtime version: {}", found))
        .with_details(serde_json::json!({ "version": found.to_string(), "minimum": minimum.to_string() })),
    )
  }
}
