//! Print the version the pipeline would publish

use std::time::Duration;

use crate::core::context::ProjectContext;
use crate::core::error::PilotResult;
use crate::core::runner::SystemRunner;
use crate::core::version::{UNKNOWN_VERSION, VersionResolver};

pub fn run_version(ctx: &ProjectContext, json: bool) -> PilotResult<()> {
  let runner = SystemRunner::new().with_timeout(ctx.config.runner.timeout_secs.map(Duration::from_secs));
  let version = VersionResolver::new(&runner, &ctx.root, &ctx.config.version.sources).resolve();

  if json {
    let output = serde_json::json!({
      "version": version,
      "resolved": version != UNKNOWN_VERSION,
      "requirement": ctx.target.requirement(&version),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
  } else {
    println!("{}", version);
  }

  Ok(())
}
