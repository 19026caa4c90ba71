//! Release pipeline commands
//!
//! `build` and `quick` differ only in the `PipelineConfig` they hand to the
//! shared `StageSequencer`.

use std::time::Duration;

use crate::core::config::PipelineConfig;
use crate::core::context::ProjectContext;
use crate::core::error::PilotResult;
use crate::core::pipeline::{InterruptFlag, PipelineOutcome, StageSequencer};
use crate::core::runner::SystemRunner;
use crate::ui::Console;

/// Run the full pipeline
pub fn run_build(ctx: &ProjectContext, pipeline: PipelineConfig, json: bool, interrupt: InterruptFlag) -> PilotResult<()> {
  run_pipeline(ctx, pipeline, json, interrupt)
}

/// Run the fast pipeline: no frontend stage, assets omitted, no install check
pub fn run_quick(ctx: &ProjectContext, clean: bool, skip_upload: bool, json: bool, interrupt: InterruptFlag) -> PilotResult<()> {
  run_pipeline(ctx, PipelineConfig::fast(clean, skip_upload), json, interrupt)
}

fn run_pipeline(ctx: &ProjectContext, pipeline: PipelineConfig, json: bool, interrupt: InterruptFlag) -> PilotResult<()> {
  let console = Console::new(json);
  let runner = SystemRunner::new()
    .with_timeout(ctx.config.runner.timeout_secs.map(Duration::from_secs))
    .with_stdout_to_stderr(json);

  tracing::debug!(?pipeline, root = %ctx.root.display(), "starting pipeline");

  let report = StageSequencer::new(ctx, pipeline, &runner, &console)
    .with_interrupt(interrupt)
    .run();

  tracing::debug!(
    exit_code = report.exit_code().as_i32(),
    elapsed_ms = report.elapsed.as_millis() as u64,
    "pipeline finished"
  );

  if json {
    println!("{}", serde_json::to_string_pretty(&report.to_json())?);
  } else if let Some(summary) = report.summary() {
    console.line("");
    console.line(summary);
    console.line(format_args!("\n⏱️  Total time: {:.1}s", report.elapsed.as_secs_f64()));
  }

  match report.outcome {
    PipelineOutcome::Done(_) => Ok(()),
    PipelineOutcome::Aborted(abort) => {
      if abort.error.is_interrupt() {
        console.warning(&format!("Interrupted during {}, nothing is rolled back", abort.stage));
      } else {
        console.error(&format!("Pipeline aborted during {}", abort.stage));
      }
      Err(abort.error)
    }
  }
}
