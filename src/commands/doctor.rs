//! Prerequisite checks without running the pipeline

use crate::checks::{CheckContext, Severity, create_default_runner};
use crate::core::context::ProjectContext;
use crate::core::error::{PilotError, PilotResult};
use crate::core::pipeline::InterruptFlag;
use crate::core::runner::SystemRunner;
use crate::ui::Console;

/// Run every prerequisite check and report each result
///
/// Fails when any check has error severity, after printing the full report.
pub fn run_doctor(ctx: &ProjectContext, json: bool) -> PilotResult<()> {
  let console = Console::new(json);
  let runner = SystemRunner::new().with_stdout_to_stderr(json);
  let checks = create_default_runner();

  let check_ctx = CheckContext {
    root: &ctx.root,
    config: &ctx.config,
    runner: &runner,
    console: &console,
    include_frontend: true,
    interrupt: &InterruptFlag::default(),
  };
  let results = checks.run_all(&check_ctx);
  let failed = results.iter().filter(|r| r.is_blocking()).count();

  if json {
    println!("{}", serde_json::to_string_pretty(&results)?);
  } else {
    println!("🏥 Running prerequisite checks...\n");

    println!("📋 Registered checks:");
    for check in checks.checks() {
      println!("   • {}: {}", check.name(), check.description());
    }
    println!();

    let mut has_warnings = false;
    for result in &results {
      let icon = match (result.passed, result.severity) {
        (true, _) => "✅",
        (false, Severity::Error) => "❌",
        (false, _) => "⚠️ ",
      };
      println!("{} {}: {}", icon, result.check_name, result.message);

      if !result.passed {
        if let Some(suggestion) = &result.suggestion {
          println!("   💡 Fix: {}", suggestion);
        }
        has_warnings |= result.severity == Severity::Warning;
      }
    }

    let passed = results.iter().filter(|r| r.passed).count();
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Summary: {}/{} checks passed", passed, results.len());

    if failed == 0 {
      if has_warnings {
        println!("\n⚠️  Some warnings found. The pipeline can still run.");
      } else {
        println!("\n✨ All checks passed! Ready to build.");
      }
    }
  }

  if failed > 0 {
    return Err(PilotError::Prerequisite {
      reason: format!("{} check(s) failed", failed),
    });
  }
  Ok(())
}
