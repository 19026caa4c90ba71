//! Check runner and the pipeline's prerequisite gate

use super::trait_def::{Check, CheckContext, CheckResult, Severity};

/// Check runner that executes multiple checks
pub struct CheckRunner {
  checks: Vec<Box<dyn Check>>,
}

impl CheckRunner {
  /// Create a new check runner
  pub fn new() -> Self {
    Self { checks: Vec::new() }
  }

  /// Add a check to the runner
  pub fn add_check(&mut self, check: Box<dyn Check>) {
    self.checks.push(check);
  }

  /// Run all applicable checks and collect results
  pub fn run_all(&self, ctx: &CheckContext) -> Vec<CheckResult> {
    let mut results = Vec::new();

    for check in &self.checks {
      if ctx.interrupt.is_raised() {
        // Blocking, so the gate says no-go and nothing further runs
        results.push(CheckResult::error(
          check.name(),
          "Interrupted, remaining checks skipped",
          None::<String>,
        ));
        break;
      }

      if !check.applies(ctx) {
        tracing::debug!(check = check.name(), "not applicable, skipped");
        continue;
      }

      match check.run(ctx) {
        Ok(result) => results.push(result),
        Err(err) => {
          // A check that cannot reach a verdict blocks
          results.push(CheckResult::error(
            check.name(),
            format!("Check failed to run: {:#}", err),
            Some("Run with -v for command diagnostics"),
          ));
        }
      }
    }

    results
  }

  /// Get all registered checks
  pub fn checks(&self) -> &[Box<dyn Check>] {
    &self.checks
  }
}

impl Default for CheckRunner {
  fn default() -> Self {
    Self::new()
  }
}

/// Create a runner with all built-in checks
pub fn create_default_runner() -> CheckRunner {
  let mut runner = CheckRunner::new();

  runner.add_check(Box::new(super::runtime::RuntimeVersionCheck));
  runner.add_check(Box::new(super::frontend::FrontendToolchainCheck));
  runner.add_check(Box::new(super::uploader::UploaderCheck));

  runner
}

/// Go/no-go gate in front of the pipeline
pub struct PrerequisiteChecker {
  runner: CheckRunner,
}

impl PrerequisiteChecker {
  pub fn new(runner: CheckRunner) -> Self {
    Self { runner }
  }

  /// Run every check, report each result, and answer whether the pipeline may proceed
  ///
  /// Returns false (never errors) when any result has error severity.
  pub fn check(&self, ctx: &CheckContext) -> bool {
    let results = self.runner.run_all(ctx);

    for result in &results {
      match (result.passed, result.severity) {
        (true, _) | (false, Severity::Info) => ctx.console.success(&result.message),
        (false, Severity::Warning) => ctx.console.warning(&result.message),
        (false, Severity::Error) => {
          ctx.console.error(&result.message);
          if let Some(suggestion) = &result.suggestion {
            ctx.console.line(format!("  💡 Fix: {}", suggestion));
          }
        }
      }
    }

    !results.iter().any(CheckResult::is_blocking)
  }
}

impl Default for PrerequisiteChecker {
  fn default() -> Self {
    Self::new(create_default_runner())
  }
}
