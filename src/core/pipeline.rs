//! Release pipeline sequencing
//!
//! # Stages
//!
//! ```text
//! Checking -> [Cleaning] -> [BuildingFrontend] -> BuildingPackage -> ResolvingVersion
//!          -> [Uploading] -> [VerifyingInstall] -> Summarizing -> Done
//! ```
//!
//! Bracketed stages are entered only when the `PipelineConfig` asks for them.
//! Any stage may abort the run; an aborted run executes nothing further and
//! prints no summary. There are no retries. The only tolerated failure is a
//! frontend build failure under `force`.
//!
//! The full and fast variants share this sequencer; the fast variant is just a
//! `PipelineConfig` with the frontend skipped.

use crate::checks::{CheckContext, PrerequisiteChecker};
use crate::core::artifact::Artifact;
use crate::core::clean::WorkspaceCleaner;
use crate::core::config::{PipelineConfig, PipelineVariant};
use crate::core::context::ProjectContext;
use crate::core::error::{CommandError, ExitCode, PilotError, PilotResult};
use crate::core::runner::{CommandOutcome, CommandRunner, ExternalCommandSpec};
use crate::core::summary::{RenderedSummary, SummaryReporter};
use crate::core::version::VersionResolver;
use crate::ui::Console;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// One ordered unit of pipeline work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
  Checking,
  Cleaning,
  BuildingFrontend,
  BuildingPackage,
  ResolvingVersion,
  Uploading,
  VerifyingInstall,
  Summarizing,
}

impl Stage {
  pub fn label(&self) -> &'static str {
    match self {
      Stage::Checking => "prerequisite check",
      Stage::Cleaning => "clean",
      Stage::BuildingFrontend => "frontend build",
      Stage::BuildingPackage => "package build",
      Stage::ResolvingVersion => "version resolution",
      Stage::Uploading => "upload",
      Stage::VerifyingInstall => "install verification",
      Stage::Summarizing => "summary",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
  Success,
  Failed,
  Skipped,
}

/// Outcome of one stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResult {
  pub status: StageStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub artifact: Option<Artifact>,
}

impl StageResult {
  pub fn success() -> Self {
    Self {
      status: StageStatus::Success,
      error: None,
      artifact: None,
    }
  }

  pub fn skipped() -> Self {
    Self {
      status: StageStatus::Skipped,
      error: None,
      artifact: None,
    }
  }

  pub fn failed(error: impl fmt::Display) -> Self {
    Self {
      status: StageStatus::Failed,
      error: Some(error.to_string()),
      artifact: None,
    }
  }

  pub fn with_artifact(mut self, artifact: Artifact) -> Self {
    self.artifact = Some(artifact);
    self
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
  pub stage: Stage,
  #[serde(flatten)]
  pub result: StageResult,
}

/// Why and where a run stopped
#[derive(Debug)]
pub struct StageAbort {
  pub stage: Stage,
  pub error: PilotError,
}

impl fmt::Display for StageAbort {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Pipeline aborted during {}: {}", self.stage, self.error)
  }
}

#[derive(Debug)]
pub enum PipelineOutcome {
  Done(RenderedSummary),
  Aborted(StageAbort),
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct PipelineReport {
  pub variant: PipelineVariant,
  pub outcome: PipelineOutcome,
  pub stages: Vec<StageRecord>,
  pub elapsed: Duration,
  pub finished_at: DateTime<Utc>,
}

impl PipelineReport {
  pub fn is_done(&self) -> bool {
    matches!(self.outcome, PipelineOutcome::Done(_))
  }

  pub fn exit_code(&self) -> ExitCode {
    if self.is_done() { ExitCode::Success } else { ExitCode::Failure }
  }

  /// Whether `stage` was entered (succeeded or failed, not skipped)
  #[cfg(test)]
  pub fn executed(&self, stage: Stage) -> bool {
    self.record(stage).is_some_and(|r| r.result.status != StageStatus::Skipped)
  }

  #[cfg(test)]
  pub fn record(&self, stage: Stage) -> Option<&StageRecord> {
    self.stages.iter().find(|r| r.stage == stage)
  }

  pub fn summary(&self) -> Option<&RenderedSummary> {
    match &self.outcome {
      PipelineOutcome::Done(summary) => Some(summary),
      PipelineOutcome::Aborted(_) => None,
    }
  }

  /// Machine-readable report; aborted runs carry no summary
  pub fn to_json(&self) -> serde_json::Value {
    let elapsed_secs = (self.elapsed.as_secs_f64() * 10.0).round() / 10.0;
    match &self.outcome {
      PipelineOutcome::Done(summary) => serde_json::json!({
        "status": "done",
        "variant": self.variant,
        "elapsed_secs": elapsed_secs,
        "finished_at": self.finished_at.to_rfc3339(),
        "summary": summary,
        "stages": self.stages,
      }),
      PipelineOutcome::Aborted(abort) => serde_json::json!({
        "status": "aborted",
        "variant": self.variant,
        "stage": abort.stage,
        "error": abort.error.to_string(),
        "elapsed_secs": elapsed_secs,
        "finished_at": self.finished_at.to_rfc3339(),
        "stages": self.stages,
      }),
    }
  }
}

/// Set from the Ctrl-C handler, polled between stages
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
  pub fn raise(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  pub fn is_raised(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}

/// Runs the pipeline stages in order for one `PipelineConfig`
pub struct StageSequencer<'a> {
  ctx: &'a ProjectContext,
  pipeline: PipelineConfig,
  runner: &'a dyn CommandRunner,
  console: &'a Console,
  checker: PrerequisiteChecker,
  interrupt: InterruptFlag,
  records: Vec<StageRecord>,
}

impl<'a> StageSequencer<'a> {
  pub fn new(
    ctx: &'a ProjectContext,
    pipeline: PipelineConfig,
    runner: &'a dyn CommandRunner,
    console: &'a Console,
  ) -> Self {
    Self {
      ctx,
      pipeline,
      runner,
      console,
      checker: PrerequisiteChecker::default(),
      interrupt: InterruptFlag::default(),
      records: Vec::new(),
    }
  }

  pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
    self.interrupt = interrupt;
    self
  }

  /// Run every stage; consumes the sequencer
  pub fn run(mut self) -> PipelineReport {
    let started = Instant::now();
    let outcome = match self.drive() {
      Ok(summary) => PipelineOutcome::Done(summary),
      Err(abort) => {
        tracing::debug!(%abort, "pipeline aborted");
        PipelineOutcome::Aborted(abort)
      }
    };

    PipelineReport {
      variant: self.pipeline.variant,
      outcome,
      stages: self.records,
      elapsed: started.elapsed(),
      finished_at: Utc::now(),
    }
  }

  fn drive(&mut self) -> Result<RenderedSummary, StageAbort> {
    let p = self.pipeline;
    self.console.banner(match p.variant {
      PipelineVariant::Full => "🚀 pkg-pilot: build and upload",
      PipelineVariant::Fast => "⚡ pkg-pilot: quick build (frontend skipped)",
    });

    // Checking
    self.enter(Stage::Checking)?;
    self.console.step("check", "Prerequisites");
    if !self.check_prerequisites() {
      return Err(self.abort(
        Stage::Checking,
        PilotError::Prerequisite {
          reason: "one or more required checks failed".to_string(),
        },
      ));
    }
    self.record(Stage::Checking, StageResult::success());

    // Cleaning: best effort, never aborts
    if p.clean {
      self.enter(Stage::Cleaning)?;
      self.console.step("clean", "Build output");
      self.clean();
      self.record(Stage::Cleaning, StageResult::success());
    } else {
      self.record(Stage::Cleaning, StageResult::skipped());
    }

    // BuildingFrontend
    let mut frontend_failed = false;
    if p.skip_frontend_build {
      if p.variant == PipelineVariant::Full {
        self.console.step("skip", "Web UI build");
      }
      self.record(Stage::BuildingFrontend, StageResult::skipped());
    } else {
      self.enter(Stage::BuildingFrontend)?;
      self.console.step("build", "Web UI");
      match self.build_frontend() {
        Ok(()) => {
          self.console.success("Web UI built");
          self.record(Stage::BuildingFrontend, StageResult::success());
        }
        Err(e) if p.force && !self.interrupt.is_raised() => {
          self.console.error(&format!("Web UI build failed: {}", e));
          self.console.warning("--force given, continuing without a fresh Web UI build");
          self.record(Stage::BuildingFrontend, StageResult::failed(&e));
          frontend_failed = true;
        }
        Err(e) => return Err(self.abort(Stage::BuildingFrontend, e)),
      }
    }

    // BuildingPackage
    self.enter(Stage::BuildingPackage)?;
    self.console.step("build", "Package");
    let artifact = match self.build_package() {
      Ok(artifact) => artifact,
      Err(e) => return Err(self.abort(Stage::BuildingPackage, e)),
    };
    self.console.success(&format!("Package built: {}", artifact.name));
    self.record(
      Stage::BuildingPackage,
      StageResult::success().with_artifact(artifact.clone()),
    );

    // ResolvingVersion: cannot fail, resolved once for the rest of the run
    self.enter(Stage::ResolvingVersion)?;
    let version = VersionResolver::new(self.runner, &self.ctx.root, &self.ctx.config.version.sources).resolve();
    self.console.success(&format!("Version: {}", version));
    self.record(Stage::ResolvingVersion, StageResult::success());

    // Uploading
    if p.skip_upload {
      self.console.step("skip", "Upload");
      self.record(Stage::Uploading, StageResult::skipped());
    } else {
      self.enter(Stage::Uploading)?;
      self.console.step("upload", "Private repository");
      if let Err(e) = self.upload(&artifact) {
        return Err(self.abort(Stage::Uploading, e));
      }
      self.console.success("Upload succeeded");
      self.record(Stage::Uploading, StageResult::success());
    }

    // VerifyingInstall
    if p.verify_install {
      self.enter(Stage::VerifyingInstall)?;
      self.console.step("test", "Install from repository");
      if let Err(e) = self.verify_install(&version) {
        return Err(self.abort(Stage::VerifyingInstall, e));
      }
      self.console.success("Install verified");
      self.record(Stage::VerifyingInstall, StageResult::success());
    } else {
      self.record(Stage::VerifyingInstall, StageResult::skipped());
    }

    // Summarizing
    self.enter(Stage::Summarizing)?;
    let mut summary = SummaryReporter::new(&self.ctx.target)
      .report(&artifact, &version)
      .with_uploaded(!p.skip_upload);
    if !p.embed_frontend_assets() {
      summary = summary.with_note("frontend assets were not embedded in this build");
    } else if frontend_failed {
      summary = summary.with_note("frontend build failed; package may carry stale or no frontend assets");
    }
    if p.skip_upload {
      summary = summary.with_note("upload skipped, nothing was published");
    }
    self.record(Stage::Summarizing, StageResult::success().with_artifact(artifact));

    Ok(summary)
  }

  /// Gate every stage on the interrupt flag
  fn enter(&mut self, stage: Stage) -> Result<(), StageAbort> {
    if self.interrupt.is_raised() {
      return Err(self.abort(stage, PilotError::Interrupted));
    }
    tracing::debug!(?stage, "entering stage");
    Ok(())
  }

  fn record(&mut self, stage: Stage, result: StageResult) {
    self.records.push(StageRecord { stage, result });
  }

  /// Record the failing stage; an interrupt outranks whatever the stage saw
  fn abort(&mut self, stage: Stage, error: PilotError) -> StageAbort {
    let error = if self.interrupt.is_raised() {
      PilotError::Interrupted
    } else {
      error
    };
    self.record(stage, StageResult::failed(&error));
    StageAbort { stage, error }
  }

  /// Echo and stream a command
  fn exec(&self, spec: &ExternalCommandSpec) -> Result<CommandOutcome, CommandError> {
    self.console.command(spec);
    self.runner.run(spec, false)
  }

  fn check_prerequisites(&self) -> bool {
    let ctx = CheckContext {
      root: &self.ctx.root,
      config: &self.ctx.config,
      runner: self.runner,
      console: self.console,
      include_frontend: !self.pipeline.skip_frontend_build,
      interrupt: &self.interrupt,
    };
    self.checker.check(&ctx)
  }

  fn clean(&self) {
    let config = &self.ctx.config;
    let report = WorkspaceCleaner::new(&self.ctx.root, config.clean.patterns.clone())
      .with_extra_dir(config.frontend.output_path(&self.ctx.root))
      .clean();

    for path in &report.removed {
      self.console.success(&format!("Removed {}", path.display()));
    }
    for (path, reason) in &report.failed {
      self.console.warning(&format!("Could not remove {}: {}", path.display(), reason));
    }
    if report.is_empty() {
      self.console.success("Nothing to clean");
    }
  }

  fn build_frontend(&self) -> PilotResult<()> {
    let frontend = &self.ctx.config.frontend;
    let dir = self.ctx.frontend_dir();
    if !dir.is_dir() {
      return Err(PilotError::with_help(
        format!("Frontend directory not found: {}", dir.display()),
        "Set [frontend] dir in pilot.toml, or pass --skip-ui",
      ));
    }

    self.console.step("ui", "Install dependencies");
    self.exec(&ExternalCommandSpec::new(frontend.install.iter().cloned(), &dir))?;

    self.console.step("ui", "Production build");
    self.exec(&ExternalCommandSpec::new(frontend.build.iter().cloned(), &dir))?;

    let entry = frontend.entry_path(&self.ctx.root);
    if !entry.is_file() {
      return Err(PilotError::MissingOutput { path: entry });
    }
    Ok(())
  }

  fn build_package(&self) -> PilotResult<Artifact> {
    let package = &self.ctx.config.package;
    let omit = if self.pipeline.embed_frontend_assets() { "0" } else { "1" };
    let env = ExternalCommandSpec::inherited_env_with(&[(package.omit_assets_env.as_str(), omit)]);
    let spec = ExternalCommandSpec::new(package.build.iter().cloned(), &self.ctx.root).with_env(env);

    tracing::debug!(var = %package.omit_assets_env, value = omit, "frontend assets flag");
    self.exec(&spec)?;

    Artifact::locate(&self.ctx.dist_dir(), &package.artifact_glob)
  }

  fn upload(&self, artifact: &Artifact) -> PilotResult<()> {
    let target = &self.ctx.target;
    let spec = ExternalCommandSpec::new(self.ctx.config.upload.command.iter().cloned(), &self.ctx.root)
      .args(target.upload_args(&artifact.path))
      .redacting(target.password());
    self.exec(&spec)?;
    Ok(())
  }

  fn verify_install(&self, version: &str) -> PilotResult<()> {
    let target = &self.ctx.target;
    let spec = ExternalCommandSpec::new(target.install_command(version), &self.ctx.root).redacting(target.password());
    self.exec(&spec)?;
    Ok(())
  }
}
