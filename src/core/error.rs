//! Error types for pkg-pilot with contextual messages and exit codes
//!
//! Every failure the pipeline can hit is categorized here. Errors carry an
//! optional help line so the operator knows what to try next.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Exit codes for pkg-pilot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// Pipeline reached `Done`
  Success = 0,
  /// Aborted pipeline, bad config, interrupt, anything else
  Failure = 1,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for pkg-pilot
#[derive(Debug)]
pub enum PilotError {
  /// Configuration errors
  Config(ConfigError),

  /// An external tool could not be run or exited non-zero
  Command(CommandError),

  /// Host environment is unusable
  Prerequisite { reason: String },

  /// Package build reported success but nothing matched on disk
  ArtifactNotFound { dir: PathBuf, pattern: String },

  /// A command succeeded but its expected output file is missing
  MissingOutput { path: PathBuf },

  /// Operator pressed Ctrl-C
  Interrupted,

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl PilotError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    PilotError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    PilotError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// Non-message variants are wrapped so the original text is kept.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      PilotError::Message { message, context, help } => PilotError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      PilotError::Interrupted => PilotError::Interrupted,
      other => {
        let help = other.help_message();
        PilotError::Message {
          message: ctx_str,
          context: Some(other.to_string()),
          help,
        }
      }
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    ExitCode::Failure
  }

  /// True when the error came from an operator interrupt
  pub fn is_interrupt(&self) -> bool {
    matches!(self, PilotError::Interrupted)
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      PilotError::Config(e) => e.help_message(),
      PilotError::Command(e) => e.help_message(),
      PilotError::Prerequisite { .. } => Some("Run `pkg-pilot doctor` to see every prerequisite check.".to_string()),
      PilotError::ArtifactNotFound { .. } => {
        Some("Check `[package] dist_dir` and `artifact_glob` in pilot.toml.".to_string())
      }
      PilotError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for PilotError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PilotError::Config(e) => write!(f, "{}", e),
      PilotError::Command(e) => write!(f, "{}", e),
      PilotError::Prerequisite { reason } => write!(f, "Prerequisites not met: {}", reason),
      PilotError::ArtifactNotFound { dir, pattern } => {
        write!(f, "No artifact matching '{}' found in {}", pattern, dir.display())
      }
      PilotError::MissingOutput { path } => write!(f, "Expected output not found: {}", path.display()),
      PilotError::Interrupted => write!(f, "Interrupted by operator"),
      PilotError::Io(e) => write!(f, "I/O error: {}", e),
      PilotError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for PilotError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      PilotError::Io(e) => Some(e),
      PilotError::Command(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for PilotError {
  fn from(err: io::Error) -> Self {
    PilotError::Io(err)
  }
}

impl From<CommandError> for PilotError {
  fn from(err: CommandError) -> Self {
    PilotError::Command(err)
  }
}

impl From<ConfigError> for PilotError {
  fn from(err: ConfigError) -> Self {
    PilotError::Config(err)
  }
}

impl From<String> for PilotError {
  fn from(msg: String) -> Self {
    PilotError::message(msg)
  }
}

impl From<&str> for PilotError {
  fn from(msg: &str) -> Self {
    PilotError::message(msg)
  }
}

impl From<toml_edit::de::Error> for PilotError {
  fn from(err: toml_edit::de::Error) -> Self {
    PilotError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for PilotError {
  fn from(err: toml_edit::ser::Error) -> Self {
    PilotError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for PilotError {
  fn from(err: serde_json::Error) -> Self {
    PilotError::message(format!("JSON error: {}", err))
  }
}

impl From<glob::PatternError> for PilotError {
  fn from(err: glob::PatternError) -> Self {
    PilotError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<anyhow::Error> for PilotError {
  fn from(err: anyhow::Error) -> Self {
    PilotError::message(err.to_string())
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicit --config path does not exist
  NotFound { path: PathBuf },

  /// A field holds an unusable value
  InvalidField { field: String, reason: String },

  /// pilot.toml already exists (init without --force)
  AlreadyExists { path: PathBuf },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Run `pkg-pilot init` to create a pilot.toml.".to_string()),
      ConfigError::InvalidField { field, .. } => Some(format!("Fix `{}` in pilot.toml.", field)),
      ConfigError::AlreadyExists { .. } => Some("Pass --force to overwrite it.".to_string()),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "Config file not found: {}", path.display()),
      ConfigError::InvalidField { field, reason } => write!(f, "Invalid config field `{}`: {}", field, reason),
      ConfigError::AlreadyExists { path } => write!(f, "Config already exists: {}", path.display()),
    }
  }
}

/// Non-zero exit from a spawned tool
#[derive(Debug, Clone)]
pub struct CommandFailure {
  pub command: String,
  /// None when the child was killed by a signal
  pub exit_code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

/// External command errors
#[derive(Debug)]
pub enum CommandError {
  /// Command spec had no program
  EmptyArgv,

  /// Program could not be started (missing binary, bad cwd)
  Spawn { program: String, source: io::Error },

  /// Program ran and exited non-zero
  Failed(CommandFailure),

  /// Program exceeded the configured timeout and was killed
  TimedOut { command: String, after: Duration },
}

impl CommandError {
  fn help_message(&self) -> Option<String> {
    match self {
      CommandError::Spawn { program, source } if source.kind() == io::ErrorKind::NotFound => {
        Some(format!("`{}` is not on PATH. Install it or adjust pilot.toml.", program))
      }
      CommandError::TimedOut { .. } => Some("Raise `[runner] timeout_secs` in pilot.toml.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for CommandError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CommandError::EmptyArgv => write!(f, "Command has no program to run"),
      CommandError::Spawn { program, source } => write!(f, "Failed to start `{}`: {}", program, source),
      CommandError::Failed(failure) => {
        match failure.exit_code {
          Some(code) => write!(f, "Command failed with exit code {}: {}", code, failure.command)?,
          None => write!(f, "Command terminated by signal: {}", failure.command)?,
        }
        if !failure.stdout.trim().is_empty() {
          write!(f, "\nstdout: {}", failure.stdout.trim())?;
        }
        if !failure.stderr.trim().is_empty() {
          write!(f, "\nstderr: {}", failure.stderr.trim())?;
        }
        Ok(())
      }
      CommandError::TimedOut { command, after } => {
        write!(f, "Command timed out after {}s: {}", after.as_secs(), command)
      }
    }
  }
}

impl std::error::Error for CommandError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      CommandError::Spawn { source, .. } => Some(source),
      _ => None,
    }
  }
}

/// Result type alias for pkg-pilot
pub type PilotResult<T> = Result<T, PilotError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> PilotResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> PilotResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<PilotError>,
{
  fn context(self, ctx: impl Into<String>) -> PilotResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> PilotResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &PilotError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
