//! External command execution
//!
//! Every build, upload and probe goes through [`CommandRunner`]. The pipeline
//! never runs two commands at once: each call blocks until the child exits.
//!
//! Environment handling: `ExternalCommandSpec::env == None` inherits the
//! current process environment. `Some(map)` REPLACES it entirely; callers
//! that want "ambient plus a few overrides" build the map with
//! [`ExternalCommandSpec::inherited_env_with`].

use crate::core::error::{CommandError, CommandFailure};
use crate::utils::split_url;
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const REDACTED: &str = "****";
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// One external invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommandSpec {
  pub argv: Vec<String>,
  pub working_dir: PathBuf,
  /// Full environment for the child; None inherits ours
  pub env: Option<BTreeMap<String, String>>,
  /// Values masked when the command is displayed
  redact: Vec<String>,
}

impl ExternalCommandSpec {
  pub fn new<I, S>(argv: I, working_dir: impl AsRef<Path>) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      argv: argv.into_iter().map(Into::into).collect(),
      working_dir: working_dir.as_ref().to_path_buf(),
      env: None,
      redact: Vec::new(),
    }
  }

  /// Append several arguments
  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.argv.extend(args.into_iter().map(Into::into));
    self
  }

  /// Replace the child environment
  pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
    self.env = Some(env);
    self
  }

  /// Mask `secret` wherever it appears in `display()`
  pub fn redacting(mut self, secret: impl Into<String>) -> Self {
    let secret = secret.into();
    if !secret.is_empty() {
      self.redact.push(secret);
    }
    self
  }

  /// Snapshot of the current environment with `overrides` applied
  pub fn inherited_env_with(overrides: &[(&str, &str)]) -> BTreeMap<String, String> {
    let mut env: BTreeMap<String, String> = std::env::vars().collect();
    for (key, value) in overrides {
      env.insert(key.to_string(), value.to_string());
    }
    env
  }

  pub fn program(&self) -> Option<&str> {
    self.argv.first().map(String::as_str)
  }

  /// Space-joined argv with secrets masked
  ///
  /// An argument is masked when it equals a secret, and a URL argument when
  /// the password of its `user:password@` userinfo does.
  pub fn display(&self) -> String {
    self.argv.iter().map(|arg| self.mask(arg)).collect::<Vec<_>>().join(" ")
  }

  fn mask(&self, arg: &str) -> String {
    if self.is_secret(arg) {
      return REDACTED.to_string();
    }
    let (scheme, authority, rest) = split_url(arg);
    if !scheme.is_empty()
      && let Some((userinfo, host)) = authority.rsplit_once('@')
      && let Some((user, password)) = userinfo.split_once(':')
      && self.is_secret(password)
    {
      return format!("{}{}:{}@{}{}", scheme, user, REDACTED, host, rest);
    }
    arg.to_string()
  }

  fn is_secret(&self, text: &str) -> bool {
    self.redact.iter().any(|secret| secret == text)
  }
}

/// Successful command result
///
/// `stdout`/`stderr` are empty unless output capture was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
  pub exit_code: i32,
  pub stdout: String,
  pub stderr: String,
}

/// Runs external commands to completion
pub trait CommandRunner {
  /// Run `spec`, capturing output if `capture_output`, otherwise streaming it
  fn run(&self, spec: &ExternalCommandSpec, capture_output: bool) -> Result<CommandOutcome, CommandError>;
}

/// Runner backed by `std::process`
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
  timeout: Option<Duration>,
  /// Send streamed child stdout to our stderr (keeps stdout clean for JSON)
  stdout_to_stderr: bool,
}

impl SystemRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn with_stdout_to_stderr(mut self, redirect: bool) -> Self {
    self.stdout_to_stderr = redirect;
    self
  }

  fn build_command(&self, spec: &ExternalCommandSpec, capture_output: bool) -> Result<Command, CommandError> {
    let (program, args) = spec.argv.split_first().ok_or(CommandError::EmptyArgv)?;

    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(&spec.working_dir);

    if let Some(env) = &spec.env {
      cmd.env_clear();
      cmd.envs(env);
    }

    if capture_output {
      cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    } else if self.stdout_to_stderr {
      cmd.stdout(Stdio::from(io::stderr()));
    }

    Ok(cmd)
  }
}

impl CommandRunner for SystemRunner {
  fn run(&self, spec: &ExternalCommandSpec, capture_output: bool) -> Result<CommandOutcome, CommandError> {
    let mut cmd = self.build_command(spec, capture_output)?;
    let program = spec.program().unwrap_or_default().to_string();

    tracing::debug!(
      command = %spec.display(),
      cwd = %spec.working_dir.display(),
      capture_output,
      env_replaced = spec.env.is_some(),
      "spawning"
    );

    let child = cmd.spawn().map_err(|source| CommandError::Spawn {
      program: program.clone(),
      source,
    })?;

    let (status, stdout, stderr) = match self.timeout {
      None => {
        let output = child.wait_with_output().map_err(|source| CommandError::Spawn { program, source })?;
        (output.status, output.stdout, output.stderr)
      }
      Some(limit) => wait_with_deadline(child, limit, spec, &program)?,
    };

    let stdout = String::from_utf8_lossy(&stdout).into_owned();
    let stderr = String::from_utf8_lossy(&stderr).into_owned();

    tracing::debug!(command = %spec.display(), status = ?status.code(), "exited");

    if !status.success() {
      return Err(CommandError::Failed(CommandFailure {
        command: spec.display(),
        exit_code: status.code(),
        stdout,
        stderr,
      }));
    }

    Ok(CommandOutcome {
      exit_code: status.code().unwrap_or(0),
      stdout,
      stderr,
    })
  }
}

/// Wait for `child`, killing it once `limit` has elapsed
///
/// Piped streams are drained on helper threads so a chatty child cannot
/// block on a full pipe while we poll.
fn wait_with_deadline(
  mut child: Child,
  limit: Duration,
  spec: &ExternalCommandSpec,
  program: &str,
) -> Result<(std::process::ExitStatus, Vec<u8>, Vec<u8>), CommandError> {
  let stdout_reader = child.stdout.take().map(drain);
  let stderr_reader = child.stderr.take().map(drain);
  let deadline = Instant::now() + limit;

  let status = loop {
    match child.try_wait() {
      Ok(Some(status)) => break status,
      Ok(None) if Instant::now() >= deadline => {
        tracing::debug!(command = %spec.display(), "deadline reached, killing");
        let _ = child.kill();
        let _ = child.wait();
        return Err(CommandError::TimedOut {
          command: spec.display(),
          after: limit,
        });
      }
      Ok(None) => thread::sleep(POLL_INTERVAL),
      Err(source) => {
        return Err(CommandError::Spawn {
          program: program.to_string(),
          source,
        });
      }
    }
  };

  let stdout = stdout_reader.map(join_drain).unwrap_or_default();
  let stderr = stderr_reader.map(join_drain).unwrap_or_default();
  Ok((status, stdout, stderr))
}

fn drain<R: Read + Send + 'static>(mut stream: R) -> thread::JoinHandle<Vec<u8>> {
  thread::spawn(move || {
    let mut buf = Vec::new();
    let _ = stream.read_to_end(&mut buf);
    buf
  })
}

fn join_drain(handle: thread::JoinHandle<Vec<u8>>) -> Vec<u8> {
  handle.join().unwrap_or_default()
}
