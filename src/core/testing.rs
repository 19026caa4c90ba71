//! Scripted command runner for unit tests

use crate::core::error::{CommandError, CommandFailure};
use crate::core::runner::{CommandOutcome, CommandRunner, ExternalCommandSpec};
use std::cell::RefCell;
use std::io;

type Effect = Box<dyn Fn(&ExternalCommandSpec)>;

enum Reply {
  Ok(String),
  Fail(i32),
  Missing,
}

struct Rule {
  prefix: Vec<String>,
  reply: Reply,
  effect: Option<Effect>,
}

/// Answers commands by argv prefix; the most recently added matching rule wins.
/// Unmatched commands fail as if the program were not installed.
#[derive(Default)]
pub struct ScriptedRunner {
  rules: Vec<Rule>,
  calls: RefCell<Vec<ExternalCommandSpec>>,
}

fn prefix(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

impl ScriptedRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn ok(mut self, argv_prefix: &[&str], stdout: &str) -> Self {
    self.rules.push(Rule {
      prefix: prefix(argv_prefix),
      reply: Reply::Ok(stdout.to_string()),
      effect: None,
    });
    self
  }

  /// Succeed and run `effect` first (e.g. create the artifact a build would)
  pub fn ok_with(mut self, argv_prefix: &[&str], effect: impl Fn(&ExternalCommandSpec) + 'static) -> Self {
    self.rules.push(Rule {
      prefix: prefix(argv_prefix),
      reply: Reply::Ok(String::new()),
      effect: Some(Box::new(effect)),
    });
    self
  }

  pub fn fail(mut self, argv_prefix: &[&str], code: i32) -> Self {
    self.rules.push(Rule {
      prefix: prefix(argv_prefix),
      reply: Reply::Fail(code),
      effect: None,
    });
    self
  }

  pub fn missing(mut self, argv_prefix: &[&str]) -> Self {
    self.rules.push(Rule {
      prefix: prefix(argv_prefix),
      reply: Reply::Missing,
      effect: None,
    });
    self
  }

  pub fn calls(&self) -> Vec<ExternalCommandSpec> {
    self.calls.borrow().clone()
  }

  pub fn was_called(&self, argv_prefix: &[&str]) -> bool {
    let wanted = prefix(argv_prefix);
    self.calls.borrow().iter().any(|c| c.argv.starts_with(&wanted))
  }
}

impl CommandRunner for ScriptedRunner {
  fn run(&self, spec: &ExternalCommandSpec, capture_output: bool) -> Result<CommandOutcome, CommandError> {
    self.calls.borrow_mut().push(spec.clone());

    let rule = self.rules.iter().rev().find(|r| spec.argv.starts_with(&r.prefix));
    let Some(rule) = rule else {
      return Err(missing(spec));
    };

    if let Some(effect) = &rule.effect {
      effect(spec);
    }

    match &rule.reply {
      Reply::Ok(stdout) => Ok(CommandOutcome {
        exit_code: 0,
        stdout: if capture_output { stdout.clone() } else { String::new() },
        stderr: String::new(),
      }),
      Reply::Fail(code) => Err(CommandError::Failed(CommandFailure {
        command: spec.display(),
        exit_code: Some(*code),
        stdout: String::new(),
        stderr: "scripted failure".to_string(),
      })),
      Reply::Missing => Err(missing(spec)),
    }
  }
}

fn missing(spec: &ExternalCommandSpec) -> CommandError {
  CommandError::Spawn {
    program: spec.program().unwrap_or_default().to_string(),
    source: io::Error::new(io::ErrorKind::NotFound, "not scripted"),
  }
}
