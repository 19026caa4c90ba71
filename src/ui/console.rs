//! Progress lines for the operator
//!
//! Human mode writes to stdout. JSON mode moves everything to stderr so the
//! final report is the only thing on stdout.

use crate::core::runner::ExternalCommandSpec;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
  Stdout,
  Stderr,
  Silent,
}

#[derive(Debug, Clone, Copy)]
pub struct Console {
  target: Target,
}

impl Console {
  /// Console for human output; `json` redirects progress to stderr
  pub fn new(json: bool) -> Self {
    Self {
      target: if json { Target::Stderr } else { Target::Stdout },
    }
  }

  /// Discards everything (tests)
  #[cfg(test)]
  pub fn silent() -> Self {
    Self { target: Target::Silent }
  }

  pub fn banner(&self, title: &str) {
    let rule = "=".repeat(60);
    self.emit(format_args!("{}\n{}\n{}", rule, title, rule));
  }

  /// Stage header: `[tag] message`
  pub fn step(&self, tag: &str, message: &str) {
    self.emit(format_args!("\n[{}] {}", tag, message));
  }

  pub fn success(&self, message: &str) {
    self.emit(format_args!("✓ {}", message));
  }

  pub fn warning(&self, message: &str) {
    self.emit(format_args!("⚠ {}", message));
  }

  pub fn error(&self, message: &str) {
    self.emit(format_args!("✗ {}", message));
  }

  /// Echo a command before it streams
  pub fn command(&self, spec: &ExternalCommandSpec) {
    self.emit(format_args!("$ {}", spec.display()));
  }

  pub fn line(&self, text: impl fmt::Display) {
    self.emit(format_args!("{}", text));
  }

  fn emit(&self, args: fmt::Arguments<'_>) {
    match self.target {
      Target::Stdout => println!("{}", args),
      Target::Stderr => eprintln!("{}", args),
      Target::Silent => {}
    }
  }
}
