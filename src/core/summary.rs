//! Final report shown after a successful pipeline run

use crate::core::artifact::Artifact;
use crate::core::repository::TargetRepository;
use crate::utils::format_mebibytes;
use serde::Serialize;
use std::fmt;

/// Rendered outcome of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSummary {
  pub artifact: String,
  pub artifact_path: String,
  pub size_bytes: u64,
  pub size: String,
  pub sha256: String,
  pub version: String,
  pub repository_url: String,
  pub index_url: String,
  pub install_command: String,
  pub uploaded: bool,
  pub notes: Vec<String>,
}

impl RenderedSummary {
  pub fn with_uploaded(mut self, uploaded: bool) -> Self {
    self.uploaded = uploaded;
    self
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.notes.push(note.into());
    self
  }
}

impl fmt::Display for RenderedSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.uploaded {
      writeln!(f, "🎉 Build and upload complete!")?;
    } else {
      writeln!(f, "🎉 Build complete!")?;
    }
    writeln!(f)?;
    writeln!(f, "📦 Package:    {}", self.artifact)?;
    writeln!(f, "🏷️  Version:    {}", self.version)?;
    writeln!(f, "📊 Size:       {}", self.size)?;
    writeln!(f, "🔐 SHA-256:    {}", self.sha256)?;
    writeln!(f, "🌐 Repository: {}", self.repository_url)?;
    for note in &self.notes {
      writeln!(f, "⚠️  Note:       {}", note)?;
    }
    writeln!(f)?;
    writeln!(f, "📥 Install command:")?;
    writeln!(f, "  {}", self.install_command)?;
    writeln!(f)?;
    writeln!(f, "🔗 Index:")?;
    write!(f, "  {}", self.index_url)
  }
}

/// Formats artifact, version and repository into a [`RenderedSummary`]
pub struct SummaryReporter<'a> {
  target: &'a TargetRepository,
}

impl<'a> SummaryReporter<'a> {
  pub fn new(target: &'a TargetRepository) -> Self {
    Self { target }
  }

  pub fn report(&self, artifact: &Artifact, version: &str) -> RenderedSummary {
    RenderedSummary {
      artifact: artifact.name.clone(),
      artifact_path: artifact.path.display().to_string(),
      size_bytes: artifact.size_bytes,
      size: format_mebibytes(artifact.size_bytes),
      sha256: artifact.sha256.clone(),
      version: version.to_string(),
      repository_url: self.target.url.clone(),
      index_url: self.target.index_url.clone(),
      install_command: self.target.install_hint(version),
      uploaded: false,
      notes: Vec::new(),
    }
  }
}
