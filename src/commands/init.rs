use std::path::Path;

use crate::core::config::PilotConfig;
use crate::core::error::{ConfigError, PilotResult};

/// Write a default pilot.toml to `root`
///
/// Refuses when any config file is already found, unless `force`.
pub fn run_init(root: &Path, force: bool) -> PilotResult<()> {
  if let Some(existing) = PilotConfig::find_config_path(root)
    && !force
  {
    return Err(ConfigError::AlreadyExists { path: existing }.into());
  }

  println!("📦 Project root: {}", root.display());

  let path = PilotConfig::default().save(root)?;

  println!("\n✅ Wrote default configuration");
  println!("   Configuration saved to: {}", path.display());
  println!("\n🚀 Next steps:");
  println!("   1. Edit [repository] in pilot.toml (or set PKG_PILOT_REPOSITORY_URL / PKG_PILOT_USERNAME / PKG_PILOT_PASSWORD)");
  println!("   2. Run: pkg-pilot doctor");
  println!("   3. Run: pkg-pilot build --skip-upload");

  Ok(())
}
