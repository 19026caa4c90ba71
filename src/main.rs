mod checks;
mod commands;
mod core;
mod ui;
mod utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crate::core::config::{PipelineConfig, PipelineVariant};
use crate::core::context::ProjectContext;
use crate::core::error::{PilotError, print_error};
use crate::core::pipeline::InterruptFlag;
use tracing_subscriber::EnvFilter;

/// Build, publish and verify a release package
#[derive(Parser)]
#[command(name = "pkg-pilot")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Project root (default: current directory)
  #[arg(long, global = true)]
  root: Option<PathBuf>,

  /// Explicit config file (default: pilot.toml search in the project root)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Print debug diagnostics to stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Release
  // ============================================================================
  /// Build the Web UI and package, upload, optionally verify the install
  Build {
    /// Remove previous build output first
    #[arg(long)]
    clean: bool,
    /// Skip the Web UI build and omit its assets from the package
    #[arg(long)]
    skip_ui: bool,
    /// Build only, do not publish
    #[arg(long)]
    skip_upload: bool,
    /// Install the published version from the repository afterwards
    #[arg(long)]
    test: bool,
    /// Continue when the Web UI build fails
    #[arg(long)]
    force: bool,
    /// Print the final report as JSON on stdout
    #[arg(long)]
    json: bool,
  },

  /// Build the package without the Web UI and upload it
  Quick {
    /// Remove previous build output first
    #[arg(long)]
    clean: bool,
    /// Build only, do not publish
    #[arg(long)]
    skip_upload: bool,
    /// Print the final report as JSON on stdout
    #[arg(long)]
    json: bool,
  },

  // ============================================================================
  // Setup & Inspection
  // ============================================================================
  /// Run prerequisite checks
  Doctor {
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Print the version a build would publish
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Write a default pilot.toml
  Init {
    /// Overwrite an existing configuration
    #[arg(long)]
    force: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  let yellow_header = anstyle::Style::new()
    .bold()
    .underline()
    .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow)));
  let red = anstyle::Style::new()
    .bold()
    .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red)));

  clap::builder::Styles::styled()
    .usage(yellow_header)
    .header(yellow_header)
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(red)
    .error(red)
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .compact()
    .init();
}

/// Ctrl-C only raises the flag; the sequencer stops at the next stage boundary
fn install_interrupt_handler() -> InterruptFlag {
  let flag = InterruptFlag::default();
  let handler_flag = flag.clone();
  if let Err(err) = ctrlc::set_handler(move || handler_flag.raise()) {
    tracing::warn!("failed to set Ctrl-C handler: {}", err);
  }
  flag
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let root = match cli.root {
    Some(root) => root,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => handle_error(PilotError::message(format!("Failed to get current directory: {}", e))),
    },
  };

  // init runs before any config exists
  if let Commands::Init { force } = cli.command {
    if let Err(err) = commands::run_init(&root, force) {
      handle_error(err);
    }
    return;
  }

  let ctx = match ProjectContext::build(&root, cli.config.as_deref()) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };
  tracing::debug!(config = ?ctx.config.source, "project context ready");

  let result = match cli.command {
    Commands::Build {
      clean,
      skip_ui,
      skip_upload,
      test,
      force,
      json,
    } => {
      let pipeline = PipelineConfig {
        variant: PipelineVariant::Full,
        clean,
        skip_frontend_build: skip_ui,
        skip_upload,
        verify_install: test,
        force,
      };
      commands::run_build(&ctx, pipeline, json, install_interrupt_handler())
    }
    Commands::Quick {
      clean,
      skip_upload,
      json,
    } => commands::run_quick(&ctx, clean, skip_upload, json, install_interrupt_handler()),
    Commands::Doctor { json } => commands::run_doctor(&ctx, json),
    Commands::Version { json } => commands::run_version(&ctx, json),
    Commands::Init { .. } => Ok(()),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: PilotError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
