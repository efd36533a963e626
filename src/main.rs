mod commands;
mod core;
mod ui;

use clap::{Parser, Subcommand};
use crate::core::error::{ReleaseError, print_error};
use std::path::PathBuf;

/// Publish container images with skopeo as a semantic-release step
#[derive(Parser)]
#[command(name = "semantic-release-skopeo")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Pre-flight checks: skopeo present, source valid and existing,
  /// destinations valid and writable
  Verify {
    /// Path to the plugin config file (default: search skopeo.toml,
    /// .skopeo.toml, .config/skopeo.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Inline plugin config as a JSON object (camelCase keys)
    #[arg(long)]
    plugin_config: Option<String>,
  },

  /// Copy the source image to every configured destination
  Publish {
    /// Path to the plugin config file (default: search skopeo.toml,
    /// .skopeo.toml, .config/skopeo.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Inline plugin config as a JSON object (camelCase keys)
    #[arg(long)]
    plugin_config: Option<String>,
    /// Version being released, substituted into ${version} templates
    #[arg(long)]
    next_version: String,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  let result = match cli.command {
    Commands::Verify { config, plugin_config } => {
      commands::run_verify(config.as_deref(), plugin_config.as_deref())
    }
    Commands::Publish {
      config,
      plugin_config,
      next_version,
    } => commands::run_publish(config.as_deref(), plugin_config.as_deref(), &next_version),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
