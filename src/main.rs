mod commands;
mod core;
mod pins;
mod update;
mod utils;

use clap::{Args, Parser, Subcommand};
use crate::core::error::{FAILURE_EXIT_CODE, UpdaterError, print_error};
use std::path::PathBuf;

/// Update niv/npins sources and commit each change with a changelog
#[derive(Parser)]
#[command(name = "pin-updater")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Project repository root (default: current directory)
  #[arg(long, global = true, value_name = "DIR")]
  root: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Update niv sources (nix/sources.json)
  Niv {
    #[command(flatten)]
    args: UpdateArgs,
  },

  /// Update npins sources (npins/sources.json)
  Npins {
    #[command(flatten)]
    args: UpdateArgs,
    /// GPG-sign commits
    #[arg(short = 'S', long)]
    sign: bool,
  },
}

#[derive(Args)]
struct UpdateArgs {
  /// The source to update; all sources when omitted
  #[arg(value_name = "PACKAGE")]
  package: Option<String>,

  /// Do not create a changelog
  #[arg(long)]
  no_changelog: bool,

  /// Config file (niv: ./update_niv.toml, npins: ~/.config/npins-updater/config.toml)
  #[arg(short, long, value_name = "CONFIG")]
  config: Option<String>,
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

  let root = match cli.root {
    Some(root) => root,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => {
        eprintln!("Error: Failed to get current directory: {}", e);
        std::process::exit(FAILURE_EXIT_CODE);
      }
    },
  };

  let (tool, args, sign) = match cli.command {
    Commands::Niv { args } => (pins::PinTool::Niv, args, false),
    Commands::Npins { args, sign } => (pins::PinTool::Npins, args, sign),
  };

  let config_path = args.config.as_deref().map(utils::expand_home);
  let options = commands::UpdateOptions {
    package: args.package,
    changelog: !args.no_changelog,
    sign,
  };

  let result = core::context::RunContext::build(&root, tool, config_path)
    .and_then(|ctx| commands::run_update(&ctx, &options));

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: UpdaterError) -> ! {
  print_error(&err);
  std::process::exit(FAILURE_EXIT_CODE);
}
