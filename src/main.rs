mod core;
mod ui;
mod utils;

use crate::core::context::{BackupArgs, BackupContext};
use crate::core::error::{BackupError, ExitCode, print_error};
use crate::ui::progress::MultiProgress;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Back up every file touched by each commit of a branch, as it was at that commit
#[derive(Parser)]
#[command(name = "commit-backup")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Repository to read history from
  #[arg(long, visible_alias = "repo-dir", default_value = ".")]
  repo: PathBuf,

  /// Existing directory that receives one subdirectory per commit
  #[arg(long, default_value = "./data")]
  backup_dir: PathBuf,

  /// Only commits on or after this date (DD-MM-YYYY)
  #[arg(long)]
  start_date: Option<String>,

  /// Only commits on or before this date (DD-MM-YYYY)
  #[arg(long)]
  end_date: Option<String>,

  /// Branch to walk (default: the checked-out branch)
  #[arg(long)]
  branch: Option<String>,

  /// Config file (default: commit-backup.toml in the repository root)
  #[arg(long)]
  config: Option<PathBuf>,

  /// Worker threads for changed-file extraction (default: logical CPUs)
  #[arg(long)]
  diff_workers: Option<usize>,

  /// Maximum files fetched/written at once, 0 = unbounded (default: 4 x logical CPUs)
  #[arg(long)]
  max_in_flight: Option<usize>,

  /// Print the run result as JSON on stdout
  #[arg(long)]
  json: bool,

  /// Do not draw progress bars
  #[arg(long)]
  no_progress: bool,

  /// Log per-commit details
  #[arg(short, long, conflicts_with = "quiet")]
  verbose: bool,

  /// Only log warnings and errors
  #[arg(short, long)]
  quiet: bool,
}

impl Cli {
  fn backup_args(&self) -> BackupArgs {
    BackupArgs {
      repo_dir: self.repo.clone(),
      backup_dir: self.backup_dir.clone(),
      start_date: self.start_date.clone(),
      end_date: self.end_date.clone(),
      branch: self.branch.clone(),
      config: self.config.clone(),
      diff_workers: self.diff_workers,
      max_in_flight: self.max_in_flight,
      no_progress: self.no_progress || self.json,
    }
  }

  fn log_level(&self) -> &'static str {
    if self.verbose {
      "debug"
    } else if self.quiet {
      "warn"
    } else {
      "info"
    }
  }
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

fn init_logging(default_level: &str) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .with(filter)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.log_level());

  match run(&cli) {
    Ok(true) => {}
    Ok(false) => std::process::exit(ExitCode::BackupFailed.as_i32()),
    Err(err) => handle_error(err),
  }
}

/// Returns whether every unit was backed up
fn run(cli: &Cli) -> Result<bool, BackupError> {
  let ctx = BackupContext::build(&cli.backup_args())?;
  let progress = if ctx.config.output.progress {
    MultiProgress::new()
  } else {
    MultiProgress::hidden()
  };

  info!("Starting backup of branch {}", ctx.branch);
  let result = crate::core::pipeline::run_backup(&ctx, &progress)?;
  info!("Finished backup of branch {}", ctx.branch);

  if cli.json {
    println!("{}", ui::report::to_json(&result)?);
  }

  if result.success {
    info!("Backup completed successfully.");
  } else if !cli.json {
    error!(
      "Files that failed during backup:\n{}",
      ui::report::failure_table(&result.failures)
    );
  }

  Ok(result.success)
}

fn handle_error(err: BackupError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
