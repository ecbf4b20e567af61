use clap::{Parser, Subcommand};
use release_monorepo::commands::{self, CommitsOptions};
use release_monorepo::core::config::DEBUG_ENV;
use release_monorepo::core::error::{MonorepoError, print_error};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Scope release pipelines to one package of a monorepo
#[derive(Parser)]
#[command(name = "srm")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List commits that touched the package in the current directory
  Commits {
    /// Start after this revision (default: the package's last `<name>-v*` tag)
    #[arg(long)]
    since: Option<String>,
    /// List every commit in the range without attributing
    #[arg(long)]
    all: bool,
    /// Output the report as JSON
    #[arg(long)]
    json: bool,
    /// Show a progress bar while attributing
    #[arg(long)]
    progress: bool,
  },

  /// Print the package's tag format (`<name>-v${version}`)
  TagFormat,

  /// Print the package tag for a version
  Tag {
    /// Semantic version, e.g. 1.4.0
    #[arg(value_name = "VERSION")]
    release_version: String,
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
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// RUST_LOG wins; SRM_DEBUG alone turns on crate debug output
fn init_logging() {
  let filter = match EnvFilter::try_from_default_env() {
    Ok(filter) => filter,
    Err(_) if std::env::var(DEBUG_ENV).is_ok_and(|v| matches!(v.trim(), "1" | "true")) => {
      EnvFilter::new("release_monorepo=debug,srm=info")
    }
    Err(_) => EnvFilter::new("warn"),
  };

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging();

  let cwd = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(MonorepoError::from(e).context("Failed to get current directory")),
  };

  let result = match cli.command {
    Commands::Commits {
      since,
      all,
      json,
      progress,
    } => commands::run_commits(
      &cwd,
      CommitsOptions {
        since,
        all,
        json,
        progress,
      },
    ),
    Commands::TagFormat => commands::run_tag_format(&cwd),
    Commands::Tag { release_version } => commands::run_tag(&cwd, &release_version),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: MonorepoError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
