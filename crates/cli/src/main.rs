mod cmd;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::output::print_error;

/// scar - builds Java projects described by YAML project files
#[derive(Parser)]
#[command(name = "scar")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Log level, ignored when RUST_LOG is set
  #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
  log_level: LogLevel,

  /// Shorthand for --log-level debug
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
  Trace,
  Debug,
  Info,
  Warn,
  Error,
}

impl LogLevel {
  fn as_str(self) -> &'static str {
    match self {
      LogLevel::Trace => "trace",
      LogLevel::Debug => "debug",
      LogLevel::Info => "info",
      LogLevel::Warn => "warn",
      LogLevel::Error => "error",
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Build a project and its dependencies
  Build {
    /// Project file or directory (`file=<path>` is also accepted)
    #[arg(default_value = ".")]
    path: String,
  },

  /// Print a project's resolved configuration
  Resolve {
    /// Project file or directory (`file=<path>` is also accepted)
    #[arg(default_value = ".")]
    path: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Print a project's declared classpath
  Classpath {
    /// Project file or directory (`file=<path>` is also accepted)
    #[arg(default_value = ".")]
    path: String,
  },

  /// Print the order projects would be built in
  Graph {
    /// Project file or directory (`file=<path>` is also accepted)
    #[arg(default_value = ".")]
    path: String,
  },
}

fn init_tracing(cli: &Cli) {
  let level = if cli.verbose && cli.log_level == LogLevel::Info {
    LogLevel::Debug
  } else {
    cli.log_level
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .init();
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Build { path } => cmd::cmd_build(&path),
    Commands::Resolve { path, json } => cmd::cmd_resolve(&path, json),
    Commands::Classpath { path } => cmd::cmd_classpath(&path),
    Commands::Graph { path } => cmd::cmd_graph(&path),
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(&cli);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
