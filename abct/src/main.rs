//! abct - command-line front end for the abc interpreter.
//!
//! Parses a `.abc` source file (through the bytecode cache unless
//! disabled), evaluates it to completion, and reports failures the way
//! §7 of the interpreter's error-handling design specifies.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::cache::{run_cache_clear, CacheClearArgs};
use commands::run::{run_run, RunArgs};
use error::Result;

#[derive(Parser, Debug)]
#[command(name = "abct")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run abc source files", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true, env = "ABCT_VERBOSE")]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true, env = "ABCT_NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a source file to completion.
    Run(RunCommand),
    /// Cache lifecycle operations.
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Subcommand, Debug)]
enum CacheCommands {
    /// Remove the `__engcache__` directory.
    Clear(CacheClearCommand),
}

#[derive(Parser, Debug)]
struct RunCommand {
    /// Path to the `.abc` source file.
    path: PathBuf,

    /// Bypass the bytecode cache entirely.
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser, Debug)]
struct CacheClearCommand {
    /// Working directory whose `__engcache__` should be removed (default: current directory).
    #[arg(long)]
    dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose, cli.no_color) {
        eprintln!("{}", err.render());
        return ExitCode::FAILURE;
    }

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.render());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, no_color: bool) -> Result<()> {
    let filter = if verbose { EnvFilter::new("debug") } else { EnvFilter::new("info") };
    let subscriber = fmt::layer().with_ansi(!no_color).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| error::AbctError::Logging(e.to_string()))?;

    Ok(())
}

fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => run_run(RunArgs { path: args.path, no_cache: args.no_cache }),
        Commands::Cache(CacheCommands::Clear(args)) => {
            let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
            run_cache_clear(CacheClearArgs { dir })
        }
    }
}
