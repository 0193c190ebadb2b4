mod commands;
mod helpers;

use bihmc_core::domain::HmError;
use clap::Parser;

pub fn run_from_env() -> i32 {
    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            let mut source = std::error::Error::source(&error);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            error.exit_code()
        }
    }
}

fn run() -> Result<i32, CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(0);
            }
            _ => return Err(CliError::Usage(err.to_string())),
        },
    };

    init_tracing(cli.verbose);

    match cli.command {
        CliCommand::Compute(args) => commands::run_compute_command(args, cli.verbose),
        CliCommand::Blend(args) => commands::run_blend_command(args),
        CliCommand::Dewiggle(args) => commands::run_dewiggle_command(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(name = "bihmc-rs", about = "Halo-model bispectrum compute engine")]
struct Cli {
    /// Emit pipeline diagnostics (halo model and profile summaries)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Run the full bispectrum pipeline from a JSON scenario
    Compute(commands::ComputeArgs),
    /// Blend precomputed halo terms into a combined cube
    Blend(commands::BlendArgs),
    /// Dewiggle a linear power spectrum against its no-wiggle twin
    Dewiggle(commands::DewiggleArgs),
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Compute(#[from] HmError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Compute(_) => 1,
            Self::Internal(_) => 3,
        }
    }
}
