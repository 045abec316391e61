use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use sidx::cli::setup::setup;
use sidx::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct PeriodArgs {
    /// Start date (YYYY-MM-DD), overrides the configured start
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Exclusive end date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Compute the index, print weights and write the chart
    Index {
        #[command(flatten)]
        period: PeriodArgs,

        /// Chart output path (SVG)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print initial and end-of-period basket weights
    Weights {
        #[command(flatten)]
        period: PeriodArgs,
    },
}

impl From<Commands> for sidx::AppCommand {
    fn from(cmd: Commands) -> sidx::AppCommand {
        match cmd {
            Commands::Index { period, output } => sidx::AppCommand::Index(sidx::RunOptions {
                start: period.start,
                end: period.end,
                output,
            }),
            Commands::Weights { period } => sidx::AppCommand::Weights(sidx::RunOptions {
                start: period.start,
                end: period.end,
                output: None,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => sidx::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
