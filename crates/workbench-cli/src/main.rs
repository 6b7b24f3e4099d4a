use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::context::{AlreadyReported, Workbench};

#[derive(Parser)]
#[command(name = "workbench")]
#[command(about = "Run, debug and format code with an attached interpreter", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ~/.config/workbench/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "workbench=info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a file and attach to its interpreter; stdin is forwarded as input
    Run { file: PathBuf },
    /// Generate a debug trace for a file and print it as JSON
    Debug {
        file: PathBuf,
        /// Write the trace here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Format a file, printing the result or rewriting it in place
    Format {
        file: PathBuf,
        #[arg(short, long)]
        write: bool,
    },
    /// Print the language a file is detected as
    Detect { file: PathBuf },
    /// Publish a copy of a file and print its link
    Share { file: PathBuf },
    /// Inspect or initialize the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the configuration file location
    Path,
    /// Write the default configuration if none exists
    Init,
}

fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log)?;

    match dispatch(cli).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if e.is::<AlreadyReported>() => Ok(ExitCode::FAILURE),
        Err(e) => Err(e),
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { file } => {
            let workbench = Workbench::load(cli.config)?;
            commands::run::execute(&workbench, &file).await?
        }
        Commands::Debug { file, output } => {
            let workbench = Workbench::load(cli.config)?;
            commands::debug::execute(&workbench, &file, output.as_deref()).await?
        }
        Commands::Format { file, write } => {
            let workbench = Workbench::load(cli.config)?;
            commands::format::execute(&workbench, &file, write).await?
        }
        Commands::Share { file } => {
            let workbench = Workbench::load(cli.config)?;
            commands::share::execute(&workbench, &file).await?
        }
        Commands::Detect { file } => commands::detect::execute(&file)?,
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config::path(cli.config)?,
            ConfigAction::Init => commands::config::init(cli.config).await?,
        },
    }

    Ok(())
}
