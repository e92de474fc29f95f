use clap::{Parser, Subcommand};
use cooccur::cli::run::SourceOverrides;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cooccur")]
#[command(about = "Sliding-window bigram co-occurrence over a line stream", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest lines until the stream goes quiet, then write the window log
    Run {
        /// Connect to this host instead of the configured one
        #[arg(long)]
        host: Option<String>,

        /// Connect to this port instead of the configured one
        #[arg(long)]
        port: Option<u16>,

        /// Read lines from standard input
        #[arg(long, conflicts_with_all = ["host", "port", "file"])]
        stdin: bool,

        /// Read lines from a file
        #[arg(long, conflicts_with_all = ["host", "port"])]
        file: Option<PathBuf>,
    },
    /// Summarize a JSON window log
    Analyze {
        log: PathBuf,
    },
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Init {
        #[arg(long)]
        stdout: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cooccur=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config_path = cooccur::config::resolve_config_path(cli.config.as_deref());

    match cli.command {
        Some(Commands::Run {
            host,
            port,
            stdin,
            file,
        }) => {
            let overrides = SourceOverrides {
                host,
                port,
                stdin,
                file,
            };
            cooccur::cli::run::run(config_path, overrides).await?;
        }
        None => {
            // Default behavior is to run
            cooccur::cli::run::run(config_path, SourceOverrides::default()).await?;
        }
        Some(Commands::Analyze { log }) => {
            cooccur::cli::analyze::analyze(&log)?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { stdout } => {
                cooccur::cli::config::init(stdout)?;
            }
        },
    }

    Ok(())
}
