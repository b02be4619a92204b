use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "treefuse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fuse a project tree into LLM-ready context artifacts")]
struct Args {
    /// Directory to scan (defaults to the current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Configuration file (defaults to treefuse.json in the root)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the artifact base name from the configuration
    #[arg(long, value_name = "NAME")]
    out_name: Option<String>,

    /// Disable secret redaction for this run
    #[arg(long)]
    no_redact: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default treefuse.json into the root
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Validate the configuration and report every finding
    Check,
}

fn main() -> Result<()> {
    setup_tracing();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = Args::parse();

    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let root = root
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("Failed to resolve root {}: {e}", root.display()))?;

    match args.command {
        Some(Command::Init { force }) => commands::run_init(&root, force),
        Some(Command::Check) => commands::run_check(&root, args.config.as_deref()),
        None => {
            commands::run_fuse(&root, args.config.as_deref(), args.out_name, args.no_redact).await
        }
    }
}

fn setup_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}
