//! Quill CLI - pull agent projects from the manage API into TypeScript source.
//!
//! # Usage
//!
//! ```bash
//! # Pull the configured project
//! quill pull
//!
//! # Pull a specific project, overwriting local edits
//! quill pull --project weather-project --force
//!
//! # Pull every project of the tenant
//! quill pull --all
//!
//! # Inspect the raw definition without generating
//! quill pull --project weather-project --json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use quill_cli::{output, pull::PullOptions};
use quill_core::config::QuillConfig;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Quill - agent project code generation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a project definition and regenerate its source tree
    Pull {
        /// Project id (default: project.id from quill.toml)
        #[arg(short, long, conflicts_with = "all")]
        project: Option<String>,

        /// Pull every project of the tenant
        #[arg(long)]
        all: bool,

        /// Overwrite files without merging local edits
        #[arg(short, long)]
        force: bool,

        /// Discard and fully rewrite all output, bypassing the merge engine
        #[arg(long)]
        introspect: bool,

        /// Print the raw fetched definition instead of generating
        #[arg(long)]
        json: bool,

        /// Generate only the named environment
        #[arg(long)]
        env: Option<String>,

        /// Fetch the definition pinned to a tag
        #[arg(long)]
        tag: Option<String>,

        /// Output directory (default: project.output_dir from quill.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        output::error(format!("{:#}", e));
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = QuillConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Pull {
            project,
            all,
            force,
            introspect,
            json,
            env,
            tag,
            output,
        } => {
            let options = PullOptions {
                project,
                all,
                force,
                introspect,
                format: output::OutputFormat::from_flag(json),
                env,
                tag,
                output,
            };
            quill_cli::run_pull(&config, options).await?;
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("quill=debug,quill_cli=debug,quill_codegen=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("quill=info,quill_cli=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
