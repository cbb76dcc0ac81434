//! devstack - bring up local multi-container development environments
//!
//! This is the main CLI entry point for devstack.

use anyhow::Context;
use clap::{Parser, Subcommand};
use devstack::compose::ComposeOrchestrator;
use devstack::config::{ConfigLoader, DevConfig, CONFIG_ENV_VAR};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// devstack - docker compose with shared networks and registry logins
#[derive(Parser)]
#[command(name = "devstack")]
#[command(version)]
#[command(about = "Bring up local multi-container development environments", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Configuration file (skips the directory lookup)
    #[arg(short, long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and start a project's containers, then follow its logs
    Up {
        /// Project name
        project: String,
    },

    /// List configured projects
    #[command(alias = "ls")]
    List,

    /// Print the resolved configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli).await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the command and return the exit status to leave with
async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Up { project } => {
            let project = config.project(&project)?;
            let orchestrator = ComposeOrchestrator::docker(&config)?;

            let report = orchestrator.up(&config, project, true).await?;
            if !report.warnings.is_empty() {
                tracing::warn!(
                    "{} registry login(s) failed; images from those registries may not pull",
                    report.warnings.len()
                );
            }
            Ok(report.exit_code)
        }

        Commands::List => {
            print!("{}", format_projects(&config));
            Ok(0)
        }

        Commands::Config => {
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(0)
        }
    }
}

fn format_projects(config: &DevConfig) -> String {
    if config.projects.is_empty() {
        return "No projects configured\n".to_string();
    }

    let mut out = format!("{:<20} {:<40} COMPOSE FILES\n", "PROJECT", "DIRECTORY");
    for project in config.projects.values() {
        out.push_str(&format!(
            "{:<20} {:<40} {}\n",
            project.name,
            project.directory.display(),
            project.docker_compose_files.join(", ")
        ));
    }
    out
}
