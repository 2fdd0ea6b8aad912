//! issuesync - Mirror GitHub issues and pull requests into Todoist
//!
//! Main entry point for the issuesync CLI.

use anyhow::Context;
use clap::{Parser, Subcommand};
use issuesync::config::{validate_config_result, SyncConfig};
use issuesync::storage::{to_iso8601, SyncStateStore};
use issuesync::sync::{Classifier, SyncDriver};
use std::path::PathBuf;
use std::process;

/// issuesync - GitHub issues and pull requests as Todoist tasks
#[derive(Parser, Debug)]
#[command(name = "issuesync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/issuesync/config.yaml)
    #[arg(short, long, env = "ISSUESYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the last-sync state file (overrides the config file)
    #[arg(short, long)]
    state_file: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one sync pass (default)
    Sync,

    /// Show when the last successful sync started
    Status,

    /// Forget the last sync time so the next run backfills everything
    Reset,

    /// Validate the configuration and print the section plan
    Check,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = issuesync::logging::init(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<SyncConfig> {
    let mut config = match cli.config {
        Some(ref path) => SyncConfig::load(path),
        None => SyncConfig::load_default(),
    }
    .context("Failed to load configuration")?;

    if let Some(ref path) = cli.state_file {
        config.state_file = Some(path.clone());
    }

    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => {
            validate_config_result(&config)?;
            let driver = SyncDriver::from_env(config)?;
            let runtime = tokio::runtime::Runtime::new()?;
            let report = runtime.block_on(driver.run())?;

            if report.tasks_failed > 0 || report.repositories_failed > 0 {
                tracing::warn!(
                    tasks_failed = report.tasks_failed,
                    repositories_failed = report.repositories_failed,
                    "Sync finished with partial failures"
                );
            }
        }

        Commands::Status => {
            let store = SyncStateStore::new(config.state_path());
            match store.load() {
                Some(ts) => println!("Last sync: {}", to_iso8601(&ts)),
                None => println!("Last sync: never"),
            }
            println!("State file: {}", store.path().display());
        }

        Commands::Reset => {
            let store = SyncStateStore::new(config.state_path());
            if store.clear()? {
                println!("Cleared {}", store.path().display());
            } else {
                println!("No sync state at {}", store.path().display());
            }
        }

        Commands::Check => {
            validate_config_result(&config)?;
            let classifier = Classifier::from_config(&config);
            let plan = classifier.section_plan();

            println!("Account: {}", config.account);
            println!("Project: {}", config.project);
            println!("Sections ({} of {}):", plan.len(), config.max_sections);
            for name in &plan {
                println!("  {}", name);
            }
            for (env_var, token) in [
                (&config.github.token_env, config.github_token()),
                (&config.todoist.token_env, config.todoist_token()),
            ] {
                let state = if token.is_ok() { "set" } else { "missing" };
                println!("{}: {}", env_var, state);
            }
        }
    }

    Ok(())
}
