//! wt - Manage isolated git worktrees for parallel coding assistant sessions
//!
//! Run with `wt --help` for usage.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use wt::{
    APP_NAME, Config, SessionManager, VERSION,
    commands::{self, NewOptions, RemoveTarget},
    error::ConfigError,
    git::GitCli,
    launch::ShellLauncher,
    session::ConsoleReporter,
};

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(version = VERSION)]
#[command(about = "Manage isolated git worktrees for parallel Claude Code sessions")]
#[command(long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new worktree session and launch the assistant
    New {
        /// Session name (default: current timestamp)
        name: Option<String>,

        /// Source branch to create the worktree from (default: current branch)
        #[arg(short, long)]
        branch: Option<String>,
    },

    /// Resume an existing session in the foreground
    Fg {
        /// Session name or unique prefix
        session: String,
    },

    /// List all sessions of the current repository
    Ls,

    /// Remove a session, or all of them
    Rm {
        /// Session name or unique prefix
        #[arg(required_unless_present = "all")]
        session: Option<String>,

        /// Remove all sessions
        #[arg(short, long, conflicts_with = "session")]
        all: bool,
    },

    /// Open a shell in a session's worktree
    Cd {
        /// Session name or unique prefix
        session: String,
    },

    /// Show configuration
    Config {
        /// Initialize config file with defaults
        #[arg(long)]
        init: bool,
    },
}

fn setup_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        // Progress and warnings reach the user through the reporter, not the log
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(file).with_target(false))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(filter)
            .init();
    }

    Ok(())
}

fn show_config(config: &Config, config_path: Option<PathBuf>, init: bool) -> wt::Result<()> {
    if init {
        let path = match config_path {
            Some(path) => {
                config.save_to(&path)?;
                path
            }
            None => config.save()?,
        };
        println!("Configuration initialized at {:?}", path);
        return Ok(());
    }

    let rendered =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
    println!("Configuration:");
    println!("{}", rendered);
    match config_path {
        Some(path) => println!("Config file: {:?}", path),
        None => println!("Config file: {:?}", Config::config_file_path()?),
    }
    println!("Worktrees dir: {:?}", config.worktrees_dir()?);
    Ok(())
}

async fn run(command: Commands, config: Config, config_path: Option<PathBuf>) -> wt::Result<()> {
    let manager = || -> wt::Result<SessionManager<GitCli>> {
        Ok(SessionManager::new(
            GitCli::new(),
            ConsoleReporter,
            config.worktrees_dir()?,
        ))
    };
    let launcher = ShellLauncher;

    match command {
        Commands::New { name, branch } => {
            let options = NewOptions {
                name,
                source_branch: branch,
            };
            commands::run_new(&manager()?, &launcher, &config, options).await?;
        }
        Commands::Fg { session } => {
            commands::run_fg(&manager()?, &launcher, &config, &session).await?;
        }
        Commands::Ls => {
            commands::run_ls(&manager()?).await?;
        }
        Commands::Rm { session, all } => {
            let target = match session {
                Some(session) if !all => RemoveTarget::Session(session),
                _ => RemoveTarget::All,
            };
            let summary = commands::run_rm(&manager()?, target).await?;
            debug!(removed = ?summary.removed, failed = ?summary.failed, "rm finished");
        }
        Commands::Cd { session } => {
            commands::run_cd(&manager()?, &launcher, &config, &session).await?;
        }
        Commands::Config { init } => show_config(&config, config_path, init)?,
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Install color-eyre error hooks
    color_eyre::install()?;

    let cli = Cli::parse();

    // Load configuration
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = loaded.unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config, using defaults: {}", e);
        Config::default()
    });

    setup_logging(cli.debug || config.debug, config.log_file.as_deref())?;
    debug!("wt v{} starting", VERSION);

    if let Err(e) = run(cli.command, config, cli.config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
