//! Griffin CLI - find your checkouts from anywhere
//!
//! Builds an index of git repositories, archived bundles and the folders
//! between them, then answers quick filtered lookups against it.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod alfred;
mod commands;

#[derive(Parser)]
#[command(name = "griffin")]
#[command(author = "Griffin Contributors")]
#[command(version)]
#[command(about = "Index and find local git repositories and projects", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration directory (defaults to ~/.config/griffin)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Finds repositories based on given filters
    FindRepo {
        /// Format output for Alfred
        #[arg(long)]
        alfred: bool,

        /// Filter out archives
        #[arg(long)]
        noarchive: bool,

        /// Filter out directories
        #[arg(long)]
        nodir: bool,

        /// Terms that must appear, in order, in the repository name
        terms: Vec<String>,
    },

    /// Builds the repository index
    BuildRepoIndex {
        /// Follow symbolic links while scanning
        #[arg(long)]
        follow_symlinks: bool,
    },

    /// Finds projects based on given filters
    FindProject {
        /// Format output for Alfred
        #[arg(long)]
        alfred: bool,

        /// Terms that must appear, in order, in the project path
        terms: Vec<String>,
    },

    /// Builds the project index from the repository index
    BuildProjectIndex {
        /// Follow symbolic links while scanning
        #[arg(long)]
        follow_symlinks: bool,
    },

    /// Shows or updates the configuration
    Configure {
        /// Add a repository root directory (may use ${HOME})
        #[arg(long)]
        add_repo_root: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries lookup results
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = commands::config_dir(cli.config_dir).and_then(|dir| match cli.command {
        Commands::FindRepo {
            alfred,
            noarchive,
            nodir,
            terms,
        } => commands::find_repo(&dir, &terms, !noarchive, !nodir, alfred),
        Commands::BuildRepoIndex { follow_symlinks } => {
            commands::build_repo_index(&dir, follow_symlinks)
        }
        Commands::FindProject { alfred, terms } => commands::find_project(&dir, &terms, alfred),
        Commands::BuildProjectIndex { follow_symlinks } => {
            commands::build_project_index(&dir, follow_symlinks)
        }
        Commands::Configure { add_repo_root } => {
            commands::configure(&dir, add_repo_root.as_deref())
        }
    });

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
