//! CLI command implementations.

use crate::alfred;
use colored::Colorize;
use griffin_core::{Configuration, LocationRecord, ProjectRecord};
use griffin_store::{build_pattern, match_projects, match_repos, IndexStore, RepoFilter};
use griffin_walker::{GitCli, WalkOptions};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Resolves the configuration directory: the flag if given, otherwise
/// `~/.config/griffin`.
pub fn config_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    let home = dirs::home_dir().ok_or("cannot determine home directory")?;
    Ok(home.join(".config").join("griffin"))
}

/// Placeholder lookup for scan roots: `HOME` from the user's home
/// directory, anything else from the environment.
fn lookup_var(name: &str) -> Option<String> {
    if name == "HOME" {
        if let Some(home) = dirs::home_dir() {
            return Some(home.to_string_lossy().to_string());
        }
    }
    std::env::var(name).ok()
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message);
    Ok(spinner)
}

/// Rebuild the repository index.
pub fn build_repo_index(dir: &Path, follow_symlinks: bool) -> Result<()> {
    let config = Configuration::load(dir)?;
    let options = WalkOptions { follow_symlinks };

    let spinner = spinner("Scanning repository roots...")?;
    let result =
        griffin_walker::build_repo_index(&config, lookup_var, &GitCli::default(), &options);
    spinner.finish_and_clear();
    let result = result?;

    println!(
        "{} Indexed {} repositories, {} archives, {} directories in {}ms",
        "✓".green(),
        result.repositories.to_string().cyan(),
        result.archives.to_string().cyan(),
        result.directories.to_string().cyan(),
        result.duration_ms
    );

    if config.repo_roots.is_empty() {
        eprintln!("\n{} No repository roots configured.", "⚠ Warning:".yellow());
        eprintln!(
            "  Run {} to add one",
            "griffin configure --add-repo-root <path>".cyan()
        );
    }

    if !result.failed_lookups.is_empty() {
        println!(
            "\n{} repositories without a readable origin:",
            "⚠".yellow()
        );
        for error in result.failed_lookups.iter().take(5) {
            println!("  {}", error.red());
        }
        if result.failed_lookups.len() > 5 {
            println!("  ... and {} more", result.failed_lookups.len() - 5);
        }
    }

    if !result.skipped.is_empty() {
        println!(
            "{} {} entries could not be read (run with {} for details)",
            "⚠".yellow(),
            result.skipped.len(),
            "--verbose".cyan()
        );
    }

    Ok(())
}

/// Rebuild the project index from the repository index.
pub fn build_project_index(dir: &Path, follow_symlinks: bool) -> Result<()> {
    let config = Configuration::load(dir)?;
    let options = WalkOptions { follow_symlinks };

    let spinner = spinner("Scanning repositories for projects...")?;
    let result = griffin_walker::build_project_index(&config, &options);
    spinner.finish_and_clear();
    let result = result?;

    println!(
        "{} Indexed {} projects in {} repositories in {}ms",
        "✓".green(),
        result.projects.len().to_string().cyan(),
        result.repositories_scanned.to_string().cyan(),
        result.duration_ms
    );
    Ok(())
}

/// Print repositories matching `terms`.
pub fn find_repo(
    dir: &Path,
    terms: &[String],
    archives: bool,
    dirs: bool,
    alfred_output: bool,
) -> Result<()> {
    let config = Configuration::load(dir)?;
    let records = IndexStore::new(&config.repo_index).load_repos(RepoFilter { archives, dirs })?;
    debug!("Loaded {} records from {}", records.len(), config.repo_index.display());

    let pattern = build_pattern(terms)?;
    let matches: Vec<&LocationRecord> = match_repos(&records, &pattern);

    if alfred_output {
        println!("{}", alfred::repos_as_alfred(&matches)?);
    } else {
        for record in matches {
            println!("{}", record.full_path().display());
        }
    }
    Ok(())
}

/// Print projects matching `terms`.
pub fn find_project(dir: &Path, terms: &[String], alfred_output: bool) -> Result<()> {
    let config = Configuration::load(dir)?;
    let projects: Vec<ProjectRecord> = IndexStore::new(&config.project_index).load()?;
    debug!("Loaded {} projects from {}", projects.len(), config.project_index.display());

    let pattern = build_pattern(terms)?;
    let matches = match_projects(&projects, &pattern);

    if alfred_output {
        println!("{}", alfred::projects_as_alfred(&matches)?);
    } else {
        for project in matches {
            println!("{}", project.full_path().display());
        }
    }
    Ok(())
}

/// Show the configuration, adding a root first if asked.
pub fn configure(dir: &Path, add_repo_root: Option<&str>) -> Result<()> {
    let mut config = Configuration::load(dir)?;

    if let Some(root) = add_repo_root {
        if config.add_repo_root(root, lookup_var)? {
            config.save()?;
            println!("{} Added {}", "✓".green(), root.cyan());
        } else {
            println!("{} {} is already configured", "✓".green(), root.cyan());
        }
    }

    println!(
        "{}",
        format!("Current Configuration ({}):", config.config_file().display())
            .green()
            .bold()
    );
    println!("  {}", "Repository Roots".green());
    if config.repo_roots.is_empty() {
        println!("    {}", "(none)".dimmed());
    }
    for root in &config.repo_roots {
        println!("    - {}", root);
    }
    println!("  {} {}", "Repository index:".dimmed(), config.repo_index.display());
    println!("  {} {}", "Project index:".dimmed(), config.project_index.display());

    Ok(())
}
