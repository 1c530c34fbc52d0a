//! Index building.
//!
//! Walks every configured root, collects records, and writes the
//! repository or project index in one atomic save.

use crate::dedup::dedup;
use crate::projects::scan_repo_for_projects;
use crate::remote::RemoteResolver;
use crate::walker::{locate_repos, normalize_root, WalkOptions};
use griffin_core::{
    expand_placeholders, Configuration, LocationKind, LocationRecord, PersistenceError,
    ProjectRecord,
};
use griffin_store::{IndexStore, RepoFilter};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of building the repository index.
#[derive(Debug, Default)]
pub struct IndexResult {
    /// Records in root order, each kept once.
    pub records: Vec<LocationRecord>,

    /// Number of git working directories indexed.
    pub repositories: usize,

    /// Number of archive markers indexed.
    pub archives: usize,

    /// Number of synthesized directory records.
    pub directories: usize,

    /// Entries that could not be walked, as (path, error).
    pub skipped: Vec<(String, String)>,

    /// Repositories left out because their remote could not be read.
    pub failed_lookups: Vec<String>,

    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Result of building the project index.
#[derive(Debug, Default)]
pub struct ProjectIndexResult {
    pub projects: Vec<ProjectRecord>,

    /// Number of repositories scanned for projects.
    pub repositories_scanned: usize,

    pub skipped: Vec<(String, String)>,

    pub duration_ms: u64,
}

/// Expands the configured roots with `lookup`.
///
/// A root that fails to expand is logged and left out; the rest still get
/// indexed.
pub fn expand_roots<F>(config: &Configuration, lookup: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    config
        .repo_roots
        .iter()
        .filter_map(|root| match expand_placeholders(root, &lookup) {
            Ok(expanded) => Some(PathBuf::from(expanded)),
            Err(e) => {
                warn!("Ignoring root '{}': {}", root, e);
                None
            }
        })
        .collect()
}

/// Walks `roots` in order and collects their records without saving.
///
/// A root that names an already walked directory is skipped, and records
/// repeated across roots are kept once.
pub fn index_roots(
    roots: &[PathBuf],
    resolver: &dyn RemoteResolver,
    options: &WalkOptions,
) -> IndexResult {
    let start = Instant::now();
    let mut result = IndexResult::default();
    let mut walked = HashSet::new();

    for root in roots {
        if !walked.insert(normalize_root(root)) {
            debug!("Root {} already scanned", root.display());
            continue;
        }
        let scan = locate_repos(root, resolver, options);

        result.skipped.extend(
            scan.skipped
                .iter()
                .map(|e| (e.path.display().to_string(), e.source.to_string())),
        );
        result
            .failed_lookups
            .extend(scan.failed_lookups.iter().map(ToString::to_string));
        result.records.extend(scan.records);
    }
    result.records = dedup(std::mem::take(&mut result.records));

    for record in &result.records {
        match record.kind {
            LocationKind::Directory => result.directories += 1,
            LocationKind::Archive => result.archives += 1,
            _ => result.repositories += 1,
        }
    }

    let duration = start.elapsed();
    result.duration_ms = duration.as_millis() as u64;
    info!(
        "Indexed {} repositories, {} archives, {} directories in {:?}",
        result.repositories, result.archives, result.directories, duration
    );
    result
}

/// Rebuilds the repository index from the configured roots.
///
/// Zero roots is fine and writes an empty index. The only error is
/// failing to write the index, in which case the previous one is kept.
pub fn build_repo_index<F>(
    config: &Configuration,
    lookup: F,
    resolver: &dyn RemoteResolver,
    options: &WalkOptions,
) -> Result<IndexResult, PersistenceError>
where
    F: Fn(&str) -> Option<String>,
{
    let roots = expand_roots(config, lookup);
    if roots.is_empty() {
        warn!("No repository roots configured");
    }

    let result = index_roots(&roots, resolver, options);
    IndexStore::new(&config.repo_index).save(&result.records)?;
    Ok(result)
}

/// Scans the git repositories in `repos` for projects.
///
/// Archives and directory records are not scanned.
pub fn index_projects(repos: &[LocationRecord], options: &WalkOptions) -> ProjectIndexResult {
    let start = Instant::now();
    let mut result = ProjectIndexResult::default();

    for repo in repos.iter().filter(|r| r.kind.is_git()) {
        let (projects, skipped) = scan_repo_for_projects(&repo.full_path(), options.follow_symlinks);
        result.repositories_scanned += 1;
        result.projects.extend(projects);
        result.skipped.extend(
            skipped
                .iter()
                .map(|e| (e.path.display().to_string(), e.source.to_string())),
        );
    }

    result.projects = dedup(std::mem::take(&mut result.projects));
    result.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Found {} projects in {} repositories",
        result.projects.len(),
        result.repositories_scanned
    );
    result
}

/// Rebuilds the project index from the current repository index.
pub fn build_project_index(
    config: &Configuration,
    options: &WalkOptions,
) -> Result<ProjectIndexResult, PersistenceError> {
    let filter = RepoFilter {
        archives: false,
        dirs: false,
    };
    let repos = IndexStore::new(&config.repo_index).load_repos(filter)?;

    let result = index_projects(&repos, options);
    IndexStore::new(&config.project_index).save(&result.projects)?;
    Ok(result)
}
