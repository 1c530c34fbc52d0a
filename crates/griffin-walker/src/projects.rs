//! Finding projects inside repositories.
//!
//! A project is any directory with a recognizable build or dependency
//! manifest. Unlike repositories, projects nest: a monorepo root with a
//! `Makefile` and its `services/api/go.mod` are both projects.

use crate::walker::{dir_and_name, traversal_error, unstorable_error};
use griffin_core::{ProjectRecord, TraversalError};
use griffin_store::IndexRow;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Directory names never descended into.
pub const SKIPPED_DIRS: &[&str] = &[
    ".git",
    ".terraform",
    "node_modules",
    ".venv",
    "venv",
    "target",
    "build",
];

/// Manifest files and the language they imply, checked in order.
const LANGUAGE_MARKERS: &[(&str, &str)] = &[
    ("build.gradle.kts", "kotlin"),
    ("build.gradle", "java"),
    ("pom.xml", "java"),
    ("go.mod", "go"),
    ("Pipfile", "python"),
    ("requirements.txt", "python"),
    ("package.json", "node"),
];

/// Fallback marker for projects in no particular language.
const GENERIC_MARKER: (&str, &str) = ("Makefile", "Any");

/// Returns the language tag of the project rooted at `dir`, if any.
pub fn detect_language(dir: &Path) -> Option<&'static str> {
    LANGUAGE_MARKERS
        .iter()
        .chain(std::iter::once(&GENERIC_MARKER))
        .find(|(file, _)| dir.join(file).exists())
        .map(|(_, language)| *language)
}

fn is_skipped(name: &std::ffi::OsStr) -> bool {
    name.to_str()
        .map(|n| SKIPPED_DIRS.contains(&n))
        .unwrap_or(false)
}

/// Walks one repository and returns its projects, plus any entries that
/// could not be visited.
pub fn scan_repo_for_projects(
    repo_dir: &Path,
    follow_symlinks: bool,
) -> (Vec<ProjectRecord>, Vec<TraversalError>) {
    let root: PathBuf = repo_dir.components().collect();
    let mut projects = Vec::new();
    let mut skipped = Vec::new();

    let walker = WalkDir::new(&root)
        .follow_links(follow_symlinks)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && is_skipped(e.file_name())));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let error = traversal_error(&root, e);
                warn!("{}", error);
                skipped.push(error);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        if let Some(language) = detect_language(entry.path()) {
            let (base_dir, full_name) = dir_and_name(&root, entry.path());
            let project = ProjectRecord::new(base_dir, full_name, language);
            if project.is_storable() {
                projects.push(project);
            } else {
                let error = unstorable_error(entry.into_path());
                warn!("{}", error);
                skipped.push(error);
            }
        }
    }

    (projects, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_detect_language_order() {
        let dir = tempdir().unwrap();
        assert_eq!(detect_language(dir.path()), None);

        fs::write(dir.path().join("Makefile"), "all:").unwrap();
        assert_eq!(detect_language(dir.path()), Some("Any"));

        fs::write(dir.path().join("package.json"), "{}").unwrap();
        assert_eq!(detect_language(dir.path()), Some("node"));

        fs::write(dir.path().join("build.gradle"), "").unwrap();
        fs::write(dir.path().join("build.gradle.kts"), "").unwrap();
        assert_eq!(detect_language(dir.path()), Some("kotlin"));
    }

    #[test]
    fn test_scan_finds_nested_projects() {
        let dir = tempdir().unwrap();
        let repo = dir.path().join("mono");
        fs::create_dir_all(repo.join("services/api")).unwrap();
        fs::create_dir_all(repo.join("web")).unwrap();
        fs::write(repo.join("Makefile"), "all:").unwrap();
        fs::write(repo.join("services/api/go.mod"), "module api").unwrap();
        fs::write(repo.join("web/package.json"), "{}").unwrap();

        let (projects, skipped) = scan_repo_for_projects(&repo, false);
        assert!(skipped.is_empty());

        let base = repo.to_string_lossy().to_string();
        assert_eq!(
            projects,
            vec![
                ProjectRecord::new(dir.path().to_string_lossy(), "mono", "Any"),
                ProjectRecord::new(&base, "services/api", "go"),
                ProjectRecord::new(&base, "web", "node"),
            ]
        );
    }

    #[test]
    fn test_scan_skips_vendored_dirs() {
        let dir = tempdir().unwrap();
        let repo = dir.path().join("app");
        fs::create_dir_all(repo.join("node_modules/left-pad")).unwrap();
        fs::create_dir_all(repo.join(".venv/lib")).unwrap();
        fs::write(repo.join("node_modules/left-pad/package.json"), "{}").unwrap();
        fs::write(repo.join(".venv/lib/requirements.txt"), "").unwrap();
        fs::write(repo.join("package.json"), "{}").unwrap();

        let (projects, _) = scan_repo_for_projects(&repo, false);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].full_name, "app");
        assert_eq!(projects[0].language, "node");
    }

    #[test]
    fn test_scan_skips_unstorable_project_names() {
        let dir = tempdir().unwrap();
        let repo = dir.path().join("app");
        fs::create_dir_all(repo.join("tools;old")).unwrap();
        fs::write(repo.join("go.mod"), "module app").unwrap();
        fs::write(repo.join("tools;old/go.mod"), "module old").unwrap();

        let (projects, skipped) = scan_repo_for_projects(&repo, false);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].full_name, "app");
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].path, repo.join("tools;old"));
    }
}
