//! Griffin Walker - finding repositories and building indexes
//!
//! This crate handles the file system side of things:
//! - Classifying entries as git working directories, archive markers or
//!   plain directories
//! - Reading and normalizing `origin` remotes through `git`
//! - Walking scan roots and synthesizing records for intermediate folders
//! - Scanning indexed repositories for projects
//!
//! A walk never aborts because of one bad entry. Unreadable nodes and
//! repositories without a usable remote are logged and reported in the
//! result; only failing to write the index is an error.

mod classify;
mod dedup;
mod indexer;
mod projects;
mod remote;
mod walker;

pub use classify::{classify, parse_archive_line, NodeClass};
pub use dedup::dedup;
pub use indexer::{
    build_project_index, build_repo_index, expand_roots, index_projects, index_roots,
    IndexResult, ProjectIndexResult,
};
pub use projects::{detect_language, scan_repo_for_projects, SKIPPED_DIRS};
pub use remote::{classify_host, normalize_remote_url, GitCli, RemoteResolver};
pub use walker::{
    classified_nodes, dir_and_name, locate_repos, ClassifiedNode, ClassifiedWalk, RootScan,
    WalkOptions,
};
