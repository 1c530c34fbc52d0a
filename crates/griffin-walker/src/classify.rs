//! Deciding what a filesystem entry is.

use std::fs::{self, File, FileType};
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Suffix shared by git metadata directories and archive markers.
const GIT_SUFFIX: &str = ".git";

/// What the walker found at a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeClass {
    /// A directory with a `.git` entry. The walk does not go below it.
    GitWorkdir,
    /// A `*.git` file whose first line names a remote. The URL is raw,
    /// exactly as written in the marker.
    ArchiveMarker { remote_url: String },
    /// A directory to keep descending into.
    Directory,
    /// Any other file; ignored.
    Other,
}

/// Classifies one entry. Costs at most one extra stat for directories
/// and one short read for `*.git` files.
pub fn classify(path: &Path, file_type: FileType) -> NodeClass {
    if file_type.is_dir() {
        // Worktrees and submodules have a `.git` file rather than a directory
        return if fs::symlink_metadata(path.join(GIT_SUFFIX)).is_ok() {
            NodeClass::GitWorkdir
        } else {
            NodeClass::Directory
        };
    }

    if !file_type.is_file() || !has_git_suffix(path) {
        return NodeClass::Other;
    }

    match read_first_line(path) {
        Some(line) => match parse_archive_line(&line) {
            Some(url) => NodeClass::ArchiveMarker {
                remote_url: url.to_string(),
            },
            None => {
                debug!("{} is not an archive marker", path.display());
                NodeClass::Other
            }
        },
        None => NodeClass::Other,
    }
}

/// Extracts the remote from an archive marker's first line.
///
/// Fields are separated by runs of whitespace; the remote is the second
/// one. Returns `None` when there is no second field.
pub fn parse_archive_line(line: &str) -> Option<&str> {
    line.split_whitespace().nth(1)
}

fn has_git_suffix(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(GIT_SUFFIX) && n != GIT_SUFFIX)
        .unwrap_or(false)
}

fn read_first_line(path: &Path) -> Option<String> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!("Cannot open {}: {}", path.display(), e);
            return None;
        }
    };

    let mut line = String::new();
    match BufReader::new(file).read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(e) => {
            debug!("Cannot read {}: {}", path.display(), e);
            None
        }
    }
}
