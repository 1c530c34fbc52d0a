//! Location records.
//!
//! A record never stores an absolute path directly. It stores the pair
//! `(base_dir, full_name)` and readers reassemble the location by joining
//! them. For a scan root the pair is `(parent, basename)`; for anything
//! below the root it is `(root, path relative to root)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Remote URL placeholder carried by plain directory records.
pub const NO_REMOTE: &str = "-";

/// What a record points at.
///
/// The set is closed: the index file stores the tag from [`fmt::Display`]
/// and anything else fails to parse. Serde uses the same tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationKind {
    /// An intermediate folder between a scan root and a repository.
    #[serde(rename = "dir")]
    Directory,
    /// A bare-repository pointer file left by an archiving workflow.
    #[serde(rename = "archive")]
    Archive,
    /// A working directory whose origin is hosted on GitHub.
    #[serde(rename = "github")]
    Github,
    /// A working directory whose origin is hosted on GitLab.
    #[serde(rename = "gitlab")]
    Gitlab,
    /// A working directory with some other origin.
    #[serde(rename = "unknown")]
    UnknownGit,
}

impl LocationKind {
    /// True for live git working directories, whatever the host.
    pub fn is_git(&self) -> bool {
        matches!(self, Self::Github | Self::Gitlab | Self::UnknownGit)
    }

    /// The tag written to the index file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Directory => "dir",
            Self::Archive => "archive",
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::UnknownGit => "unknown",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dir" => Ok(Self::Directory),
            "archive" => Ok(Self::Archive),
            "github" => Ok(Self::Github),
            "gitlab" => Ok(Self::Gitlab),
            "unknown" => Ok(Self::UnknownGit),
            other => Err(other.to_string()),
        }
    }
}

/// One entry of the repository index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    /// Directory the entry is named relative to.
    pub base_dir: String,
    /// Path of the entry below `base_dir`; may contain separators.
    pub full_name: String,
    /// Normalized HTTPS remote, or [`NO_REMOTE`] for directories.
    pub remote_url: String,
    pub kind: LocationKind,
}

impl LocationRecord {
    /// A git working directory.
    pub fn repository(
        base_dir: impl Into<String>,
        full_name: impl Into<String>,
        remote_url: impl Into<String>,
        kind: LocationKind,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            full_name: full_name.into(),
            remote_url: remote_url.into(),
            kind,
        }
    }

    /// An archive marker file.
    pub fn archive(
        base_dir: impl Into<String>,
        full_name: impl Into<String>,
        remote_url: impl Into<String>,
    ) -> Self {
        Self::repository(base_dir, full_name, remote_url, LocationKind::Archive)
    }

    /// A plain directory. Always carries the [`NO_REMOTE`] placeholder.
    pub fn directory(base_dir: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self::repository(base_dir, full_name, NO_REMOTE, LocationKind::Directory)
    }

    /// `base_dir` joined with `full_name`.
    pub fn full_path(&self) -> PathBuf {
        PathBuf::from(&self.base_dir).join(&self.full_name)
    }
}

/// One entry of the project index: a directory holding a build or
/// dependency manifest somewhere inside an indexed repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub base_dir: String,
    pub full_name: String,
    /// Language tag derived from the manifest, e.g. `go` or `node`.
    pub language: String,
}

impl ProjectRecord {
    pub fn new(
        base_dir: impl Into<String>,
        full_name: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            full_name: full_name.into(),
            language: language.into(),
        }
    }

    /// `base_dir` joined with `full_name`.
    pub fn full_path(&self) -> PathBuf {
        PathBuf::from(&self.base_dir).join(&self.full_name)
    }

    /// The string project queries match against.
    pub fn search_key(&self) -> String {
        format!("{}/{}", self.base_dir, self.full_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_parse_back() {
        for kind in [
            LocationKind::Directory,
            LocationKind::Archive,
            LocationKind::Github,
            LocationKind::Gitlab,
            LocationKind::UnknownGit,
        ] {
            assert_eq!(kind.to_string().parse::<LocationKind>(), Ok(kind));
        }
        assert!("bitbucket".parse::<LocationKind>().is_err());
    }

    #[test]
    fn test_serde_uses_index_tags() {
        for kind in [
            LocationKind::Directory,
            LocationKind::Archive,
            LocationKind::Github,
            LocationKind::Gitlab,
            LocationKind::UnknownGit,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(serde_json::from_str::<LocationKind>(&json).unwrap(), kind);
        }

        let record = LocationRecord::repository(
            "/home/u/code",
            "svc",
            "https://git.example.com/svc",
            LocationKind::UnknownGit,
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["baseDir"], "/home/u/code");
        assert_eq!(value["remoteUrl"], "https://git.example.com/svc");
        assert_eq!(value["kind"], "unknown");
    }

    #[test]
    fn test_directory_uses_placeholder_remote() {
        let record = LocationRecord::directory("/home/u/code", "team");
        assert_eq!(record.remote_url, NO_REMOTE);
        assert_eq!(record.kind, LocationKind::Directory);
        assert!(!record.kind.is_git());
    }

    #[test]
    fn test_full_path_joins_nested_name() {
        let record = LocationRecord::repository(
            "/home/u/code",
            "team/svc",
            "https://gitlab.com/team/svc",
            LocationKind::Gitlab,
        );
        assert_eq!(record.full_path(), PathBuf::from("/home/u/code/team/svc"));
    }

    #[test]
    fn test_project_search_key() {
        let project = ProjectRecord::new("/home/u/code/svc", "api", "go");
        assert_eq!(project.search_key(), "/home/u/code/svc/api");
    }
}
