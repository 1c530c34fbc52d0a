//! Error types shared across Griffin.
//!
//! Most of these never stop an index build. A walk logs a
//! [`TraversalError`] or [`RemoteLookupError`] and moves on, and a load
//! drops rows that raise a [`ParseError`]. Only [`PersistenceError`] is
//! surfaced to the caller of a build.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// A single filesystem entry could not be visited.
#[derive(Error, Debug)]
#[error("cannot walk '{path}': {source}")]
pub struct TraversalError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl TraversalError {
    pub fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// The origin remote of a working directory could not be read.
#[derive(Error, Debug)]
pub enum RemoteLookupError {
    /// The version-control tool could not be started at all.
    #[error("failed to run '{program}' in '{dir}': {source}")]
    Spawn {
        program: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but exited non-zero, usually because there is no
    /// `origin` remote.
    #[error("failed to get git remote for '{dir}' ({status}): {stderr}")]
    Failed {
        dir: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    /// The tool succeeded but printed nothing.
    #[error("git remote for '{0}' is empty")]
    Empty(PathBuf),
}

/// A row of an index file is malformed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("unknown location kind '{0}'")]
    UnknownKind(String),

    #[error("base directory is empty")]
    EmptyBaseDir,
}

/// An index file could not be written or read as a whole.
#[derive(Error, Debug)]
#[error("index file '{path}': {source}")]
pub struct PersistenceError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl PersistenceError {
    pub fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// Configuration could not be read, written or expanded.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unclosed variable reference in path: {0}")]
    UnclosedVariable(String),

    #[error("variable not set: {0}")]
    UnsetVariable(String),

    #[error("directory does not exist: {expanded} (expanded from {original})")]
    MissingDirectory { original: String, expanded: String },
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
