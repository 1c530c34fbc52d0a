//! Reading and normalizing remotes.

use griffin_core::{LocationKind, RemoteLookupError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::process::Command;
use tracing::debug;

static SSH_AUTHORITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^git@([a-zA-Z0-9.-]+):").expect("SSH authority pattern is valid")
});

/// Looks up the remote URL of a working directory.
///
/// Implemented by [`GitCli`] in production. Any
/// `Fn(&Path) -> Result<String, RemoteLookupError>` works too.
pub trait RemoteResolver {
    /// Returns the raw, unnormalized remote URL of `dir`.
    fn origin_url(&self, dir: &Path) -> Result<String, RemoteLookupError>;
}

impl<F> RemoteResolver for F
where
    F: Fn(&Path) -> Result<String, RemoteLookupError>,
{
    fn origin_url(&self, dir: &Path) -> Result<String, RemoteLookupError> {
        self(dir)
    }
}

/// Runs `git remote get-url <remote>` inside the working directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    remote: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git", "origin")
    }
}

impl GitCli {
    pub fn new(program: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            remote: remote.into(),
        }
    }
}

impl RemoteResolver for GitCli {
    fn origin_url(&self, dir: &Path) -> Result<String, RemoteLookupError> {
        debug!("Reading remote '{}' of {}", self.remote, dir.display());

        let output = Command::new(&self.program)
            .args(["remote", "get-url", self.remote.as_str()])
            .current_dir(dir)
            .output()
            .map_err(|source| RemoteLookupError::Spawn {
                program: self.program.clone(),
                dir: dir.to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            return Err(RemoteLookupError::Failed {
                dir: dir.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if url.is_empty() {
            return Err(RemoteLookupError::Empty(dir.to_path_buf()));
        }
        Ok(url)
    }
}

/// Rewrites a remote to its HTTPS form.
///
/// `git@host:` becomes `https://host/` and one trailing `.git` is dropped.
/// Anything else is passed through trimmed.
pub fn normalize_remote_url(url: &str) -> String {
    let url = SSH_AUTHORITY.replace(url.trim(), "https://${1}/");
    url.strip_suffix(".git").unwrap_or(&url[..]).to_string()
}

/// Classifies a normalized remote by host.
pub fn classify_host(url: &str) -> LocationKind {
    if url.contains("github") {
        LocationKind::Github
    } else if url.contains("gitlab") {
        LocationKind::Gitlab
    } else {
        LocationKind::UnknownGit
    }
}
