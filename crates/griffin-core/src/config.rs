//! Configuration.
//!
//! A [`Configuration`] is built once by the binary and handed to whatever
//! needs it. Nothing below this module looks at the process environment:
//! variable lookup for `${NAME}` placeholders is a closure supplied by the
//! caller.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE: &str = "config.json";
const REPO_INDEX_FILE: &str = "repo.list";
const PROJECT_INDEX_FILE: &str = "project.list";

/// The on-disk shape of `config.json`.
///
/// Keys Griffin does not understand (editor settings and the like) are
/// kept so that saving never drops them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserConfiguration {
    #[serde(rename = "repoRoots", default)]
    repo_roots: Vec<String>,

    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// Everything the index builders and lookups need to know.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Scan roots in the order they were configured, unexpanded.
    pub repo_roots: Vec<String>,

    /// Where the repository index lives.
    pub repo_index: PathBuf,

    /// Where the project index lives.
    pub project_index: PathBuf,

    config_file: PathBuf,
    extra: serde_json::Map<String, serde_json::Value>,
}

impl Configuration {
    /// A configuration with the given roots and both indexes inside `dir`.
    pub fn new(dir: &Path, repo_roots: Vec<String>) -> Self {
        Self {
            repo_roots,
            repo_index: dir.join(REPO_INDEX_FILE),
            project_index: dir.join(PROJECT_INDEX_FILE),
            config_file: dir.join(CONFIG_FILE),
            extra: serde_json::Map::new(),
        }
    }

    /// Loads `config.json` from `dir`.
    ///
    /// A missing file is not an error; it yields a configuration with no
    /// roots, which builds an empty index.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::new(dir, Vec::new());

        if !config.config_file.exists() {
            debug!("No configuration at {}", config.config_file.display());
            return Ok(config);
        }

        let raw = fs::read_to_string(&config.config_file)
            .map_err(|e| ConfigError::io(&config.config_file, e))?;
        let user: UserConfiguration =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
                path: config.config_file.clone(),
                source,
            })?;

        config.repo_roots = user.repo_roots;
        config.extra = user.extra;
        Ok(config)
    }

    /// Path of the backing `config.json`.
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Adds a scan root unless it is already configured.
    ///
    /// The root is stored as given (placeholders and all) but must expand to
    /// an existing directory. Returns whether the list changed.
    pub fn add_repo_root<F>(&mut self, root: &str, lookup: F) -> Result<bool, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_placeholders(root, lookup)?;
        if !Path::new(&expanded).is_dir() {
            return Err(ConfigError::MissingDirectory {
                original: root.to_string(),
                expanded,
            });
        }

        if self.repo_roots.iter().any(|r| r == root) {
            return Ok(false);
        }

        self.repo_roots.push(root.to_string());
        Ok(true)
    }

    /// Writes the configuration back to `config.json`, creating the
    /// directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(dir) = self.config_file.parent() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::io(dir, e))?;
        }

        let user = UserConfiguration {
            repo_roots: self.repo_roots.clone(),
            extra: self.extra.clone(),
        };
        let json = serde_json::to_string_pretty(&user).map_err(|source| ConfigError::Json {
            path: self.config_file.clone(),
            source,
        })?;

        fs::write(&self.config_file, json).map_err(|e| ConfigError::io(&self.config_file, e))
    }
}

/// Replaces every `${NAME}` in `path` with `lookup(NAME)`.
///
/// An empty value counts as unset.
pub fn expand_placeholders<F>(path: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| ConfigError::UnclosedVariable(path.to_string()))?;

        let name = &after[..end];
        match lookup(name) {
            Some(value) if !value.is_empty() => result.push_str(&value),
            _ => return Err(ConfigError::UnsetVariable(name.to_string())),
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn home(name: &str) -> Option<String> {
        (name == "HOME").then(|| "/home/u".to_string())
    }

    #[test]
    fn test_expand_home_placeholder() {
        assert_eq!(
            expand_placeholders("${HOME}/code", home).unwrap(),
            "/home/u/code"
        );
        assert_eq!(expand_placeholders("/srv/git", home).unwrap(), "/srv/git");
    }

    #[test]
    fn test_expand_rejects_unclosed_and_unset() {
        assert!(matches!(
            expand_placeholders("${HOME/code", home),
            Err(ConfigError::UnclosedVariable(_))
        ));
        assert!(matches!(
            expand_placeholders("${WORK}/code", home),
            Err(ConfigError::UnsetVariable(name)) if name == "WORK"
        ));
    }

    #[test]
    fn test_load_missing_file_has_no_roots() {
        let dir = tempdir().unwrap();
        let config = Configuration::load(dir.path()).unwrap();
        assert!(config.repo_roots.is_empty());
        assert_eq!(config.repo_index, dir.path().join("repo.list"));
        assert_eq!(config.project_index, dir.path().join("project.list"));
    }

    #[test]
    fn test_load_keeps_unknown_keys_on_save() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("config.json"),
            r#"{"repoRoots": ["${HOME}/code"], "ideConfiguration": {"default": "Zed"}}"#,
        )
        .unwrap();

        let config = Configuration::load(dir.path()).unwrap();
        assert_eq!(config.repo_roots, vec!["${HOME}/code".to_string()]);

        config.save().unwrap();
        let saved = fs::read_to_string(dir.path().join("config.json")).unwrap();
        assert!(saved.contains("ideConfiguration"));
        assert!(saved.contains("Zed"));
    }

    #[test]
    fn test_add_repo_root_once() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let mut config = Configuration::new(dir.path(), Vec::new());

        assert!(config.add_repo_root(&root, home).unwrap());
        assert!(!config.add_repo_root(&root, home).unwrap());
        assert_eq!(config.repo_roots.len(), 1);

        let missing = dir.path().join("nope").to_string_lossy().to_string();
        assert!(matches!(
            config.add_repo_root(&missing, home),
            Err(ConfigError::MissingDirectory { .. })
        ));
    }
}
