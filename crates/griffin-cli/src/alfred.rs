//! Alfred script-filter output.
//!
//! Each match becomes an item whose `arg` is the local path. Holding
//! `alt` opens the remote in a browser; holding `ctrl` opens the path in
//! an editor.

use griffin_core::{LocationKind, LocationRecord, ProjectRecord};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
struct Feedback {
    items: Vec<Item>,
}

#[derive(Debug, Serialize)]
struct Item {
    valid: bool,
    uid: String,
    title: String,
    subtitle: String,
    arg: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    mods: BTreeMap<&'static str, Modifier>,
    icon: Icon,
}

#[derive(Debug, Serialize)]
struct Modifier {
    valid: bool,
    arg: String,
    subtitle: String,
}

#[derive(Debug, Serialize)]
struct Icon {
    path: String,
}

impl Item {
    fn new(name: &str, path: String, icon: &str) -> Self {
        Self {
            valid: true,
            uid: name.to_string(),
            title: name.to_string(),
            subtitle: format!("Open in TERMINAL (🖥️) : {}", path),
            arg: path,
            mods: BTreeMap::new(),
            icon: Icon {
                path: format!("icons/{}.jpg", icon),
            },
        }
    }

    fn with_web(mut self, url: &str) -> Self {
        self.mods.insert(
            "alt",
            Modifier {
                valid: true,
                arg: url.to_string(),
                subtitle: format!("Open in WEB (☁️): {}", url),
            },
        );
        self
    }

    fn with_editor(mut self) -> Self {
        self.mods.insert(
            "ctrl",
            Modifier {
                valid: true,
                arg: self.arg.clone(),
                subtitle: format!("Open in EDITOR (📝): {}", self.arg),
            },
        );
        self
    }
}

fn repo_item(record: &LocationRecord) -> Item {
    let path = record.full_path().to_string_lossy().to_string();
    let item = Item::new(&record.full_name, path, record.kind.as_str());

    match record.kind {
        LocationKind::Directory => item,
        LocationKind::Archive => item.with_web(&record.remote_url),
        LocationKind::Github | LocationKind::Gitlab | LocationKind::UnknownGit => {
            item.with_web(&record.remote_url).with_editor()
        }
    }
}

fn project_item(project: &ProjectRecord) -> Item {
    let path = project.full_path().to_string_lossy().to_string();
    Item::new(&project.full_name, path, &project.language).with_editor()
}

pub fn repos_as_alfred(records: &[&LocationRecord]) -> serde_json::Result<String> {
    let feedback = Feedback {
        items: records.iter().map(|r| repo_item(r)).collect(),
    };
    serde_json::to_string_pretty(&feedback)
}

pub fn projects_as_alfred(projects: &[&ProjectRecord]) -> serde_json::Result<String> {
    let feedback = Feedback {
        items: projects.iter().map(|p| project_item(p)).collect(),
    };
    serde_json::to_string_pretty(&feedback)
}
