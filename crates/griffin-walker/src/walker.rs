//! Walking a scan root.
//!
//! The walk is split in two. [`classified_nodes`] is a lazy, depth-first,
//! pre-order sequence of classified entries that never descends into a
//! git working directory. [`locate_repos`] folds that sequence into
//! records, resolving remotes and adding a directory record for every
//! folder between the root and each repository.

use crate::classify::{classify, NodeClass};
use crate::dedup::dedup;
use crate::remote::{classify_host, normalize_remote_url, RemoteResolver};
use griffin_core::{LocationRecord, RemoteLookupError, TraversalError};
use griffin_store::IndexRow;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Options for walking a scan root.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Follow symbolic links when walking directories. Link cycles show
    /// up as skipped nodes.
    pub follow_symlinks: bool,
}

/// One entry worth looking at: a directory or an archive marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedNode {
    pub path: PathBuf,
    pub class: NodeClass,
}

/// Lazy classified walk over one root. Not restartable.
pub struct ClassifiedWalk {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

/// Starts a classified walk at `root`. Siblings are visited in file name
/// order so repeated builds produce the same index.
pub fn classified_nodes(root: &Path, options: &WalkOptions) -> ClassifiedWalk {
    let root = normalize_root(root);
    let inner = WalkDir::new(&root)
        .follow_links(options.follow_symlinks)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter();

    ClassifiedWalk { root, inner }
}

impl Iterator for ClassifiedWalk {
    type Item = Result<ClassifiedNode, TraversalError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(traversal_error(&self.root, e))),
            };

            let class = classify(entry.path(), entry.file_type());
            match class {
                NodeClass::Other => continue,
                NodeClass::GitWorkdir => self.inner.skip_current_dir(),
                NodeClass::Directory | NodeClass::ArchiveMarker { .. } => {}
            }

            return Some(Ok(ClassifiedNode {
                path: entry.into_path(),
                class,
            }));
        }
    }
}

/// Converts a walk failure, falling back to `root` when the entry has no
/// path. Symlink loops carry no I/O error and keep walkdir's message.
pub(crate) fn traversal_error(root: &Path, e: walkdir::Error) -> TraversalError {
    let path = e
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    let message = e.to_string();
    let source = e
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
    TraversalError::new(path, source)
}

/// Error for an entry whose name cannot be stored in an index row.
pub(crate) fn unstorable_error(path: PathBuf) -> TraversalError {
    TraversalError::new(
        path,
        io::Error::new(
            io::ErrorKind::InvalidData,
            "name contains the index delimiter or a line break",
        ),
    )
}

/// Everything one root produced.
#[derive(Debug, Default)]
pub struct RootScan {
    /// Deduplicated records in discovery order.
    pub records: Vec<LocationRecord>,

    /// Entries that could not be visited.
    pub skipped: Vec<TraversalError>,

    /// Working directories whose remote could not be read. They have no
    /// record and their subtrees were not walked.
    pub failed_lookups: Vec<RemoteLookupError>,
}

impl RootScan {
    /// Keeps `record` if it can be saved, otherwise reports it as skipped.
    fn keep(&mut self, record: LocationRecord) -> bool {
        if record.is_storable() {
            self.records.push(record);
            return true;
        }
        let error = unstorable_error(record.full_path());
        warn!("{}", error);
        self.skipped.push(error);
        false
    }

    fn visit(&mut self, root: &Path, node: ClassifiedNode, resolver: &dyn RemoteResolver) {
        match node.class {
            NodeClass::GitWorkdir => match resolver.origin_url(&node.path) {
                Ok(raw) => {
                    let url = normalize_remote_url(&raw);
                    let kind = classify_host(&url);
                    let (base_dir, full_name) = dir_and_name(root, &node.path);
                    debug!("Found {} repository {}/{}", kind, base_dir, full_name);

                    let record = LocationRecord::repository(base_dir, full_name, url, kind);
                    if self.keep(record) {
                        self.records.extend(ancestor_records(root, &node.path));
                    }
                }
                Err(e) => {
                    warn!("Skipping repository: {}", e);
                    self.failed_lookups.push(e);
                }
            },
            NodeClass::ArchiveMarker { remote_url } => {
                let (base_dir, full_name) = dir_and_name(root, &node.path);
                debug!("Found archive {}/{}", base_dir, full_name);
                self.keep(LocationRecord::archive(
                    base_dir,
                    full_name,
                    normalize_remote_url(&remote_url),
                ));
            }
            NodeClass::Directory | NodeClass::Other => {}
        }
    }
}

/// Walks one root and returns its records.
///
/// Failures on single entries are logged and collected; they never stop
/// the walk. A root that does not exist yields one skipped entry and no
/// records.
pub fn locate_repos(root: &Path, resolver: &dyn RemoteResolver, options: &WalkOptions) -> RootScan {
    let root = normalize_root(root);
    info!("Scanning {}", root.display());

    let mut scan = classified_nodes(&root, options).fold(RootScan::default(), |mut scan, node| {
        match node {
            Ok(node) => scan.visit(&root, node, resolver),
            Err(e) => {
                warn!("{}", e);
                scan.skipped.push(e);
            }
        }
        scan
    });

    scan.records = dedup(scan.records);
    info!(
        "Found {} locations under {} ({} skipped, {} without remote)",
        scan.records.len(),
        root.display(),
        scan.skipped.len(),
        scan.failed_lookups.len()
    );
    scan
}

/// Splits a path under `root` into the `(base_dir, full_name)` pair a
/// record stores.
///
/// The root itself is named by its basename under its parent. Anything
/// deeper is named relative to the root.
pub fn dir_and_name(root: &Path, path: &Path) -> (String, String) {
    if path == root {
        let base = root.parent().unwrap_or(root);
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        (base.to_string_lossy().to_string(), name)
    } else {
        let name = path.strip_prefix(root).unwrap_or(path);
        (
            root.to_string_lossy().to_string(),
            name.to_string_lossy().to_string(),
        )
    }
}

/// Directory records for every folder strictly between `root` and `path`,
/// nearest first.
fn ancestor_records<'a>(
    root: &'a Path,
    path: &'a Path,
) -> impl Iterator<Item = LocationRecord> + 'a {
    path.ancestors()
        .skip(1)
        .take_while(move |dir| *dir != root && dir.starts_with(root))
        .map(move |dir| {
            let (base_dir, full_name) = dir_and_name(root, dir);
            LocationRecord::directory(base_dir, full_name)
        })
}

/// Drops trailing separators and `.` components so prefix stripping and
/// root comparisons line up with what the walk yields.
pub(crate) fn normalize_root(root: &Path) -> PathBuf {
    root.components().collect()
}
