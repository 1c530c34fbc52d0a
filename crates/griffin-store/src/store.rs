use griffin_core::{
    LocationKind, LocationRecord, ParseError, PersistenceError, ProjectRecord, NO_REMOTE,
};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Field separator. Not a comma, so URLs and paths with commas survive.
/// Fields are never escaped; callers keep this character out of them.
pub const DELIMITER: char = ';';

/// A value that can be written as one index row and read back.
pub trait IndexRow: Sized {
    /// Number of fields in a row.
    const FIELDS: usize;

    /// Fields in file order.
    fn to_fields(&self) -> Vec<&str>;

    /// Builds a value from exactly [`IndexRow::FIELDS`] fields.
    fn from_fields(fields: &[&str]) -> Result<Self, ParseError>;

    /// True when no field holds the delimiter or a line break, so the row
    /// reads back exactly as written.
    fn is_storable(&self) -> bool {
        self.to_fields()
            .iter()
            .all(|field| !field.contains(|c: char| c == DELIMITER || c == '\n' || c == '\r'))
    }

    /// Splits and parses one line of an index file.
    fn parse_row(line: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split(DELIMITER).collect();
        if fields.len() != Self::FIELDS {
            return Err(ParseError::FieldCount {
                expected: Self::FIELDS,
                found: fields.len(),
            });
        }
        Self::from_fields(&fields)
    }
}

impl IndexRow for LocationRecord {
    const FIELDS: usize = 4;

    fn to_fields(&self) -> Vec<&str> {
        vec![
            self.base_dir.as_str(),
            self.full_name.as_str(),
            self.remote_url.as_str(),
            self.kind.as_str(),
        ]
    }

    fn from_fields(fields: &[&str]) -> Result<Self, ParseError> {
        let (base_dir, full_name, remote_url, kind) = (fields[0], fields[1], fields[2], fields[3]);
        if base_dir.is_empty() {
            return Err(ParseError::EmptyBaseDir);
        }

        let kind: LocationKind = kind.parse().map_err(ParseError::UnknownKind)?;
        let remote_url = match kind {
            LocationKind::Directory => NO_REMOTE,
            _ => remote_url,
        };

        Ok(LocationRecord::repository(base_dir, full_name, remote_url, kind))
    }
}

impl IndexRow for ProjectRecord {
    const FIELDS: usize = 3;

    fn to_fields(&self) -> Vec<&str> {
        vec![
            self.base_dir.as_str(),
            self.full_name.as_str(),
            self.language.as_str(),
        ]
    }

    fn from_fields(fields: &[&str]) -> Result<Self, ParseError> {
        if fields[0].is_empty() {
            return Err(ParseError::EmptyBaseDir);
        }
        Ok(ProjectRecord::new(fields[0], fields[1], fields[2]))
    }
}

/// Which record kinds survive a repository index load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepoFilter {
    pub archives: bool,
    pub dirs: bool,
}

impl Default for RepoFilter {
    fn default() -> Self {
        Self {
            archives: true,
            dirs: true,
        }
    }
}

impl RepoFilter {
    pub fn keeps(&self, record: &LocationRecord) -> bool {
        match record.kind {
            LocationKind::Archive => self.archives,
            LocationKind::Directory => self.dirs,
            _ => true,
        }
    }
}

/// A flat-file index at a fixed path.
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the index with `rows`.
    ///
    /// Rows go to a temp file in the same directory, which is flushed and
    /// then renamed over the index. On any error the old index is left
    /// untouched and the temp file is removed. Rows that would not read
    /// back (see [`IndexRow::is_storable`]) are logged and left out.
    pub fn save<R: IndexRow>(&self, rows: &[R]) -> Result<(), PersistenceError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| PersistenceError::new(dir, e))?;

        let tmp = NamedTempFile::new_in(dir).map_err(|e| PersistenceError::new(dir, e))?;
        let separator = DELIMITER.to_string();
        let mut written = 0;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            for row in rows {
                if !row.is_storable() {
                    warn!("Not saving row with reserved characters: {:?}", row.to_fields());
                    continue;
                }
                written += 1;
                writeln!(writer, "{}", row.to_fields().join(separator.as_str()))
                    .map_err(|e| PersistenceError::new(tmp.path(), e))?;
            }
            writer
                .flush()
                .map_err(|e| PersistenceError::new(tmp.path(), e))?;
        }

        tmp.persist(&self.path)
            .map_err(|e| PersistenceError::new(&self.path, e.error))?;

        info!("Saved {} rows to {}", written, self.path.display());
        Ok(())
    }

    /// Reads every well-formed row of the index.
    ///
    /// Malformed rows (wrong field count, unknown kind, invalid UTF-8) are
    /// skipped. Failing to open or read the file is an error.
    pub fn load<R: IndexRow>(&self) -> Result<Vec<R>, PersistenceError> {
        let file = File::open(&self.path).map_err(|e| PersistenceError::new(&self.path, e))?;
        let mut rows = Vec::new();

        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    debug!("Skipping row {}: {}", number + 1, e);
                    continue;
                }
                Err(e) => return Err(PersistenceError::new(&self.path, e)),
            };

            match R::parse_row(&line) {
                Ok(row) => rows.push(row),
                Err(e) => debug!("Skipping row {}: {}", number + 1, e),
            }
        }

        Ok(rows)
    }

    /// Loads the repository index, keeping only what `filter` allows.
    pub fn load_repos(&self, filter: RepoFilter) -> Result<Vec<LocationRecord>, PersistenceError> {
        let mut records: Vec<LocationRecord> = self.load()?;
        records.retain(|r| filter.keeps(r));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Vec<LocationRecord> {
        vec![
            LocationRecord::repository(
                "/home/u/code",
                "proj",
                "https://github.com/org/proj",
                LocationKind::Github,
            ),
            LocationRecord::directory("/home/u/code", "team"),
            LocationRecord::repository(
                "/home/u/code",
                "team/svc",
                "https://git.example.com/team/svc",
                LocationKind::UnknownGit,
            ),
            LocationRecord::archive("/home/u/code", "old.git", "https://gitlab.com/org/old"),
        ]
    }

    #[test]
    fn test_save_then_load_returns_same_records() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("repo.list"));

        store.save(&sample()).unwrap();
        let loaded: Vec<LocationRecord> = store.load().unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_file_format() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("repo.list"));
        store.save(&sample()[..2]).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            raw,
            "/home/u/code;proj;https://github.com/org/proj;github\n/home/u/code;team;-;dir\n"
        );
    }

    #[test]
    fn test_load_drops_malformed_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.list");
        fs::write(
            &path,
            "/a;b;https://github.com/o/b;github\n\
             too;few\n\
             /a;c;https://bitbucket.org/o/c;bitbucket\n\
             ;d;-;dir\n\
             \n\
             /a;e;-;dir\n",
        )
        .unwrap();

        let loaded: Vec<LocationRecord> = IndexStore::new(&path).load().unwrap();
        let names: Vec<_> = loaded.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["b", "e"]);
    }

    #[test]
    fn test_reserved_characters_are_not_saved() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("repo.list"));
        let good = LocationRecord::directory("/code", "team");
        let semicolon = LocationRecord::directory("/code", "a;b");
        let newline = LocationRecord::repository(
            "/code",
            "x\n/evil;fake;-",
            "https://github.com/o/x",
            LocationKind::Github,
        );
        assert!(good.is_storable());
        assert!(!semicolon.is_storable());
        assert!(!newline.is_storable());

        store.save(&[semicolon, good.clone(), newline]).unwrap();
        let loaded: Vec<LocationRecord> = store.load().unwrap();
        assert_eq!(loaded, vec![good]);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "/code;team;-;dir\n");
    }

    #[test]
    fn test_directory_rows_always_get_placeholder_remote() {
        let record = LocationRecord::parse_row("/a;team;https://x;dir").unwrap();
        assert_eq!(record.remote_url, NO_REMOTE);
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("repo.list"));

        store.save(&sample()).unwrap();
        store.save(&sample()[..1]).unwrap();

        let loaded: Vec<LocationRecord> = store.load().unwrap();
        assert_eq!(loaded.len(), 1);

        // Only the index itself remains; the temp file was renamed away
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_empty_index() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("nested").join("repo.list"));
        store.save::<LocationRecord>(&[]).unwrap();
        assert!(store.load::<LocationRecord>().unwrap().is_empty());
    }

    #[test]
    fn test_save_into_unwritable_location_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let store = IndexStore::new(blocker.join("repo.list"));
        assert!(store.save(&sample()).is_err());
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("repo.list"));
        assert!(store.load::<LocationRecord>().is_err());
    }

    #[test]
    fn test_project_rows() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("project.list"));
        let projects = vec![
            ProjectRecord::new("/home/u/code", "svc", "go"),
            ProjectRecord::new("/home/u/code/svc", "web", "node"),
        ];

        store.save(&projects).unwrap();
        let loaded: Vec<ProjectRecord> = store.load().unwrap();
        assert_eq!(loaded, projects);
    }

    #[test]
    fn test_repo_filter() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("repo.list"));
        store.save(&sample()).unwrap();

        let filter = RepoFilter {
            archives: false,
            dirs: false,
        };
        let loaded = store.load_repos(filter).unwrap();
        assert!(loaded.iter().all(|r| r.kind.is_git()));
        assert_eq!(loaded.len(), 2);

        assert_eq!(store.load_repos(RepoFilter::default()).unwrap().len(), 4);
    }
}
