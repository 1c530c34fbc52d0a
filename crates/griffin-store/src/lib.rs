//! Griffin Store - the index file and lookups against it
//!
//! Indexes are plain text: one row per record, fields separated by
//! [`DELIMITER`]. A save writes a sibling temp file and renames it over
//! the index, so a concurrent lookup sees either the old snapshot or the
//! new one, never half of either.
//!
//! Lookups compile the user's filter terms into a single case-insensitive
//! pattern that requires every term to appear, in order.

mod matcher;
mod store;

pub use matcher::{build_pattern, match_projects, match_repos, MatchError, Searchable};
pub use store::{IndexRow, IndexStore, RepoFilter, DELIMITER};
