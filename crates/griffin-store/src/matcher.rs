//! Filter-term matching.
//!
//! `griffin find-repo foo bar` finds every record whose name contains
//! `foo` and, somewhere after it, `bar`, ignoring case. Terms are literal
//! text, never regex syntax.

use griffin_core::{LocationRecord, ProjectRecord};
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("cannot compile filter pattern: {0}")]
pub struct MatchError(#[from] regex::Error);

/// Something a filter pattern can be tested against.
pub trait Searchable {
    fn search_key(&self) -> Cow<'_, str>;
}

impl Searchable for LocationRecord {
    /// Repositories match on their name below the scan root.
    fn search_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.full_name)
    }
}

impl Searchable for ProjectRecord {
    /// Projects match on the whole path, so the owning repository's name
    /// narrows the search too.
    fn search_key(&self) -> Cow<'_, str> {
        Cow::Owned(ProjectRecord::search_key(self))
    }
}

/// Compiles filter terms into one ordered-substring pattern.
///
/// No terms matches everything.
pub fn build_pattern<S: AsRef<str>>(terms: &[S]) -> Result<Regex, MatchError> {
    let pattern = if terms.is_empty() {
        ".*".to_string()
    } else {
        let escaped: Vec<String> = terms.iter().map(|t| regex::escape(t.as_ref())).collect();
        format!(".*{}.*", escaped.join(".*"))
    };

    Ok(RegexBuilder::new(&pattern).case_insensitive(true).build()?)
}

/// Keeps the items whose search key matches, in their original order.
fn matching<'a, T: Searchable>(items: &'a [T], pattern: &Regex) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| pattern.is_match(&item.search_key()))
        .collect()
}

pub fn match_repos<'a>(records: &'a [LocationRecord], pattern: &Regex) -> Vec<&'a LocationRecord> {
    matching(records, pattern)
}

pub fn match_projects<'a>(records: &'a [ProjectRecord], pattern: &Regex) -> Vec<&'a ProjectRecord> {
    matching(records, pattern)
}
