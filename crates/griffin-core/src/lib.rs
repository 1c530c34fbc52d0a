//! Griffin Core - records, errors and configuration
//!
//! This crate holds the value types every other Griffin crate agrees on.
//! A [`LocationRecord`] is one line of the repository index: a git
//! checkout, an archived bundle, or a plain directory sitting between a
//! scan root and a repository. A [`ProjectRecord`] is one line of the
//! project index.
//!
//! # Example
//!
//! ```
//! use griffin_core::{LocationKind, LocationRecord};
//!
//! let record = LocationRecord::repository(
//!     "/home/u/code",
//!     "proj",
//!     "https://github.com/org/proj",
//!     LocationKind::Github,
//! );
//! assert_eq!(record.full_path(), std::path::PathBuf::from("/home/u/code/proj"));
//! ```

pub mod config;
pub mod error;
pub mod record;

pub use config::{expand_placeholders, Configuration};
pub use error::{ConfigError, ParseError, PersistenceError, RemoteLookupError, TraversalError};
pub use record::{LocationKind, LocationRecord, ProjectRecord, NO_REMOTE};
