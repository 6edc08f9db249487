//! Bulk find-and-replace across a directory tree.
//!
//! ```no_run
//! use stringle::{replace_in_files, ReplaceOptions};
//!
//! let options = ReplaceOptions {
//!     include_extensions: Some(vec![".py".to_string()]),
//!     dry_run: true,
//!     ..ReplaceOptions::default()
//! };
//! let stats = replace_in_files("/path/to/project", [("old_name", "new_name")], &options)?;
//! println!("{} files would change", stats.files_modified);
//! # Ok::<(), stringle::StringleError>(())
//! ```
pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod replace;
pub mod selector;

pub use api::{replace_in_files, Job, ReplaceOptions};
pub use crate::core::{Result, StringleError};
pub use replace::{FileError, FileErrorKind, ReplacementRule, Replacer, RunConfig, Statistics};
pub use selector::{Directory, FilterConfig};
