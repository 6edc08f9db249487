use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// What went wrong with a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileErrorKind {
    /// Could not be read (permissions, I/O fault)
    Read,
    /// Content is not valid UTF-8
    Binary,
    /// New content was computed but could not be written
    Write,
    /// Traversal could not inspect the entry
    Walk,
}

/// A per-file failure. Recorded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub kind: FileErrorKind,
    pub message: String,
}

impl FileError {
    pub fn new(path: PathBuf, kind: FileErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Outcome of a run.
///
/// Modified files and counts describe intended changes: when a write fails the
/// path shows up both in `modified_files` and in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Candidates considered
    pub files_scanned: usize,

    /// Files whose content changed (or would change)
    pub files_modified: usize,

    /// Individual substitutions across all files and rules
    pub total_replacements: usize,

    /// Changed files in processing order
    pub modified_files: Vec<PathBuf>,

    /// Files that could not be processed
    pub errors: Vec<FileError>,

    /// Set when a cancel flag stopped the run early
    pub cancelled: bool,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_scanned(&mut self) {
        self.files_scanned += 1;
    }

    pub fn record_modified(&mut self, path: PathBuf, num_replacements: usize) {
        self.files_modified += 1;
        self.total_replacements += num_replacements;
        self.modified_files.push(path);
    }

    pub fn record_error(&mut self, error: FileError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// One-line human summary
    pub fn summary_line(&self, dry_run: bool) -> String {
        let (scan, modify, make) = outcome_labels(dry_run);

        format!(
            "{} {} file{}, {} {} file{}, {} {} replacement{}",
            scan,
            self.files_scanned,
            plural(self.files_scanned),
            modify.to_lowercase(),
            self.files_modified,
            plural(self.files_modified),
            make.to_lowercase(),
            self.total_replacements,
            plural(self.total_replacements)
        )
    }
}

/// Verbs for the scanned/modified/replacements counts, worded for a real or
/// a dry run
pub fn outcome_labels(dry_run: bool) -> (&'static str, &'static str, &'static str) {
    if dry_run {
        ("Would process", "Would modify", "Would make")
    } else {
        ("Processed", "Modified", "Made")
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
