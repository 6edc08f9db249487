use indicatif::ProgressBar;
use rayon::prelude::*;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::rule::{ReplacementRule, RuleSet};
use super::stats::{FileError, FileErrorKind, Statistics};
use crate::core::Result;
use crate::selector::Directory;

/// Mode flags for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub case_sensitive: bool,
    pub use_regex: bool,
    /// Compute and report changes without writing them
    pub dry_run: bool,
    /// Process files on the rayon pool
    pub parallel: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            use_regex: false,
            dry_run: false,
            parallel: false,
        }
    }
}

/// Where modified content ends up. `original` is the content the file held
/// when it was read.
pub trait ContentSink: Send + Sync {
    fn write(&self, path: &Path, original: &str, content: &str) -> io::Result<()>;
}

/// Rewrites the file in place, keeping its inode, so hard links, owner and
/// mode stay as they were. A failed write puts the original content back.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSink;

impl ContentSink for FsSink {
    fn write(&self, path: &Path, original: &str, content: &str) -> io::Result<()> {
        if fs::metadata(path)?.permissions().readonly() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "file is read-only",
            ));
        }

        match write_in_place(path, content) {
            Ok(()) => Ok(()),
            Err(e) => match write_in_place(path, original) {
                Ok(()) => Err(e),
                Err(restore) => Err(io::Error::new(
                    e.kind(),
                    format!("{}; restoring the original content also failed: {}", e, restore),
                )),
            },
        }
    }
}

fn write_in_place(path: &Path, content: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Could not be read or decoded
    Unreadable(FileError),

    /// Rules left the content as it was
    Unchanged,

    /// Content changed. `write_error` is set when persisting failed.
    Modified {
        replacements: usize,
        write_error: Option<FileError>,
    },
}

enum Step {
    Walk(FileError),
    File(PathBuf, FileOutcome),
}

/// Applies an ordered rule list to files and tallies the results
pub struct Replacer {
    rules: RuleSet,
    config: RunConfig,
    sink: Box<dyn ContentSink>,
    progress: Option<ProgressBar>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Replacer {
    /// Compile and validate the rules. Fails on malformed regexes and duplicate
    /// patterns.
    pub fn new(rules: &[ReplacementRule], config: RunConfig) -> Result<Self> {
        let rules = RuleSet::compile(rules, config.case_sensitive, config.use_regex)?;

        Ok(Self {
            rules,
            config,
            sink: Box::new(FsSink),
            progress: None,
            cancel: None,
        })
    }

    pub fn with_sink(mut self, sink: impl ContentSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Stop between files once the flag is set
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Process an explicit list of files
    pub fn run<I>(&self, files: I) -> Statistics
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.run_candidates(files.into_iter().map(Ok))
    }

    /// Walk a directory and process everything it selects
    pub fn run_directory(&self, directory: &Directory) -> Statistics {
        self.run_candidates(directory.walk())
    }

    fn run_candidates<I>(&self, candidates: I) -> Statistics
    where
        I: Iterator<Item = std::result::Result<PathBuf, FileError>>,
    {
        info!(
            "Processing files with {} replacement rule(s){}",
            self.rules.len(),
            if self.config.dry_run { " (dry run)" } else { "" }
        );

        let mut stats = Statistics::new();

        if self.config.parallel {
            let candidates: Vec<_> = candidates.collect();
            let steps: Vec<Option<Step>> = candidates
                .into_par_iter()
                .map(|candidate| self.step(candidate))
                .collect();

            for step in steps {
                match step {
                    Some(step) => record(&mut stats, step),
                    None => stats.cancelled = true,
                }
            }
        } else {
            for candidate in candidates {
                match self.step(candidate) {
                    Some(step) => record(&mut stats, step),
                    None => {
                        stats.cancelled = true;
                        break;
                    }
                }
            }
        }

        info!(
            "Modified {} of {} file(s), {} replacement(s), {} error(s)",
            stats.files_modified,
            stats.files_scanned,
            stats.total_replacements,
            stats.errors.len()
        );

        stats
    }

    /// `None` once cancelled
    fn step(&self, candidate: std::result::Result<PathBuf, FileError>) -> Option<Step> {
        if self.is_cancelled() {
            return None;
        }

        let step = match candidate {
            Ok(path) => {
                let outcome = self.process_file(&path);
                Step::File(path, outcome)
            }
            Err(e) => Step::Walk(e),
        };

        if let Some(progress) = &self.progress {
            progress.inc(1);
        }

        Some(step)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Read, rewrite and (unless dry-running) persist a single file
    pub fn process_file(&self, path: &Path) -> FileOutcome {
        let content = match read_text(path) {
            Ok(content) => content,
            Err(e) => return FileOutcome::Unreadable(e),
        };

        let (new_content, replacements) = self.rules.apply(&content);
        if new_content == content {
            return FileOutcome::Unchanged;
        }

        debug!("{} replacement(s) in {}", replacements, path.display());

        if self.config.dry_run {
            return FileOutcome::Modified {
                replacements,
                write_error: None,
            };
        }

        let write_error = self.sink.write(path, &content, &new_content).err().map(|e| {
            FileError::new(
                path.to_path_buf(),
                FileErrorKind::Write,
                format!("failed to write file: {}", e),
            )
        });

        FileOutcome::Modified {
            replacements,
            write_error,
        }
    }
}

fn record(stats: &mut Statistics, step: Step) {
    match step {
        Step::Walk(error) => {
            warn!("{}", error);
            stats.record_error(error);
        }
        Step::File(path, outcome) => {
            stats.record_scanned();
            match outcome {
                FileOutcome::Unreadable(error) => {
                    warn!("{}", error);
                    stats.record_error(error);
                }
                FileOutcome::Unchanged => {}
                FileOutcome::Modified {
                    replacements,
                    write_error,
                } => {
                    stats.record_modified(path, replacements);
                    if let Some(error) = write_error {
                        warn!("{}", error);
                        stats.record_error(error);
                    }
                }
            }
        }
    }
}

/// Read a file as UTF-8 text
pub(crate) fn read_text(path: &Path) -> std::result::Result<String, FileError> {
    let bytes = fs::read(path).map_err(|e| {
        FileError::new(
            path.to_path_buf(),
            FileErrorKind::Read,
            format!("failed to read file: {}", e),
        )
    })?;

    String::from_utf8(bytes).map_err(|e| {
        FileError::new(
            path.to_path_buf(),
            FileErrorKind::Binary,
            format!(
                "skipped binary file (invalid UTF-8 at byte {})",
                e.utf8_error().valid_up_to()
            ),
        )
    })
}
