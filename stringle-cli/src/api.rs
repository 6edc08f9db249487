use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::config::Config;
use crate::core::Result;
use crate::replace::{FilePreview, ReplacementRule, Replacer, RunConfig, Statistics};
use crate::selector::{Directory, FilterConfig};

/// Options for [`replace_in_files`]
#[derive(Debug, Clone)]
pub struct ReplaceOptions {
    pub case_sensitive: bool,
    pub use_regex: bool,
    pub dry_run: bool,
    pub parallel: bool,
    /// Only files with these extensions, e.g. `.py`
    pub include_extensions: Option<Vec<String>>,
    pub ignore_extensions: Option<Vec<String>>,
    /// Merged with [`crate::selector::DEFAULT_IGNORE_DIRS`]
    pub ignore_dirs: Option<Vec<String>>,
    pub ignore_files: Option<Vec<PathBuf>>,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            use_regex: false,
            dry_run: false,
            parallel: false,
            include_extensions: None,
            ignore_extensions: None,
            ignore_dirs: None,
            ignore_files: None,
        }
    }
}

impl ReplaceOptions {
    /// Fold a config file in. Lists are extended; booleans from the file only
    /// move away from the built-in defaults, so a command-line flag can never
    /// be undone by the file.
    pub fn merge_config(mut self, config: &Config) -> Self {
        extend(&mut self.ignore_dirs, &config.filters.ignore_dirs);
        extend(&mut self.ignore_files, &config.filters.ignore_files);
        extend(&mut self.ignore_extensions, &config.filters.ignore_extensions);
        extend(&mut self.include_extensions, &config.filters.include_extensions);

        if config.run.case_sensitive == Some(false) {
            self.case_sensitive = false;
        }
        if config.run.use_regex == Some(true) {
            self.use_regex = true;
        }

        self
    }

    pub fn filter_config(&self) -> FilterConfig {
        let mut filters = FilterConfig::new();

        if let Some(dirs) = &self.ignore_dirs {
            filters = filters.with_ignore_dirs(dirs.iter().cloned());
        }
        if let Some(files) = &self.ignore_files {
            filters = filters.with_ignore_files(files);
        }
        if let Some(extensions) = &self.ignore_extensions {
            filters = filters.with_ignore_extensions(extensions);
        }
        if let Some(extensions) = &self.include_extensions {
            filters = filters.with_include_extensions(extensions);
        }

        filters
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            case_sensitive: self.case_sensitive,
            use_regex: self.use_regex,
            dry_run: self.dry_run,
            parallel: self.parallel,
        }
    }
}

fn extend<T: Clone>(target: &mut Option<Vec<T>>, extra: &[T]) {
    if extra.is_empty() {
        return;
    }
    target.get_or_insert_with(Vec::new).extend_from_slice(extra);
}

/// A validated run: root checked, rules compiled, nothing touched yet
pub struct Job {
    directory: Directory,
    replacer: Replacer,
}

impl Job {
    /// Every fatal check happens here, before any file is read
    pub fn new<I, T>(root: impl AsRef<Path>, replacements: I, options: &ReplaceOptions) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<ReplacementRule>,
    {
        let directory = Directory::new(root, options.filter_config())?;
        let rules: Vec<ReplacementRule> = replacements.into_iter().map(Into::into).collect();
        let replacer = Replacer::new(&rules, options.run_config())?;

        Ok(Self {
            directory,
            replacer,
        })
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.replacer = self.replacer.with_progress(progress);
        self
    }

    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.replacer = self.replacer.with_cancel_flag(cancel);
        self
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn execute(&self) -> Statistics {
        self.replacer.run_directory(&self.directory)
    }

    /// Diffs for the given files without writing anything
    pub fn preview(&self, files: &[PathBuf]) -> Vec<FilePreview> {
        self.replacer.preview(files.iter().cloned())
    }
}

/// Walk `root` and apply `replacements` to every selected file.
///
/// Fails only on configuration problems (missing root, bad regex, duplicate
/// patterns). Per-file problems land in [`Statistics::errors`].
///
/// Files are rewritten one at a time, so a crash mid-run leaves earlier files
/// modified and later ones untouched.
pub fn replace_in_files<I, T>(
    root: impl AsRef<Path>,
    replacements: I,
    options: &ReplaceOptions,
) -> Result<Statistics>
where
    I: IntoIterator<Item = T>,
    T: Into<ReplacementRule>,
{
    Ok(Job::new(root, replacements, options)?.execute())
}
