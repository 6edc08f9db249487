use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Directory names skipped unless a caller replaces the set
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    "node_modules",
    ".venv",
    "venv",
    "target",
    "build",
    "dist",
    ".eggs",
];

/// Criteria deciding which files a walk surfaces.
///
/// Built once per run and never mutated afterwards. The default ignore set is
/// copied in at construction, so extending one config never leaks into another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    ignore_dirs: BTreeSet<String>,
    ignore_files: HashSet<PathBuf>,
    ignore_extensions: BTreeSet<String>,
    include_extensions: Option<BTreeSet<String>>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|d| d.to_string()).collect(),
            ignore_files: HashSet::new(),
            ignore_extensions: BTreeSet::new(),
            include_extensions: None,
        }
    }
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add directory names to skip on top of the current set
    pub fn with_ignore_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Replace the skip set entirely, dropping the defaults
    pub fn replace_ignore_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Skip specific files. Paths are canonicalized when they exist.
    pub fn with_ignore_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.ignore_files
            .extend(files.into_iter().map(|p| resolve_path(p.as_ref())));
        self
    }

    pub fn with_ignore_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignore_extensions
            .extend(extensions.into_iter().map(|e| normalize_extension(e.as_ref())));
        self
    }

    /// Restrict processing to these extensions. An empty list leaves the
    /// restriction off.
    pub fn with_include_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions: BTreeSet<String> = extensions
            .into_iter()
            .map(|e| normalize_extension(e.as_ref()))
            .collect();

        if extensions.is_empty() {
            return self;
        }

        self.include_extensions
            .get_or_insert_with(BTreeSet::new)
            .extend(extensions);
        self
    }

    pub fn include_extensions(&self) -> Option<&BTreeSet<String>> {
        self.include_extensions.as_ref()
    }

    /// Whether traversal should enter a directory with this basename
    pub fn should_descend(&self, dir_name: &str) -> bool {
        !self.ignore_dirs.contains(dir_name)
    }

    /// Whether a regular file passes the file-level filters.
    ///
    /// An include set wins over the exclude set: a listed extension is
    /// selected even when it is also excluded.
    pub fn should_select(&self, path: &Path) -> bool {
        if self.ignore_files.contains(path) {
            return false;
        }

        let extension = extension_of(path);

        if let Some(include) = &self.include_extensions {
            return extension.is_some_and(|ext| include.contains(&ext));
        }

        match extension {
            Some(ext) => !self.ignore_extensions.contains(&ext),
            None => true,
        }
    }
}

/// Extension of a path in `.ext` form, matching how callers spell them
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
}

/// Accept both `rs` and `.rs`
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim();
    if trimmed.starts_with('.') {
        trimmed.to_string()
    } else {
        format!(".{}", trimmed)
    }
}

fn resolve_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ignore_dirs() {
        let filters = FilterConfig::default();
        assert!(!filters.should_descend(".git"));
        assert!(!filters.should_descend("node_modules"));
        assert!(!filters.should_descend("__pycache__"));
        assert!(filters.should_descend("src"));
    }

    #[test]
    fn test_extending_does_not_touch_other_configs() {
        let extended = FilterConfig::new().with_ignore_dirs(["generated"]);
        let plain = FilterConfig::new();

        assert!(!extended.should_descend("generated"));
        assert!(!extended.should_descend(".git"));
        assert!(plain.should_descend("generated"));
    }

    #[test]
    fn test_replace_ignore_dirs_drops_defaults() {
        let filters = FilterConfig::new().replace_ignore_dirs(["only_this"]);
        assert!(filters.should_descend(".git"));
        assert!(!filters.should_descend("only_this"));
    }

    #[test]
    fn test_ignore_extensions() {
        let filters = FilterConfig::new().with_ignore_extensions([".pyc", "log"]);
        assert!(!filters.should_select(Path::new("/tmp/a.pyc")));
        assert!(!filters.should_select(Path::new("/tmp/b.log")));
        assert!(filters.should_select(Path::new("/tmp/c.py")));
        assert!(filters.should_select(Path::new("/tmp/Makefile")));
    }

    #[test]
    fn test_include_wins_over_exclude() {
        let filters = FilterConfig::new()
            .with_ignore_extensions([".py", ".txt"])
            .with_include_extensions([".py"]);

        assert!(filters.should_select(Path::new("main.py")));
        assert!(!filters.should_select(Path::new("notes.txt")));
        assert!(!filters.should_select(Path::new("README")));
    }

    #[test]
    fn test_empty_include_set_is_ignored() {
        let filters = FilterConfig::new().with_include_extensions(Vec::<String>::new());
        assert!(filters.include_extensions().is_none());
        assert!(filters.should_select(Path::new("anything.bin")));
    }

    #[test]
    fn test_ignore_files_exact_path() {
        let filters = FilterConfig::new().with_ignore_files(["/nonexistent/skip.txt"]);
        assert!(!filters.should_select(Path::new("/nonexistent/skip.txt")));
        assert!(filters.should_select(Path::new("/nonexistent/keep.txt")));
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("rs"), ".rs");
        assert_eq!(normalize_extension(".rs"), ".rs");
        assert_eq!(extension_of(Path::new("a/b.tar.gz")).as_deref(), Some(".gz"));
        assert_eq!(extension_of(Path::new(".bashrc")), None);
    }
}
