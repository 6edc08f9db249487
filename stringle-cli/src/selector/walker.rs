use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use super::filters::FilterConfig;
use crate::core::{Result, StringleError};
use crate::replace::{FileError, FileErrorKind};

/// A root directory plus the filters that decide which of its files to touch.
///
/// Holds no cached walk state; every call to [`Directory::walk`] starts over.
#[derive(Debug, Clone)]
pub struct Directory {
    root: PathBuf,
    filters: FilterConfig,
}

impl Directory {
    /// Validate and canonicalize the root
    pub fn new(root: impl AsRef<Path>, filters: FilterConfig) -> Result<Self> {
        let root = root.as_ref();

        if !root.exists() {
            return Err(StringleError::DirectoryNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(StringleError::NotADirectory(root.to_path_buf()));
        }

        Ok(Self {
            root: root.canonicalize()?,
            filters,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    /// Walk the tree, yielding selected files in lexicographic order.
    ///
    /// Entries that cannot be inspected come back as `Err` so callers can
    /// record them and keep going.
    pub fn walk(&self) -> impl Iterator<Item = std::result::Result<PathBuf, FileError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| self.should_enter(e))
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        return None;
                    }
                    if self.filters.should_select(entry.path()) {
                        Some(Ok(entry.into_path()))
                    } else {
                        debug!("Filtered out {}", entry.path().display());
                        None
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    Some(Err(FileError::new(path, FileErrorKind::Walk, e.to_string())))
                }
            })
    }

    /// Selected files, silently dropping entries the walk could not inspect
    pub fn selected_files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.walk().filter_map(|entry| entry.ok())
    }

    /// Every regular file under the root that is not selected, including files
    /// inside skipped directories
    pub fn other_files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(move |entry| !self.is_selected(entry.path()))
            .map(DirEntry::into_path)
    }

    fn should_enter(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        let enter = entry
            .file_name()
            .to_str()
            .map_or(true, |name| self.filters.should_descend(name));

        if !enter {
            debug!("Skipping directory {}", entry.path().display());
        }
        enter
    }

    fn is_selected(&self, path: &Path) -> bool {
        let in_skipped_dir = path
            .strip_prefix(&self.root)
            .ok()
            .and_then(Path::parent)
            .map(|parent| {
                parent.components().any(|c| {
                    c.as_os_str()
                        .to_str()
                        .is_some_and(|name| !self.filters.should_descend(name))
                })
            })
            .unwrap_or(false);

        !in_skipped_dir && self.filters.should_select(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::TempDir;

    fn names(paths: &[PathBuf], root: &Path) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_missing_root() {
        let err = Directory::new("/definitely/not/here", FilterConfig::new()).unwrap_err();
        assert!(matches!(err, StringleError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_root_is_file() -> Result<()> {
        let temp = TempDir::new()?;
        let file = temp.path().join("file.txt");
        fs::write(&file, "x")?;

        let err = Directory::new(&file, FilterConfig::new()).unwrap_err();
        assert!(matches!(err, StringleError::NotADirectory(_)));
        Ok(())
    }

    #[test]
    fn test_selected_files_sorted_and_filtered() -> Result<()> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("b/nested"))?;
        fs::create_dir_all(temp.path().join(".git"))?;
        fs::write(temp.path().join("z.txt"), "z")?;
        fs::write(temp.path().join("a.txt"), "a")?;
        fs::write(temp.path().join("b/nested/c.txt"), "c")?;
        fs::write(temp.path().join(".git/config"), "git")?;

        let dir = Directory::new(temp.path(), FilterConfig::new())?;
        let files: Vec<PathBuf> = dir.selected_files().collect();

        assert_eq!(
            names(&files, dir.root()),
            vec!["a.txt", "b/nested/c.txt", "z.txt"]
        );
        assert!(files.iter().all(|p| p.is_absolute()));
        Ok(())
    }

    #[test]
    fn test_walk_is_restartable() -> Result<()> {
        let temp = TempDir::new()?;
        fs::write(temp.path().join("one.txt"), "1")?;

        let dir = Directory::new(temp.path(), FilterConfig::new())?;
        assert_eq!(dir.selected_files().count(), 1);

        fs::write(temp.path().join("two.txt"), "2")?;
        assert_eq!(dir.selected_files().count(), 2);
        Ok(())
    }

    #[test]
    fn test_other_files() -> Result<()> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join(".git"))?;
        fs::write(temp.path().join("file1.txt"), "test")?;
        fs::write(temp.path().join("skip.log"), "test")?;
        fs::write(temp.path().join(".git/config"), "test")?;

        let filters = FilterConfig::new().with_ignore_extensions([".log"]);
        let dir = Directory::new(temp.path(), filters)?;
        let other: Vec<PathBuf> = dir.other_files().collect();

        assert_eq!(names(&other, dir.root()), vec![".git/config", "skip.log"]);
        Ok(())
    }

    #[test]
    fn test_ignore_files_canonicalized() -> Result<()> {
        let temp = TempDir::new()?;
        let keep = temp.path().join("keep.txt");
        let skip = temp.path().join("skip.txt");
        fs::write(&keep, "x")?;
        fs::write(&skip, "x")?;

        let filters = FilterConfig::new().with_ignore_files([&skip]);
        let dir = Directory::new(temp.path(), filters)?;
        let files: Vec<PathBuf> = dir.selected_files().collect();

        assert_eq!(names(&files, dir.root()), vec!["keep.txt"]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_not_followed() -> Result<()> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("real"))?;
        fs::write(temp.path().join("real/file.txt"), "x")?;
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("link"))?;
        std::os::unix::fs::symlink(
            temp.path().join("real/file.txt"),
            temp.path().join("file_link.txt"),
        )?;

        let dir = Directory::new(temp.path(), FilterConfig::new())?;
        let files: Vec<PathBuf> = dir.selected_files().collect();

        assert_eq!(names(&files, dir.root()), vec!["real/file.txt"]);
        Ok(())
    }
}
