use serde::Serialize;
use similar::TextDiff;
use std::path::PathBuf;

use super::replacer::{read_text, Replacer};

/// Would-be change to a single file
#[derive(Debug, Clone, Serialize)]
pub struct FilePreview {
    /// File path
    pub path: PathBuf,

    /// Substitutions the rules would make
    pub replacements: usize,

    /// Unified diff of old against new content
    pub diff: String,
}

impl Replacer {
    /// Compute diffs for files the rules would change. Never writes; files that
    /// cannot be read or do not change are left out.
    pub fn preview<I>(&self, files: I) -> Vec<FilePreview>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        files
            .into_iter()
            .filter_map(|path| {
                let content = read_text(&path).ok()?;
                let (new_content, replacements) = self.rules().apply(&content);
                if new_content == content {
                    return None;
                }

                let name = path.display().to_string();
                let diff = TextDiff::from_lines(content.as_str(), &*new_content)
                    .unified_diff()
                    .context_radius(2)
                    .header(&name, &name)
                    .to_string();

                Some(FilePreview {
                    path,
                    replacements,
                    diff,
                })
            })
            .collect()
    }
}

/// Render previews for the terminal
pub fn format_previews(previews: &[FilePreview]) -> String {
    let total: usize = previews.iter().map(|p| p.replacements).sum();
    let mut output = format!(
        "{} file{}, {} change{}\n",
        previews.len(),
        if previews.len() == 1 { "" } else { "s" },
        total,
        if total == 1 { "" } else { "s" }
    );

    for preview in previews {
        output.push('\n');
        output.push_str(&preview.diff);
    }

    output
}
