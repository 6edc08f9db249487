use serde::Serialize;
use std::path::Path;

use crate::core::Result;
use crate::replace::{format_previews, outcome_labels, FilePreview, Statistics};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

/// Renders run results to stdout in the selected format
pub struct OutputWriter {
    format: OutputFormat,
    verbose: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Print the run summary, preceded by diffs when `previews` is given.
    /// JSON output is always a single document.
    pub fn write_report(
        &self,
        stats: &Statistics,
        previews: Option<&[FilePreview]>,
        dry_run: bool,
    ) -> Result<()> {
        print!("{}", self.render_report(stats, previews, dry_run)?);
        Ok(())
    }

    pub fn render_report(
        &self,
        stats: &Statistics,
        previews: Option<&[FilePreview]>,
        dry_run: bool,
    ) -> Result<String> {
        let Some(previews) = previews else {
            return self.render_statistics(stats, dry_run);
        };

        if self.format == OutputFormat::Json {
            #[derive(Serialize)]
            struct Report<'a> {
                previews: &'a [FilePreview],
                statistics: &'a Statistics,
            }

            let report = Report {
                previews,
                statistics: stats,
            };
            return Ok(format!("{}\n", serde_json::to_string_pretty(&report)?));
        }

        let mut out = self.render_previews(previews);
        out.push('\n');
        out.push_str(&self.render_statistics(stats, dry_run)?);
        Ok(out)
    }

    pub fn render_statistics(&self, stats: &Statistics, dry_run: bool) -> Result<String> {
        let mut out = String::new();

        match self.format {
            OutputFormat::Json => {
                out.push_str(&serde_json::to_string_pretty(stats)?);
                out.push('\n');
            }
            OutputFormat::Text => {
                let (scan, modify, make) = outcome_labels(dry_run);
                out.push_str(&format!("{} {} files\n", scan, stats.files_scanned));
                out.push_str(&format!("{} {} files\n", modify, stats.files_modified));
                out.push_str(&format!("{} {} replacements\n", make, stats.total_replacements));
                if stats.cancelled {
                    out.push_str("Cancelled before all files were processed\n");
                }

                if self.verbose && !stats.modified_files.is_empty() {
                    out.push_str("\nModified files:\n");
                    for path in &stats.modified_files {
                        out.push_str(&format!("  - {}\n", path.display()));
                    }
                }

                if !stats.errors.is_empty() {
                    out.push_str("\nErrors:\n");
                    for error in &stats.errors {
                        out.push_str(&format!("  - {}\n", error));
                    }
                }
            }
            OutputFormat::Markdown => {
                let (scan, modify, make) = outcome_labels(dry_run);
                out.push_str("# Replacement Summary\n\n");
                out.push_str("| Metric | Value |\n");
                out.push_str("|--------|-------|\n");
                out.push_str(&format!("| {} files | {} |\n", scan, stats.files_scanned));
                out.push_str(&format!("| {} files | {} |\n", modify, stats.files_modified));
                out.push_str(&format!("| {} replacements | {} |\n", make, stats.total_replacements));

                if self.verbose && !stats.modified_files.is_empty() {
                    out.push_str("\n## Modified files\n\n");
                    for path in &stats.modified_files {
                        out.push_str(&format!("- `{}`\n", path.display()));
                    }
                }

                if !stats.errors.is_empty() {
                    out.push_str("\n## Errors\n\n");
                    for error in &stats.errors {
                        out.push_str(&format!("- `{}`: {}\n", error.path.display(), error.message));
                    }
                }
            }
        }

        Ok(out)
    }

    fn render_previews(&self, previews: &[FilePreview]) -> String {
        if previews.is_empty() {
            return "No matches found.\n".to_string();
        }

        match self.format {
            OutputFormat::Markdown => previews
                .iter()
                .map(|p| format!("## {}\n\n```diff\n{}```\n\n", p.path.display(), p.diff))
                .collect(),
            _ => format_previews(previews),
        }
    }

    pub fn write_other_files<'a>(&self, files: impl Iterator<Item = &'a Path>) -> Result<()> {
        let files: Vec<&Path> = files.collect();
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&files)?);
            }
            OutputFormat::Text | OutputFormat::Markdown => {
                for file in files {
                    println!("{}", file.display());
                }
            }
        }
        Ok(())
    }

    pub fn write_error(&self, error: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                #[derive(Serialize)]
                struct ErrorResponse<'a> {
                    error: &'a str,
                }
                println!("{}", serde_json::to_string_pretty(&ErrorResponse { error })?);
            }
            OutputFormat::Text | OutputFormat::Markdown => {
                eprintln!("Error: {}", error);
            }
        }
        Ok(())
    }
}
