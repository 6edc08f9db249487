mod preview;
mod replacer;
mod rule;
mod stats;

pub use preview::{format_previews, FilePreview};
pub use replacer::{ContentSink, FileOutcome, FsSink, Replacer, RunConfig};
pub use rule::{translate_template, ReplacementRule, RuleSet};
pub use stats::{outcome_labels, FileError, FileErrorKind, Statistics};
