mod filters;
mod walker;

pub use filters::{extension_of, normalize_extension, FilterConfig, DEFAULT_IGNORE_DIRS};
pub use walker::Directory;
