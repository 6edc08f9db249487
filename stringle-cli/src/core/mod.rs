pub mod error;
pub mod output;

pub use error::{Result, StringleError};
pub use output::{OutputFormat, OutputWriter};
