//! Parser trait definition

use std::path::Path;

/// Trait for extracting `required_version` declarations from a configuration file
pub trait Parser: Send + Sync {
    /// Check if this parser can handle the given file
    fn can_parse(&self, path: &Path) -> bool;

    /// Parse the content and return every declared `required_version`, in file order
    fn parse(&self, content: &str) -> Result<Vec<String>, ParseError>;
}

/// Error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to parse the file structure
    #[error("Failed to parse file: {0}")]
    ParseFailed(String),

    /// Invalid syntax in the file
    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),
}

/// Returns the file name of `path` if it ends with `suffix`
pub(crate) fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}
