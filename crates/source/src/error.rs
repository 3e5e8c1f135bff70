use thiserror::Error;

/// Result type for source reflection
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors that can occur while reading entity declarations from source
#[derive(Error, Debug)]
pub enum SourceError {
    /// Failed to parse the source code
    #[error("Parse error: {0}")]
    ParseError(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),
}

impl SourceError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }
}
