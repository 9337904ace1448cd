use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for chunker operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors that can occur during code chunking
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// Failed to parse the source code
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Language excluded by configuration
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Invalid configuration, rejected before any processing
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    /// Output serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChunkerError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }
}

/// Recoverable condition recorded on a chunk instead of failing the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
}

impl Diagnostic {
    pub fn malformed_tree(message: impl Into<String>) -> Self {
        Self {
            code: DiagnosticCode::MalformedTree,
            message: message.into(),
        }
    }

    pub fn unsupported_language(language: &str) -> Self {
        Self {
            code: DiagnosticCode::UnsupportedLanguage,
            message: format!("no syntax adapter for language '{language}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// The syntax tree was partial or inconsistent; the whole file became one chunk
    MalformedTree,
    /// No adapter exists for the language; the whole file became one chunk
    UnsupportedLanguage,
}
