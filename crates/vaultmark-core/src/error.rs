//! Error types for vaultmark.
//!
//! All errors in the system are represented by the [`Error`] enum.
//! This ensures composable error handling across crates.

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type for all vaultmark operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Malformed markup (type declaration, frontmatter, ...)
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Invalid vault configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Invalid schema definition
    #[error("Schema error: {reason}")]
    SchemaError { reason: String },

    /// YAML decoding failure
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Lookup miss
    #[error("Not found: {key}")]
    NotFound { key: String },

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an IO error
    pub fn io(err: io::Error) -> Self {
        Error::Io(err)
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a schema error
    pub fn schema_error(reason: impl Into<String>) -> Self {
        Error::SchemaError {
            reason: reason.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(key: impl Into<String>) -> Self {
        Error::NotFound { key: key.into() }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// The bare reason text, without the variant prefix.
    ///
    /// Parse diagnostics surface this to users, where the `Parse error:` prefix is noise.
    pub fn reason(&self) -> String {
        match self {
            Error::ParseError { reason }
            | Error::ConfigError { reason }
            | Error::SchemaError { reason } => reason.clone(),
            Error::NotFound { key } => key.clone(),
            Error::Other(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::file_not_found("/path/to/file");
        assert!(err.to_string().contains("File not found"));

        let err = Error::parse_error("invalid type declaration syntax: ::x(");
        assert!(err.to_string().starts_with("Parse error"));
        assert_eq!(err.reason(), "invalid type declaration syntax: ::x(");
    }

    #[test]
    fn test_yaml_error_converts() {
        let err: Error = serde_yaml::from_str::<serde_yaml::Value>("a: [b")
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("YAML error"));
    }
}
