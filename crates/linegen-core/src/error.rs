//! Error handling for the linegen code generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Only conditions that must abort
//! a generation run are errors; recoverable oddities in the OpenAPI document
//! (unknown status codes, unmatched path placeholders) are logged instead.
//!
//! # Examples
//!
//! ```
//! use linegen_core::error::{Error, Result};
//!
//! fn require_paths(has_paths: bool) -> Result<()> {
//!     if !has_paths {
//!         return Err(Error::openapi("Missing 'paths' object"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_paths(false).is_err());
//! ```

use thiserror::Error;

/// Result type for linegen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for linegen operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error (template manifests)
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The OpenAPI document is malformed or unsupported
    #[error("OpenAPI error: {0}")]
    OpenApi(String),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new OpenAPI error
    pub fn openapi<S: Into<String>>(msg: S) -> Self {
        Self::OpenApi(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(Error::config("x"), Error::Config(m) if m == "x"));
        assert!(matches!(Error::openapi("y"), Error::OpenApi(m) if m == "y"));
        assert!(matches!(Error::template("z"), Error::Template(m) if m == "z"));
    }

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            Error::openapi("Missing 'paths' object").to_string(),
            "OpenAPI error: Missing 'paths' object"
        );
        let io = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.to_string(), "I/O error: gone");
    }
}
