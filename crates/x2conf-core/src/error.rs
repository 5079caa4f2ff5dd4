//! Error types for the x2conf core library
//!
//! This module defines the error handling system for x2conf, using thiserror
//! for ergonomic error definitions and anyhow for flexible error contexts.
//!
//! Only structural failures surface as [`Error`]. Per-field problems found
//! while resolving a template degrade to an empty value plus a tracked
//! mapping event and are classified by [`ResolutionIssue`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for x2conf operations
#[derive(Error, Debug)]
pub enum Error {
    /// The source document is not valid JSON or lacks the required job structure
    #[error("Source parse error: {message}")]
    SourceParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Template text failed syntax validation
    #[error("Template syntax error: {message}")]
    TemplateSyntax {
        message: String,
        /// Template path or fragment kind that failed
        fragment: Option<String>,
    },

    /// A template could not be loaded from the template source
    #[error("Template not found: {path}")]
    TemplateNotFound { path: String },

    /// Manifest (template catalog) errors
    #[error("Manifest error: {message}")]
    Manifest {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a source parse error without an underlying JSON cause
    pub fn source_parse(message: impl Into<String>) -> Self {
        Error::SourceParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a template syntax error for an optional fragment
    pub fn template_syntax(message: impl Into<String>, fragment: Option<&str>) -> Self {
        Error::TemplateSyntax {
            message: message.into(),
            fragment: fragment.map(str::to_string),
        }
    }

    /// Create a manifest error without a cause
    pub fn manifest(message: impl Into<String>) -> Self {
        Error::Manifest {
            message: message.into(),
            source: None,
        }
    }

    /// Create an IO error bound to the path that failed
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        Error::Io {
            message: format!("{}: {}", path.display(), source),
            path: Some(path),
            source,
        }
    }

    /// Whether this error aborts the whole conversion run rather than one fragment
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, Error::SourceParse { .. } | Error::Json { .. })
    }
}

/// Non-fatal conditions met while resolving a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionIssue {
    /// Unparseable array index or malformed path segment
    MalformedPath,
    /// Path resolves to an absent node
    MissingField,
    /// Path resolves to an explicit null
    EmptyValue,
    /// Filter or transformer name not known to the registry
    UnsupportedFilter,
}

impl fmt::Display for ResolutionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionIssue::MalformedPath => write!(f, "MalformedPath"),
            ResolutionIssue::MissingField => write!(f, "MissingField"),
            ResolutionIssue::EmptyValue => write!(f, "EmptyValue"),
            ResolutionIssue::UnsupportedFilter => write!(f, "UnsupportedFilter"),
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            path: None,
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
