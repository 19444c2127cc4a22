//! Client error taxonomy
//!
//! Every failure the client can surface falls into one of a closed set of
//! kinds. Display sites match on [`ClientError::kind`] instead of guessing
//! at the shape of an error message.

use miette::Diagnostic;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single field-scoped validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as it appears in the DTO (e.g. "price")
    pub field: &'static str,
    /// Human readable message
    pub message: String,
}

/// Collection of field errors produced by form or DTO validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against a field
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// First message recorded for a field, if any
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Coarse classification used by display sites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caught before submission, field-scoped, blocks submission only
    Validation,
    /// The server could not be reached
    Transport,
    /// The server answered, but with an error or an unreadable payload
    Server,
    /// Local filesystem failure (report downloads, config files)
    Local,
}

/// Errors surfaced by the gateway, the query layer and the view models
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ClientError {
    #[error("Validation failed: {0}")]
    #[diagnostic(code(ferre::validation))]
    Validation(ValidationErrors),

    #[error("Could not reach {url}: {message}")]
    #[diagnostic(
        code(ferre::transport),
        help("check that the API server is running and that `api.base_url` is correct (see `ferre config show`)")
    )]
    Transport { url: String, message: String },

    #[error("Server responded with {status}: {message}")]
    #[diagnostic(code(ferre::server))]
    Server { status: u16, message: String },

    #[error("Unexpected response from {path}: {message}")]
    #[diagnostic(code(ferre::decode))]
    Decode { path: String, message: String },

    #[error("{}: {message}", .path.display())]
    #[diagnostic(code(ferre::io))]
    Io { path: PathBuf, message: String },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Transport { .. } => ErrorKind::Transport,
            ClientError::Server { .. } | ClientError::Decode { .. } => ErrorKind::Server,
            ClientError::Io { .. } => ErrorKind::Local,
        }
    }

    /// Shorthand for a single-field validation error
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        ClientError::Validation(errors)
    }

    pub fn io(path: &Path, err: impl fmt::Display) -> Self {
        ClientError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Field errors, when this is a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ClientError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> Self {
        ClientError::Validation(errors)
    }
}
