//! Custom error types for envsync
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.
//!
//! Fatal conditions (`EnvsyncError`) abort a backup or restore immediately.
//! Backend failures (`BackendError`) and resolution problems
//! (`ResolutionWarning`) are recoverable: they are logged, counted in the run
//! report, and the run moves on to the next item.

use thiserror::Error;

/// The main error type for envsync operations
#[derive(Error, Debug)]
pub enum EnvsyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Durable state could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The resource catalog is malformed
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// An operation was invoked in the wrong state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

/// Errors in the static resource catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{resource} {command}: source type '{source_type}' is not an independent resource")]
    UnresolvedSource {
        resource: String,
        command: String,
        source_type: String,
    },

    #[error("{resource} {command}: dependent resource cannot be its own source")]
    SelfReference { resource: String, command: String },

    #[error("{resource} {command}: dependent resource has no source type")]
    MissingSource { resource: String, command: String },

    #[error("{resource} {command}: non-dependent resource declares source type '{source_type}'")]
    UnexpectedSource {
        resource: String,
        command: String,
        source_type: String,
    },

    #[error("{resource} {command}: a singleton resource cannot be dependent")]
    DependentSingleton { resource: String, command: String },

    #[error("{resource}: descriptor has no command")]
    MissingCommand { resource: String },

    #[error("{resource} {command}: declared more than once")]
    Duplicate { resource: String, command: String },
}

/// Errors returned by a backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("{resource} {command} failed: {message}")]
    Failed {
        resource: String,
        command: String,
        message: String,
    },

    #[error("{resource} {command}: already exists: {message}")]
    Conflict {
        resource: String,
        command: String,
        message: String,
    },

    #[error("failed to run {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("{resource} {command}: invalid response: {message}")]
    InvalidResponse {
        resource: String,
        command: String,
        message: String,
    },
}

impl BackendError {
    /// Check if the target reported that the object already exists
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Recoverable conditions that cause a single item to be skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    #[error("source directory {path} not found for {resource}")]
    MissingSourceDirectory { resource: String, path: String },

    #[error("no identifiers found in {path} for {resource}")]
    NoSourceIdentifiers { resource: String, path: String },

    #[error("could not find new ID for {resource} {old_id}")]
    UnmappedIdentifier { resource: String, old_id: String },

    #[error("malformed record {path}: {message}")]
    MalformedRecord { path: String, message: String },

    #[error("missing {field} in {path}")]
    MissingField { path: String, field: String },
}

/// A recoverable problem recorded in a run report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunWarning {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Resolution(#[from] ResolutionWarning),

    /// An association handler stopped early
    #[error("{resource}: {message}")]
    Handler { resource: String, message: String },
}

/// Result type alias for envsync operations
pub type EnvsyncResult<T> = Result<T, EnvsyncError>;
