//! Backend collaborator
//!
//! The orchestrators only talk to the identity platform through the
//! [`Backend`] trait. Two implementations ship with the crate:
//!
//! - [`CliBackend`]: drives the platform's command-line client as a
//!   subprocess and parses its JSON output
//! - [`MemoryBackend`]: in-memory fake that records every call and assigns a
//!   fresh identifier on every create
//!
//! All calls are blocking. Any failure is reported as a [`BackendError`],
//! which the orchestrators treat as recoverable.

mod cli;
mod memory;

pub use cli::{CliBackend, DEFAULT_CLI_PROGRAM};
pub use memory::{BackendCall, FailureMode, MemoryBackend};

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::BackendError;

/// A structured record as returned by the backend
pub type Record = serde_json::Map<String, Value>;

/// Named call parameters, e.g. `groupId -> 00g123`
pub type Params = BTreeMap<String, String>;

/// Read and write access to the identity platform
pub trait Backend {
    /// List records of a resource type, optionally parameterized
    fn list(
        &self,
        resource: &str,
        command: &str,
        params: &Params,
    ) -> Result<Vec<Record>, BackendError>;

    /// Fetch a singleton record
    fn get(&self, resource: &str, command: &str) -> Result<Record, BackendError>;

    /// Create a record, returning it with its newly assigned `id`
    fn create(
        &self,
        resource: &str,
        record: &Record,
        params: &Params,
    ) -> Result<Record, BackendError>;

    /// Establish a relation between existing entities
    fn associate(
        &self,
        resource: &str,
        command: &str,
        params: &Params,
        body: Option<&Record>,
    ) -> Result<(), BackendError>;
}

/// The `id` field of a record, if present and a string
pub fn record_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Build a parameter map from pairs
pub fn params<K, V, I>(pairs: I) -> Params
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
