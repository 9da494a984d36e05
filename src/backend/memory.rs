//! In-memory backend
//!
//! Serves seeded listings and singletons, assigns a fresh identifier on every
//! create, and records each call so tests can assert on exactly what a run
//! asked the platform to do.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

use super::{Backend, Params, Record};
use crate::error::BackendError;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    List {
        resource: String,
        command: String,
        params: Params,
    },
    Get {
        resource: String,
        command: String,
    },
    Create {
        resource: String,
        record: Record,
        params: Params,
        new_id: String,
    },
    Associate {
        resource: String,
        command: String,
        params: Params,
        body: Option<Record>,
    },
}

/// How a configured failure behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Every call fails
    Always,
    /// Every call fails with an "already exists" conflict
    Conflict,
    /// Calls carrying a non-empty body fail, bare calls succeed
    WithBody,
}

#[derive(Default)]
struct MemoryState {
    listings: HashMap<(String, String, Params), Vec<Record>>,
    singletons: HashMap<(String, String), Record>,
    failures: HashMap<(String, String), FailureMode>,
    calls: Vec<BackendCall>,
}

/// Backend that keeps everything in memory
#[derive(Default)]
pub struct MemoryBackend {
    state: RefCell<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `records` for `resource command` with the given parameters
    pub fn with_listing(
        self,
        resource: &str,
        command: &str,
        params: Params,
        records: Vec<Record>,
    ) -> Self {
        self.state
            .borrow_mut()
            .listings
            .insert((resource.to_string(), command.to_string(), params), records);
        self
    }

    /// Serve `record` for `resource command` as a singleton
    pub fn with_singleton(self, resource: &str, command: &str, record: Record) -> Self {
        self.state
            .borrow_mut()
            .singletons
            .insert((resource.to_string(), command.to_string()), record);
        self
    }

    /// Make calls to `resource command` fail
    ///
    /// For creates the command is `create`.
    pub fn failing(self, resource: &str, command: &str, mode: FailureMode) -> Self {
        self.state
            .borrow_mut()
            .failures
            .insert((resource.to_string(), command.to_string()), mode);
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.borrow().calls.clone()
    }

    /// Create calls for one resource type
    pub fn creates_for(&self, resource: &str) -> Vec<BackendCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, BackendCall::Create { resource: r, .. } if r == resource))
            .collect()
    }

    /// Association calls, including failed attempts
    pub fn associations(&self) -> Vec<BackendCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, BackendCall::Associate { .. }))
            .collect()
    }

    fn check_failure(
        &self,
        resource: &str,
        command: &str,
        body: Option<&Record>,
    ) -> Result<(), BackendError> {
        let state = self.state.borrow();
        let mode = match state.failures.get(&(resource.to_string(), command.to_string())) {
            Some(mode) => *mode,
            None => return Ok(()),
        };

        match mode {
            FailureMode::Always => Err(BackendError::Failed {
                resource: resource.to_string(),
                command: command.to_string(),
                message: "injected failure".to_string(),
            }),
            FailureMode::Conflict => Err(BackendError::Conflict {
                resource: resource.to_string(),
                command: command.to_string(),
                message: "object already exists".to_string(),
            }),
            FailureMode::WithBody if body.is_some_and(|b| !b.is_empty()) => {
                Err(BackendError::Failed {
                    resource: resource.to_string(),
                    command: command.to_string(),
                    message: "request body rejected".to_string(),
                })
            }
            FailureMode::WithBody => Ok(()),
        }
    }

    fn record_call(&self, call: BackendCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl Backend for MemoryBackend {
    fn list(
        &self,
        resource: &str,
        command: &str,
        params: &Params,
    ) -> Result<Vec<Record>, BackendError> {
        self.record_call(BackendCall::List {
            resource: resource.to_string(),
            command: command.to_string(),
            params: params.clone(),
        });
        self.check_failure(resource, command, None)?;

        let state = self.state.borrow();
        let key = (resource.to_string(), command.to_string(), params.clone());
        Ok(state.listings.get(&key).cloned().unwrap_or_default())
    }

    fn get(&self, resource: &str, command: &str) -> Result<Record, BackendError> {
        self.record_call(BackendCall::Get {
            resource: resource.to_string(),
            command: command.to_string(),
        });
        self.check_failure(resource, command, None)?;

        let state = self.state.borrow();
        state
            .singletons
            .get(&(resource.to_string(), command.to_string()))
            .cloned()
            .ok_or_else(|| BackendError::Failed {
                resource: resource.to_string(),
                command: command.to_string(),
                message: "not found".to_string(),
            })
    }

    fn create(
        &self,
        resource: &str,
        record: &Record,
        params: &Params,
    ) -> Result<Record, BackendError> {
        let new_id = Uuid::new_v4().simple().to_string();
        self.record_call(BackendCall::Create {
            resource: resource.to_string(),
            record: record.clone(),
            params: params.clone(),
            new_id: new_id.clone(),
        });
        self.check_failure(resource, "create", Some(record))?;

        let mut created = record.clone();
        created.insert("id".to_string(), Value::String(new_id));
        Ok(created)
    }

    fn associate(
        &self,
        resource: &str,
        command: &str,
        params: &Params,
        body: Option<&Record>,
    ) -> Result<(), BackendError> {
        self.record_call(BackendCall::Associate {
            resource: resource.to_string(),
            command: command.to_string(),
            params: params.clone(),
            body: body.cloned(),
        });
        self.check_failure(resource, command, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{params, record_id};
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_create_assigns_fresh_ids() {
        let backend = MemoryBackend::new();
        let input = record(json!({"id": "g1", "profile": {"name": "Admins"}}));

        let first = backend.create("group", &input, &Params::new()).unwrap();
        let second = backend.create("group", &input, &Params::new()).unwrap();

        assert_ne!(record_id(&first), Some("g1"));
        assert_ne!(record_id(&first), record_id(&second));
        assert_eq!(first["profile"], input["profile"]);
    }

    #[test]
    fn test_listing_is_keyed_by_params() {
        let backend = MemoryBackend::new().with_listing(
            "group",
            "listUsers",
            params([("groupId", "g1")]),
            vec![record(json!({"id": "u1"}))],
        );

        let hit = backend
            .list("group", "listUsers", &params([("groupId", "g1")]))
            .unwrap();
        let miss = backend
            .list("group", "listUsers", &params([("groupId", "g2")]))
            .unwrap();

        assert_eq!(hit.len(), 1);
        assert!(miss.is_empty());
        assert_eq!(backend.calls().len(), 2);
    }

    #[test]
    fn test_failure_modes() {
        let backend = MemoryBackend::new()
            .failing("group", "create", FailureMode::Conflict)
            .failing("applicationGroups", "assignGroupToApplication", FailureMode::WithBody);

        let err = backend
            .create("group", &record(json!({"id": "g1"})), &Params::new())
            .unwrap_err();
        assert!(err.is_conflict());

        let body = record(json!({"priority": 0}));
        let command = "assignGroupToApplication";
        let empty = Record::new();
        assert!(backend
            .associate("applicationGroups", command, &Params::new(), Some(&body))
            .is_err());
        assert!(backend
            .associate("applicationGroups", command, &Params::new(), Some(&empty))
            .is_ok());
    }

    #[test]
    fn test_missing_singleton_fails() {
        let backend = MemoryBackend::new();
        assert!(backend.get("orgSetting", "gets").is_err());
    }
}
