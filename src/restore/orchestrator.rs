//! Restore orchestration
//!
//! Replays a backup directory against a target backend in a fixed phase
//! order. Every object created in the first pass gets its new identifier
//! recorded in the [`IdMappingStore`] before anything that refers to it is
//! attempted.

use std::fmt;
use std::path::PathBuf;

use crate::backend::{record_id, Backend, Params, Record};
use crate::catalog::{AssignmentRoute, ResourceCatalog, ResourceDescriptor};
use crate::error::{EnvsyncError, EnvsyncResult, ResolutionWarning, RunWarning};
use crate::mapping::{IdMappingStore, MAPPING_FILE_NAME};
use crate::storage::{PathNamespace, RecordFile};

use super::associations::{AssociationContext, AssociationRegistry};

/// Phases of a restore, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RestorePhase {
    Init,
    Singleton,
    FirstPass,
    SecondPass,
    Association,
    Done,
}

impl fmt::Display for RestorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Singleton => write!(f, "singleton"),
            Self::FirstPass => write!(f, "first pass"),
            Self::SecondPass => write!(f, "second pass"),
            Self::Association => write!(f, "association"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Options for a restore run
#[derive(Debug, Clone, Copy, Default)]
pub struct RestoreOptions {
    /// Skip first pass records whose old identifier is already mapped
    pub resume: bool,
}

/// Outcome of a restore run
#[derive(Debug, Default, Clone)]
pub struct RestoreReport {
    /// Singleton records recreated
    pub singletons: usize,
    /// Independent records created and mapped
    pub created: usize,
    /// Independent records skipped because they were already mapped
    pub skipped_existing: usize,
    /// Dependent records created under their translated source
    pub dependents: usize,
    /// Relations restored by assignment routes and association handlers
    pub associated: usize,
    /// Last phase reached
    pub phase: Option<RestorePhase>,
    /// Everything that was skipped, in the order it happened
    pub warnings: Vec<RunWarning>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Number of recoverable failures where the target said the object exists
    pub fn conflicts(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, RunWarning::Backend(e) if e.is_conflict()))
            .count()
    }

    /// One-line summary of the run
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Restored {} singleton(s), {} first pass record(s), ",
            self.singletons, self.created
        );
        summary.push_str(&format!(
            "{} second pass record(s), {} association(s)",
            self.dependents, self.associated
        ));
        if self.skipped_existing > 0 {
            summary.push_str(&format!("; {} already mapped", self.skipped_existing));
        }
        summary.push_str(&format!("; {} warning(s)", self.warnings.len()));
        summary
    }

    pub(crate) fn warn(&mut self, warning: impl Into<RunWarning>) {
        self.warnings.push(warning.into());
    }
}

/// Recreates a backup on a target backend
pub struct RestoreOrchestrator<'a> {
    catalog: &'a ResourceCatalog,
    backend: &'a dyn Backend,
    namespace: PathNamespace,
    mapping: IdMappingStore,
    handlers: AssociationRegistry,
    options: RestoreOptions,
    phase: RestorePhase,
}

impl<'a> RestoreOrchestrator<'a> {
    pub fn new(
        catalog: &'a ResourceCatalog,
        backend: &'a dyn Backend,
        source_root: impl Into<PathBuf>,
        mapping: IdMappingStore,
    ) -> Self {
        Self {
            catalog,
            backend,
            namespace: PathNamespace::new(source_root),
            mapping,
            handlers: AssociationRegistry::default(),
            options: RestoreOptions::default(),
            phase: RestorePhase::Init,
        }
    }

    pub fn with_options(mut self, options: RestoreOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_handlers(mut self, handlers: AssociationRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn phase(&self) -> RestorePhase {
        self.phase
    }

    pub fn mapping(&self) -> &IdMappingStore {
        &self.mapping
    }

    /// Run every phase; only a failure to persist the mapping aborts
    ///
    /// An orchestrator runs once. Calling `run` again, even after a failed
    /// run, returns `InvalidState` without touching the backend.
    pub fn run(&mut self) -> EnvsyncResult<RestoreReport> {
        if self.phase != RestorePhase::Init {
            return Err(EnvsyncError::InvalidState(format!(
                "restore already ran (phase: {})",
                self.phase
            )));
        }

        let catalog = self.catalog;
        let mut report = RestoreReport::default();
        tracing::info!(
            root = %self.namespace.root().display(),
            resume = self.options.resume,
            "starting restore"
        );

        self.enter(RestorePhase::Singleton, &mut report);
        for resource in catalog.singleton_resources() {
            self.restore_singleton(resource, &mut report);
        }

        self.enter(RestorePhase::FirstPass, &mut report);
        for resource in catalog.independent_resources() {
            self.restore_independent(resource, &mut report)?;
        }

        self.enter(RestorePhase::SecondPass, &mut report);
        for resource in catalog.dependent_resources() {
            if self.handlers.handles(&resource.name) {
                tracing::debug!(
                    resource = %resource.name,
                    command = %resource.list_command,
                    "left to association handler"
                );
                continue;
            }
            self.restore_dependent(resource, &mut report);
        }

        self.enter(RestorePhase::Association, &mut report);
        self.restore_associations(&mut report);

        self.enter(RestorePhase::Done, &mut report);
        tracing::info!(
            created = report.created,
            associated = report.associated,
            warnings = report.warnings.len(),
            "restore finished"
        );
        Ok(report)
    }

    fn enter(&mut self, phase: RestorePhase, report: &mut RestoreReport) {
        tracing::info!(%phase, "entering restore phase");
        self.phase = phase;
        report.phase = Some(phase);
    }

    /// Record files directly under `<resource>/<command>`, empty when absent
    fn files_in(
        &self,
        resource: &str,
        command: &str,
        report: &mut RestoreReport,
    ) -> Vec<RecordFile> {
        let dir = self.namespace.command_dir(resource, command);
        if !dir.is_dir() {
            tracing::debug!(%resource, %command, "no backup found, skipping");
            return Vec::new();
        }
        match self.namespace.record_files(&dir) {
            Ok(files) => files,
            Err(e) => {
                let warning = ResolutionWarning::MissingSourceDirectory {
                    resource: resource.to_string(),
                    path: format!("{} ({})", dir.display(), e),
                };
                tracing::warn!("{}", warning);
                report.warn(warning);
                Vec::new()
            }
        }
    }

    fn read(&self, file: &RecordFile, report: &mut RestoreReport) -> Option<Record> {
        match self.namespace.read_record(&file.path) {
            Ok(record) => Some(record),
            Err(warning) => {
                tracing::warn!("{}", warning);
                report.warn(warning);
                None
            }
        }
    }

    fn translate(
        &self,
        resource: &str,
        old_id: &str,
        report: &mut RestoreReport,
    ) -> Option<String> {
        match self.mapping.get_new_id(resource, old_id) {
            Some(new_id) => Some(new_id.to_string()),
            None => {
                let warning = ResolutionWarning::UnmappedIdentifier {
                    resource: resource.to_string(),
                    old_id: old_id.to_string(),
                };
                tracing::warn!("{}", warning);
                report.warn(warning);
                None
            }
        }
    }

    fn restore_singleton(&self, resource: &ResourceDescriptor, report: &mut RestoreReport) {
        for file in self.files_in(&resource.name, &resource.get_command, report) {
            let Some(record) = self.read(&file, report) else {
                continue;
            };

            tracing::info!(
                resource = %resource.name,
                file = %file.path.display(),
                "restoring singleton"
            );
            match self.backend.create(&resource.name, &record, &Params::new()) {
                Ok(_) => report.singletons += 1,
                Err(e) => {
                    log_create_failure(&resource.name, &file.id, &e);
                    report.warn(e);
                }
            }
        }
    }

    fn restore_independent(
        &mut self,
        resource: &ResourceDescriptor,
        report: &mut RestoreReport,
    ) -> EnvsyncResult<()> {
        let files = self.files_in(&resource.name, &resource.list_command, report);
        if !files.is_empty() {
            tracing::info!(resource = %resource.name, count = files.len(), "restoring");
        }

        for file in files {
            let mapped = self.mapping.get_new_id(&resource.name, &file.id).is_some();
            if self.options.resume && mapped {
                tracing::debug!(
                    resource = %resource.name,
                    old_id = %file.id,
                    "already mapped, skipping"
                );
                report.skipped_existing += 1;
                continue;
            }

            let Some(record) = self.read(&file, report) else {
                continue;
            };

            let created = match self.backend.create(&resource.name, &record, &Params::new()) {
                Ok(created) => created,
                Err(e) => {
                    log_create_failure(&resource.name, &file.id, &e);
                    report.warn(e);
                    continue;
                }
            };

            let Some(new_id) = record_id(&created) else {
                let warning = ResolutionWarning::MissingField {
                    path: format!("create response for {}", file.path.display()),
                    field: "id".to_string(),
                };
                tracing::warn!("{}", warning);
                report.warn(warning);
                continue;
            };

            self.mapping.add_mapping(&resource.name, &file.id, new_id)?;
            tracing::info!(resource = %resource.name, old_id = %file.id, %new_id, "created");
            report.created += 1;
        }

        Ok(())
    }

    fn restore_dependent(&self, resource: &ResourceDescriptor, report: &mut RestoreReport) {
        let command = &resource.list_command;
        let source_type = resource.source_type.as_deref().unwrap_or_default();

        let old_sources = match self.namespace.source_ids(&resource.name, command) {
            Ok(Some(ids)) => ids,
            Ok(None) => {
                tracing::debug!(resource = %resource.name, %command, "no backup found, skipping");
                return;
            }
            Err(e) => {
                let dir = self.namespace.command_dir(&resource.name, command);
                let warning = ResolutionWarning::MissingSourceDirectory {
                    resource: resource.name.clone(),
                    path: format!("{} ({})", dir.display(), e),
                };
                tracing::warn!("{}", warning);
                report.warn(warning);
                return;
            }
        };

        tracing::info!(
            resource = %resource.name,
            %command,
            sources = old_sources.len(),
            "restoring"
        );

        for old_source in &old_sources {
            let Some(new_source) = self.translate(source_type, old_source, report) else {
                continue;
            };

            let dir = self.namespace.source_dir(&resource.name, command, old_source);
            let files = match self.namespace.record_files(&dir) {
                Ok(files) => files,
                Err(e) => {
                    let warning = ResolutionWarning::MissingSourceDirectory {
                        resource: resource.name.clone(),
                        path: format!("{} ({})", dir.display(), e),
                    };
                    tracing::warn!("{}", warning);
                    report.warn(warning);
                    continue;
                }
            };

            for file in files {
                let Some(record) = self.read(&file, report) else {
                    continue;
                };

                match &resource.assignment {
                    Some(route) => {
                        self.assign(resource, route, &new_source, &file, &record, report)
                    }
                    None => self.create_under(resource, &new_source, &file, &record, report),
                }
            }
        }
    }

    /// Recreate a dependent record beneath its translated source
    fn create_under(
        &self,
        resource: &ResourceDescriptor,
        new_source: &str,
        file: &RecordFile,
        record: &Record,
        report: &mut RestoreReport,
    ) {
        let mut params = Params::new();
        params.insert(resource.parameter_flag().to_string(), new_source.to_string());

        match self.backend.create(&resource.name, record, &params) {
            Ok(_) => report.dependents += 1,
            Err(e) => {
                log_create_failure(&resource.name, &file.id, &e);
                report.warn(e);
            }
        }
    }

    /// Link a translated member to a translated source
    fn assign(
        &self,
        resource: &ResourceDescriptor,
        route: &AssignmentRoute,
        new_source: &str,
        file: &RecordFile,
        record: &Record,
        report: &mut RestoreReport,
    ) {
        let old_member = record_id(record).unwrap_or(file.id.as_str());
        let Some(new_member) = self.translate(&route.member_type, old_member, report) else {
            return;
        };

        let mut params = Params::new();
        params.insert(resource.parameter_flag().to_string(), new_source.to_string());
        params.insert(route.member_parameter.clone(), new_member);

        tracing::info!(resource = %route.resource, command = %route.command, ?params, "assigning");
        match self.backend.associate(&route.resource, &route.command, &params, None) {
            Ok(()) => report.associated += 1,
            Err(e) => {
                tracing::warn!(
                    resource = %route.resource,
                    command = %route.command,
                    error = %e,
                    "assignment failed"
                );
                report.warn(e);
            }
        }
    }

    fn restore_associations(&self, report: &mut RestoreReport) {
        for handler in self.handlers.iter() {
            tracing::info!(resource = handler.resource(), "running association handler");
            let mut ctx = AssociationContext {
                backend: self.backend,
                mapping: &self.mapping,
                namespace: &self.namespace,
                report: &mut *report,
            };
            if let Err(e) = handler.restore(&mut ctx) {
                tracing::warn!(
                    resource = handler.resource(),
                    error = %e,
                    "association handler failed"
                );
                report.warn(RunWarning::Handler {
                    resource: handler.resource().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
}

fn log_create_failure(resource: &str, old_id: &str, error: &crate::error::BackendError) {
    if error.is_conflict() {
        tracing::warn!(%resource, %old_id, error = %error, "already exists on target, not mapped");
    } else {
        tracing::warn!(%resource, %old_id, error = %error, "create failed");
    }
}

/// Restore the backup under `source_root` onto `backend`
///
/// The ID mapping is read from and written to `<source_root>/id_mapping.json`.
pub fn restore(
    catalog: &ResourceCatalog,
    backend: &dyn Backend,
    source_root: impl Into<PathBuf>,
    options: RestoreOptions,
) -> EnvsyncResult<RestoreReport> {
    let source_root = source_root.into();
    let mapping = IdMappingStore::load(source_root.join(MAPPING_FILE_NAME))?;
    RestoreOrchestrator::new(catalog, backend, source_root, mapping)
        .with_options(options)
        .run()
}
