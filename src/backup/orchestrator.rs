//! Backup orchestration
//!
//! Walks the catalog in three passes and persists every retrieved record into
//! the path namespace. Backend failures and missing inputs are logged and
//! skipped; only failures to write the backup itself abort the run.

use std::path::PathBuf;

use crate::backend::{record_id, Backend, Params, Record};
use crate::catalog::{ResourceCatalog, ResourceDescriptor};
use crate::error::{EnvsyncResult, ResolutionWarning, RunWarning};
use crate::storage::{is_safe_identifier, PathNamespace};

/// Outcome of a backup run
#[derive(Debug, Default, Clone)]
pub struct BackupReport {
    /// Singleton records written
    pub singleton_records: usize,
    /// Independent records written
    pub independent_records: usize,
    /// Dependent records written
    pub dependent_records: usize,
    /// Everything that was skipped, in the order it happened
    pub warnings: Vec<RunWarning>,
}

impl BackupReport {
    pub fn total_records(&self) -> usize {
        self.singleton_records + self.independent_records + self.dependent_records
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// One-line summary of the run
    pub fn summary(&self) -> String {
        format!(
            "Backed up {} record(s): {} singleton, {} first pass, {} second pass; {} warning(s)",
            self.total_records(),
            self.singleton_records,
            self.independent_records,
            self.dependent_records,
            self.warnings.len()
        )
    }

    fn warn(&mut self, warning: impl Into<RunWarning>) {
        self.warnings.push(warning.into());
    }
}

/// Persists records from a backend into a backup directory
pub struct BackupOrchestrator<'a> {
    catalog: &'a ResourceCatalog,
    backend: &'a dyn Backend,
    namespace: PathNamespace,
}

impl<'a> BackupOrchestrator<'a> {
    pub fn new(
        catalog: &'a ResourceCatalog,
        backend: &'a dyn Backend,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            backend,
            namespace: PathNamespace::new(destination),
        }
    }

    /// Run all passes: singletons, independent, then dependent resources
    pub fn run(&self) -> EnvsyncResult<BackupReport> {
        self.namespace.ensure_root()?;
        let mut report = BackupReport::default();

        tracing::info!(root = %self.namespace.root().display(), "backing up singleton resources");
        for resource in self.catalog.singleton_resources() {
            self.backup_singleton(resource, &mut report)?;
        }

        tracing::info!("backing up first pass resources");
        for resource in self.catalog.independent_resources() {
            self.backup_independent(resource, &mut report)?;
        }

        tracing::info!("backing up second pass resources");
        for resource in self.catalog.dependent_resources() {
            self.backup_dependent(resource, &mut report)?;
        }

        tracing::info!(
            records = report.total_records(),
            warnings = report.warnings.len(),
            "backup finished"
        );
        Ok(report)
    }

    fn backup_singleton(
        &self,
        resource: &ResourceDescriptor,
        report: &mut BackupReport,
    ) -> EnvsyncResult<()> {
        let command = &resource.get_command;
        tracing::info!(resource = %resource.name, %command, "backing up singleton");

        let record = match self.backend.get(&resource.name, command) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    resource = %resource.name,
                    %command,
                    error = %e,
                    "singleton backup failed"
                );
                report.warn(e);
                return Ok(());
            }
        };

        // Settings objects usually carry no id; fall back to the command name
        let id = record_id(&record)
            .filter(|id| is_safe_identifier(id))
            .unwrap_or(command.as_str())
            .to_string();

        self.namespace
            .write_record(&resource.name, command, None, &id, &record)?;
        report.singleton_records += 1;
        Ok(())
    }

    fn backup_independent(
        &self,
        resource: &ResourceDescriptor,
        report: &mut BackupReport,
    ) -> EnvsyncResult<()> {
        let command = &resource.list_command;
        tracing::info!(resource = %resource.name, %command, "backing up");

        let records = match self.backend.list(&resource.name, command, &Params::new()) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(resource = %resource.name, %command, error = %e, "backup failed");
                report.warn(e);
                return Ok(());
            }
        };

        let written = self.persist(resource, None, &records, report)?;
        report.independent_records += written;
        Ok(())
    }

    fn backup_dependent(
        &self,
        resource: &ResourceDescriptor,
        report: &mut BackupReport,
    ) -> EnvsyncResult<()> {
        let command = &resource.list_command;
        let source_type = resource.source_type.as_deref().unwrap_or_default();

        let Some(source) = self.catalog.source_for(source_type) else {
            let warning = ResolutionWarning::MissingSourceDirectory {
                resource: resource.name.clone(),
                path: source_type.to_string(),
            };
            tracing::warn!(resource = %resource.name, %command, "{}", warning);
            report.warn(warning);
            return Ok(());
        };

        let source_dir = self.namespace.command_dir(&source.name, &source.list_command);
        let source_ids = match self.namespace.record_ids(&source.name, &source.list_command) {
            Ok(Some(ids)) => ids,
            Ok(None) => {
                let warning = ResolutionWarning::MissingSourceDirectory {
                    resource: resource.name.clone(),
                    path: source_dir.display().to_string(),
                };
                tracing::warn!(resource = %resource.name, %command, "{}, skipping", warning);
                report.warn(warning);
                return Ok(());
            }
            Err(e) => {
                let warning = ResolutionWarning::MissingSourceDirectory {
                    resource: resource.name.clone(),
                    path: format!("{} ({})", source_dir.display(), e),
                };
                tracing::warn!(resource = %resource.name, %command, "{}, skipping", warning);
                report.warn(warning);
                return Ok(());
            }
        };

        if source_ids.is_empty() {
            let warning = ResolutionWarning::NoSourceIdentifiers {
                resource: resource.name.clone(),
                path: source_dir.display().to_string(),
            };
            tracing::warn!(resource = %resource.name, %command, "{}, skipping", warning);
            report.warn(warning);
            return Ok(());
        }

        tracing::info!(
            resource = %resource.name,
            %command,
            source = %source.name,
            count = source_ids.len(),
            "backing up for each source identifier"
        );

        for source_id in &source_ids {
            let mut params = Params::new();
            params.insert(resource.parameter_flag().to_string(), source_id.clone());

            let records = match self.backend.list(&resource.name, command, &params) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(
                        resource = %resource.name,
                        %command,
                        %source_id,
                        error = %e,
                        "backup failed for source identifier"
                    );
                    report.warn(e);
                    continue;
                }
            };

            let written = self.persist(resource, Some(source_id), &records, report)?;
            report.dependent_records += written;
        }

        Ok(())
    }

    /// Write records one file per identifier, returning how many were written
    fn persist(
        &self,
        resource: &ResourceDescriptor,
        source_id: Option<&str>,
        records: &[Record],
        report: &mut BackupReport,
    ) -> EnvsyncResult<usize> {
        let command = resource.command();
        let mut written = 0;

        for record in records {
            let Some(id) = record_id(record).filter(|id| is_safe_identifier(id)) else {
                let warning = ResolutionWarning::MissingField {
                    path: self
                        .namespace
                        .source_dir(&resource.name, command, source_id.unwrap_or_default())
                        .display()
                        .to_string(),
                    field: "id".to_string(),
                };
                tracing::warn!(resource = %resource.name, %command, "{}", warning);
                report.warn(warning);
                continue;
            };

            self.namespace
                .write_record(&resource.name, command, source_id, id, record)?;
            written += 1;
        }

        Ok(written)
    }
}

/// Back up everything in `catalog` from `backend` into `destination`
pub fn backup(
    catalog: &ResourceCatalog,
    backend: &dyn Backend,
    destination: impl Into<PathBuf>,
) -> EnvsyncResult<BackupReport> {
    BackupOrchestrator::new(catalog, backend, destination).run()
}
