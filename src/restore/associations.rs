//! Association handlers
//!
//! Some backed-up listings describe a link between two entities that were
//! both restored in the first pass (a user's group membership, a role grant,
//! an application's group assignment). Those are not created; instead both
//! endpoints are translated through the ID mapping and a relation call is
//! made. A handler is registered under the resource name it takes over, and
//! the generic second pass skips every descriptor with that name.

use std::path::Path;

use crate::backend::{record_id, Backend, Params, Record};
use crate::error::{EnvsyncResult, ResolutionWarning, RunWarning};
use crate::mapping::IdMappingStore;
use crate::storage::file_io::list_subdirectories;
use crate::storage::{PathNamespace, RecordFile};

use super::orchestrator::RestoreReport;

/// Everything a handler may use while restoring
pub struct AssociationContext<'a> {
    pub backend: &'a dyn Backend,
    pub mapping: &'a IdMappingStore,
    pub namespace: &'a PathNamespace,
    pub report: &'a mut RestoreReport,
}

impl AssociationContext<'_> {
    /// Translate an old identifier, recording a warning when it is unknown
    fn translate(&mut self, resource: &str, old_id: &str) -> Option<String> {
        match self.mapping.get_new_id(resource, old_id) {
            Some(new_id) => Some(new_id.to_string()),
            None => {
                let warning = ResolutionWarning::UnmappedIdentifier {
                    resource: resource.to_string(),
                    old_id: old_id.to_string(),
                };
                tracing::warn!("{}", warning);
                self.report.warn(warning);
                None
            }
        }
    }

    fn read(&mut self, file: &RecordFile) -> Option<Record> {
        match self.namespace.read_record(&file.path) {
            Ok(record) => Some(record),
            Err(warning) => {
                tracing::warn!("{}", warning);
                self.report.warn(warning);
                None
            }
        }
    }

    fn required_field(
        &mut self,
        record: &Record,
        file: &RecordFile,
        field: &str,
    ) -> Option<String> {
        match record.get(field).and_then(|v| v.as_str()) {
            Some(value) => Some(value.to_string()),
            None => {
                let warning = ResolutionWarning::MissingField {
                    path: file.path.display().to_string(),
                    field: field.to_string(),
                };
                tracing::warn!("{}", warning);
                self.report.warn(warning);
                None
            }
        }
    }

    /// Record files in `dir`; a directory that cannot be read is a warning
    fn records_in(&mut self, resource: &str, dir: &Path) -> Vec<RecordFile> {
        match self.namespace.record_files(dir) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "skipping directory");
                self.report.warn(RunWarning::Handler {
                    resource: resource.to_string(),
                    message: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Make a relation call, retrying once with an empty body
    fn associate(&mut self, resource: &str, command: &str, params: &Params, body: &Record) {
        let primary = match self.backend.associate(resource, command, params, Some(body)) {
            Ok(()) => {
                self.report.associated += 1;
                return;
            }
            Err(e) => e,
        };

        tracing::info!(resource, command, error = %primary, "trying alternative assignment method");
        match self.backend.associate(resource, command, params, Some(&Record::new())) {
            Ok(()) => self.report.associated += 1,
            Err(e) => {
                tracing::warn!(resource, command, ?params, error = %e, "association failed");
                self.report.warn(e);
            }
        }
    }

    /// Visit `<dir>/<oldSourceId>/*.json`, translating each source directory
    ///
    /// Source directories without a mapping are skipped entirely.
    fn for_each_by_source(
        &mut self,
        dir: &Path,
        source_type: &str,
        mut visit: impl FnMut(&mut Self, &str, &RecordFile, Record),
    ) -> EnvsyncResult<()> {
        if !dir.is_dir() {
            tracing::debug!(path = %dir.display(), "nothing to restore");
            return Ok(());
        }

        for old_source in list_subdirectories(dir)? {
            let Some(new_source) = self.translate(source_type, &old_source) else {
                continue;
            };

            for file in self.records_in(source_type, &dir.join(&old_source)) {
                if let Some(record) = self.read(&file) {
                    visit(&mut *self, &new_source, &file, record);
                }
            }
        }

        Ok(())
    }
}

/// Restores one relation kind
pub trait AssociationHandler {
    /// Resource name this handler takes over from the generic second pass
    fn resource(&self) -> &str;

    fn restore(&self, ctx: &mut AssociationContext<'_>) -> EnvsyncResult<()>;
}

/// Group assignments of applications
///
/// Read from `applicationgroups/listApplicationGroupAssignments/`. Files
/// directly in that directory carry their application in `appId`; files in
/// a per-application subdirectory (the layout a backup writes) take it from
/// the directory name. The group is the record `id`.
#[derive(Debug, Default)]
pub struct ApplicationGroupsHandler;

impl ApplicationGroupsHandler {
    fn assign(
        &self,
        ctx: &mut AssociationContext<'_>,
        old_app: &str,
        file: &RecordFile,
        record: Record,
    ) {
        let Some(old_group) = ctx.required_field(&record, file, "id") else {
            return;
        };

        // Translate both before deciding so both misses get reported
        let new_app = ctx.translate("application", old_app);
        let new_group = ctx.translate("group", &old_group);
        let (Some(new_app), Some(new_group)) = (new_app, new_group) else {
            return;
        };

        tracing::info!(app = %new_app, group = %new_group, "assigning group to application");
        let mut params = Params::new();
        params.insert("appId".to_string(), new_app);
        params.insert("groupId".to_string(), new_group);
        ctx.associate(self.resource(), "assignGroupToApplication", &params, &record);
    }
}

impl AssociationHandler for ApplicationGroupsHandler {
    fn resource(&self) -> &str {
        "applicationGroups"
    }

    fn restore(&self, ctx: &mut AssociationContext<'_>) -> EnvsyncResult<()> {
        let dir = ctx
            .namespace
            .command_dir(self.resource(), "listApplicationGroupAssignments");
        if !dir.is_dir() {
            return Ok(());
        }

        tracing::info!("restoring application group assignments");

        for file in ctx.namespace.record_files(&dir)? {
            let Some(record) = ctx.read(&file) else {
                continue;
            };
            let Some(old_app) = ctx.required_field(&record, &file, "appId") else {
                continue;
            };
            self.assign(ctx, &old_app, &file, record);
        }

        for old_app in list_subdirectories(&dir)? {
            for file in ctx.records_in(self.resource(), &dir.join(&old_app)) {
                let Some(record) = ctx.read(&file) else {
                    continue;
                };
                let app = match record.get("appId").and_then(|v| v.as_str()) {
                    Some(app) => app.to_string(),
                    None => old_app.clone(),
                };
                self.assign(ctx, &app, &file, record);
            }
        }

        Ok(())
    }
}

/// Group memberships of users, from `user/listGroups/<userId>/<groupId>.json`
#[derive(Debug, Default)]
pub struct UserGroupsHandler;

impl AssociationHandler for UserGroupsHandler {
    fn resource(&self) -> &str {
        "user"
    }

    fn restore(&self, ctx: &mut AssociationContext<'_>) -> EnvsyncResult<()> {
        let dir = ctx.namespace.command_dir(self.resource(), "listGroups");

        ctx.for_each_by_source(&dir, "user", |ctx, new_user, file, record| {
            let Some(old_group) = record_id(&record).map(str::to_string) else {
                let warning = ResolutionWarning::MissingField {
                    path: file.path.display().to_string(),
                    field: "id".to_string(),
                };
                tracing::warn!("{}", warning);
                ctx.report.warn(warning);
                return;
            };
            let Some(new_group) = ctx.translate("group", &old_group) else {
                return;
            };

            tracing::info!(user = %new_user, group = %new_group, "adding user to group");
            let mut params = Params::new();
            params.insert("groupId".to_string(), new_group);
            params.insert("userId".to_string(), new_user.to_string());
            ctx.associate("group", "addUserToGroup", &params, &record);
        })
    }
}

/// Admin role grants, stored per user under `roleassignment/listAssignedRolesForUser/`
#[derive(Debug, Default)]
pub struct RoleAssignmentHandler;

impl AssociationHandler for RoleAssignmentHandler {
    fn resource(&self) -> &str {
        "roleAssignment"
    }

    fn restore(&self, ctx: &mut AssociationContext<'_>) -> EnvsyncResult<()> {
        let dir = ctx
            .namespace
            .command_dir(self.resource(), "listAssignedRolesForUser");

        ctx.for_each_by_source(&dir, "user", |ctx, new_user, file, record| {
            let Some(role_type) = ctx.required_field(&record, file, "type") else {
                return;
            };

            tracing::info!(user = %new_user, role = %role_type, "assigning role to user");
            let mut params = Params::new();
            params.insert("userId".to_string(), new_user.to_string());
            params.insert("type".to_string(), role_type);
            ctx.associate("role", "assignRoleToUser", &params, &record);
        })
    }
}

/// Handlers looked up by resource name
pub struct AssociationRegistry {
    handlers: Vec<Box<dyn AssociationHandler>>,
}

impl AssociationRegistry {
    /// A registry with no handlers; every dependent type uses the generic path
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add a handler, replacing any earlier one for the same resource
    pub fn register(&mut self, handler: Box<dyn AssociationHandler>) {
        self.handlers.retain(|h| h.resource() != handler.resource());
        self.handlers.push(handler);
    }

    pub fn get(&self, resource: &str) -> Option<&dyn AssociationHandler> {
        self.handlers
            .iter()
            .find(|h| h.resource() == resource)
            .map(|h| h.as_ref())
    }

    pub fn handles(&self, resource: &str) -> bool {
        self.get(resource).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn AssociationHandler> {
        self.handlers.iter().map(|h| h.as_ref())
    }
}

impl Default for AssociationRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(ApplicationGroupsHandler));
        registry.register(Box::new(UserGroupsHandler));
        registry.register(Box::new(RoleAssignmentHandler));
        registry
    }
}
