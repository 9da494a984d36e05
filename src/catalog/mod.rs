//! Resource catalog
//!
//! Declarative table of the resource types envsync knows how to back up and
//! restore. The catalog is built once at start-up and passed by reference to
//! every orchestrator call; it is never mutated afterwards.
//!
//! # Passes
//!
//! - Singleton resources: fetched with a get command, one record each
//! - Independent resources: listable without any other identifier
//! - Dependent resources: listed once per identifier of their source type
//!
//! Every dependent descriptor's source type must be an independent listable
//! resource, so the dependency graph never has more than two levels.
//!
//! # Example
//!
//! ```rust,ignore
//! use envsync::catalog::ResourceCatalog;
//!
//! let catalog = ResourceCatalog::builtin();
//! catalog.validate()?;
//! for resource in catalog.independent_resources() {
//!     println!("{} {}", resource.name, resource.list_command);
//! }
//! ```

mod defaults;
mod descriptor;

pub use descriptor::{
    parameter_flag_for, AssignmentRoute, DependencyKind, ResourceDescriptor, RetrievalCapability,
};

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, EnvsyncResult};
use crate::storage::file_io::{read_json_required, write_json_atomic};

/// Ordered collection of resource descriptors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCatalog {
    resources: Vec<ResourceDescriptor>,
}

impl ResourceCatalog {
    /// Create a catalog without validating it
    pub fn new(resources: Vec<ResourceDescriptor>) -> Self {
        Self { resources }
    }

    /// Create a catalog, failing if it is malformed
    pub fn validated(resources: Vec<ResourceDescriptor>) -> Result<Self, CatalogError> {
        let catalog = Self::new(resources);
        catalog.validate()?;
        Ok(catalog)
    }

    /// The built-in catalog of identity-platform resources
    pub fn builtin() -> Self {
        Self::new(defaults::builtin_resources())
    }

    /// Load a catalog from a JSON file and validate it
    pub fn load(path: &Path) -> EnvsyncResult<Self> {
        let catalog: ResourceCatalog = read_json_required(path)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Write the catalog to a JSON file
    pub fn save(&self, path: &Path) -> EnvsyncResult<()> {
        write_json_atomic(path, self)
    }

    /// Check referential integrity of the catalog
    ///
    /// Fails if a descriptor has no command or if a (name, command) pair is
    /// declared twice. A singleton may not be dependent, and only dependent
    /// descriptors may carry a source type, which must name an independent
    /// listable resource.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();

        for resource in &self.resources {
            if resource.command().is_empty() {
                return Err(CatalogError::MissingCommand {
                    resource: resource.name.clone(),
                });
            }

            let key = (
                resource.name.to_lowercase(),
                resource.command().to_string(),
            );
            if !seen.insert(key) {
                return Err(CatalogError::Duplicate {
                    resource: resource.name.clone(),
                    command: resource.command().to_string(),
                });
            }

            if resource.is_singleton() && resource.is_dependent() {
                return Err(CatalogError::DependentSingleton {
                    resource: resource.name.clone(),
                    command: resource.command().to_string(),
                });
            }

            if !resource.is_dependent() {
                if let Some(source) = &resource.source_type {
                    return Err(CatalogError::UnexpectedSource {
                        resource: resource.name.clone(),
                        command: resource.command().to_string(),
                        source_type: source.clone(),
                    });
                }
                continue;
            }

            let source = match resource.source_type.as_deref() {
                Some(source) if !source.is_empty() => source,
                _ => {
                    return Err(CatalogError::MissingSource {
                        resource: resource.name.clone(),
                        command: resource.command().to_string(),
                    })
                }
            };

            if self.source_for(source).is_none() {
                if source == resource.name {
                    return Err(CatalogError::SelfReference {
                        resource: resource.name.clone(),
                        command: resource.command().to_string(),
                    });
                }
                return Err(CatalogError::UnresolvedSource {
                    resource: resource.name.clone(),
                    command: resource.command().to_string(),
                    source_type: source.to_string(),
                });
            }
        }

        Ok(())
    }

    /// All descriptors in declaration order
    pub fn resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    /// Independent listable resources (first pass)
    pub fn independent_resources(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources
            .iter()
            .filter(|r| !r.is_singleton() && !r.is_dependent())
    }

    /// Dependent resources (second pass)
    pub fn dependent_resources(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources
            .iter()
            .filter(|r| !r.is_singleton() && r.is_dependent())
    }

    /// Singleton resources
    pub fn singleton_resources(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources.iter().filter(|r| r.is_singleton())
    }

    /// The independent descriptor that supplies identifiers for `source_type`
    pub fn source_for(&self, source_type: &str) -> Option<&ResourceDescriptor> {
        self.independent_resources().find(|r| r.name == source_type)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for ResourceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnvsyncError;
    use tempfile::TempDir;

    fn small_catalog() -> Vec<ResourceDescriptor> {
        vec![
            ResourceDescriptor::independent("group", "lists"),
            ResourceDescriptor::dependent("groupMembers", "listUsers", "group"),
            ResourceDescriptor::singleton("orgSetting", "gets"),
        ]
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = ResourceCatalog::builtin();
        assert!(catalog.validate().is_ok());
        assert!(catalog.independent_resources().count() > 0);
        assert!(catalog.dependent_resources().count() > 0);
        assert!(catalog.singleton_resources().count() > 0);
    }

    #[test]
    fn test_every_dependent_resolves_to_independent() {
        let catalog = ResourceCatalog::builtin();
        for dependent in catalog.dependent_resources() {
            let source = dependent.source_type.as_deref().unwrap();
            let resolved = catalog.source_for(source).unwrap();
            assert!(!resolved.is_dependent());
            assert!(!resolved.is_singleton());
        }
    }

    #[test]
    fn test_passes_preserve_declaration_order() {
        let catalog = ResourceCatalog::validated(small_catalog()).unwrap();
        let names = |pass: Vec<&ResourceDescriptor>| -> Vec<String> {
            pass.into_iter().map(|r| r.name.clone()).collect()
        };
        assert_eq!(names(catalog.independent_resources().collect()), vec!["group"]);
        assert_eq!(names(catalog.dependent_resources().collect()), vec!["groupMembers"]);
        assert_eq!(names(catalog.singleton_resources().collect()), vec!["orgSetting"]);
    }

    #[test]
    fn test_unresolved_source_fails() {
        let mut resources = small_catalog();
        resources.push(ResourceDescriptor::dependent(
            "authorizationServerRules",
            "listAuthorizationServerPolicyRules",
            "authorizationServerPolicy",
        ));
        let err = ResourceCatalog::validated(resources).unwrap_err();
        assert!(matches!(err, CatalogError::UnresolvedSource { .. }));
    }

    #[test]
    fn test_self_reference_fails() {
        let mut resources = small_catalog();
        resources.push(ResourceDescriptor::dependent("policy", "listRules", "policy"));
        let err = ResourceCatalog::validated(resources).unwrap_err();
        assert!(matches!(err, CatalogError::SelfReference { .. }));
    }

    #[test]
    fn test_dependent_cannot_source_dependent() {
        let mut resources = small_catalog();
        resources.push(ResourceDescriptor::dependent(
            "memberFactors",
            "listFactors",
            "groupMembers",
        ));
        let err = ResourceCatalog::validated(resources).unwrap_err();
        assert!(matches!(err, CatalogError::UnresolvedSource { .. }));
    }

    #[test]
    fn test_missing_source_fails() {
        let mut dependent = ResourceDescriptor::dependent("groupMembers", "listOwners", "group");
        dependent.source_type = None;
        let mut resources = small_catalog();
        resources.push(dependent);
        let err = ResourceCatalog::validated(resources).unwrap_err();
        assert!(matches!(err, CatalogError::MissingSource { .. }));
    }

    #[test]
    fn test_independent_with_source_type_fails() {
        let mut independent = ResourceDescriptor::independent("application", "lists");
        independent.source_type = Some("group".into());
        let mut resources = small_catalog();
        resources.push(independent);
        let err = ResourceCatalog::validated(resources).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnexpectedSource {
                resource: "application".into(),
                command: "lists".into(),
                source_type: "group".into(),
            }
        );
    }

    #[test]
    fn test_singleton_with_source_type_fails() {
        let mut singleton = ResourceDescriptor::singleton("threatInsight", "getConfiguration");
        singleton.source_type = Some("group".into());
        let mut resources = small_catalog();
        resources.push(singleton);
        let err = ResourceCatalog::validated(resources).unwrap_err();
        assert!(matches!(err, CatalogError::UnexpectedSource { .. }));
    }

    #[test]
    fn test_dependent_singleton_fails() {
        let mut singleton = ResourceDescriptor::singleton("threatInsight", "getConfiguration");
        singleton.dependency = DependencyKind::Dependent;
        singleton.source_type = Some("group".into());
        let mut resources = small_catalog();
        resources.push(singleton);
        let err = ResourceCatalog::validated(resources).unwrap_err();
        assert!(matches!(err, CatalogError::DependentSingleton { .. }));
    }

    #[test]
    fn test_duplicate_descriptor_fails() {
        let mut resources = small_catalog();
        resources.push(ResourceDescriptor::independent("group", "lists"));
        let err = ResourceCatalog::validated(resources).unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate { .. }));
    }

    #[test]
    fn test_missing_command_fails() {
        let mut resources = small_catalog();
        resources.push(ResourceDescriptor::singleton("threatInsight", ""));
        let err = ResourceCatalog::validated(resources).unwrap_err();
        assert!(matches!(err, CatalogError::MissingCommand { .. }));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.json");

        let catalog = ResourceCatalog::builtin();
        catalog.save(&path).unwrap();

        let loaded = ResourceCatalog::load(&path).unwrap();
        assert_eq!(catalog, loaded);
    }

    #[test]
    fn test_load_rejects_invalid_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.json");

        let catalog = ResourceCatalog::new(vec![ResourceDescriptor::dependent(
            "groupMembers",
            "listUsers",
            "group",
        )]);
        catalog.save(&path).unwrap();

        let err = ResourceCatalog::load(&path).unwrap_err();
        assert!(matches!(err, EnvsyncError::Catalog(_)));
    }
}
