//! Restore system for envsync
//!
//! Recreates a backup directory on a target org. New objects get new
//! identifiers, so every reference inside the backup is translated through
//! the persisted ID mapping (`id_mapping.json` at the backup root).
//!
//! # Phases
//!
//! 1. Singleton resources are re-applied as-is
//! 2. First pass: independent resources are created and their old to new
//!    identifier pairs recorded
//! 3. Second pass: dependent resources are created (or assigned) under the
//!    translated identifier of their source
//! 4. Association handlers restore relations between first pass objects
//!
//! Anything that cannot be resolved is skipped with a warning; the run only
//! aborts if the mapping cannot be read or written.

mod associations;
mod orchestrator;

pub use associations::{
    ApplicationGroupsHandler, AssociationContext, AssociationHandler, AssociationRegistry,
    RoleAssignmentHandler, UserGroupsHandler,
};
pub use orchestrator::{restore, RestoreOptions, RestoreOrchestrator, RestorePhase, RestoreReport};
