//! Configuration module for envsync
//!
//! This module provides configuration management including:
//! - Path resolution for the org config file and backup roots
//! - Org URL parsing and the developer-org guard

pub mod org;
pub mod paths;

pub use org::OrgConfig;
pub use paths::EnvsyncPaths;
