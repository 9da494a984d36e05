//! Storage layer for envsync
//!
//! Provides JSON file storage with atomic writes and the path namespace that
//! backups are written into and restores read from.

pub mod file_io;
pub mod namespace;

pub use file_io::{read_json_required, write_json_atomic};
pub use namespace::{is_safe_identifier, PathNamespace, RecordFile};
