//! Run report display formatting
//!
//! Formats backup and restore reports, the backup manifest and mapping
//! statistics for terminal output.

use crate::backup::{BackupManifest, BackupReport};
use crate::error::RunWarning;
use crate::mapping::IdMappingStore;
use crate::restore::RestoreReport;

/// Warnings shown in full before the rest are summarized
const MAX_LISTED_WARNINGS: usize = 20;

/// Format a finished backup
pub fn format_backup_report(report: &BackupReport) -> String {
    let mut output = String::new();

    output.push_str("Backup complete\n");
    output.push_str(&format!("  Singleton records:    {}\n", report.singleton_records));
    output.push_str(&format!("  First pass records:   {}\n", report.independent_records));
    output.push_str(&format!("  Second pass records:  {}\n", report.dependent_records));
    output.push_str(&format!("  Total:                {}\n", report.total_records()));
    output.push_str(&format_warnings(&report.warnings));

    output
}

/// Format a finished restore
pub fn format_restore_report(report: &RestoreReport) -> String {
    let mut output = String::new();

    output.push_str("Restore complete\n");
    output.push_str(&format!("  Singletons:           {}\n", report.singletons));
    output.push_str(&format!("  Created and mapped:   {}\n", report.created));
    if report.skipped_existing > 0 {
        output.push_str(&format!("  Already mapped:       {}\n", report.skipped_existing));
    }
    output.push_str(&format!("  Second pass records:  {}\n", report.dependents));
    output.push_str(&format!("  Associations:         {}\n", report.associated));
    if report.conflicts() > 0 {
        output.push_str(&format!("  Already existed:      {}\n", report.conflicts()));
    }
    output.push_str(&format_warnings(&report.warnings));

    output
}

fn format_warnings(warnings: &[RunWarning]) -> String {
    if warnings.is_empty() {
        return "  Warnings:             none\n".to_string();
    }

    let mut output = format!("  Warnings:             {}\n", warnings.len());
    for warning in warnings.iter().take(MAX_LISTED_WARNINGS) {
        output.push_str(&format!("    - {}\n", warning));
    }
    if warnings.len() > MAX_LISTED_WARNINGS {
        output.push_str(&format!(
            "    ... and {} more\n",
            warnings.len() - MAX_LISTED_WARNINGS
        ));
    }
    output
}

/// Format a backup manifest
pub fn format_manifest(manifest: &BackupManifest) -> String {
    let mut output = String::new();

    output.push_str("Backup\n");
    output.push_str(&format!(
        "  Created:              {}\n",
        manifest.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(org) = &manifest.org_name {
        output.push_str(&format!("  Org:                  {}\n", org));
    }
    output.push_str(&format!("  Schema version:       {}\n", manifest.schema_version));
    output.push_str(&format!("  Singleton records:    {}\n", manifest.singleton_records));
    output.push_str(&format!("  First pass records:   {}\n", manifest.independent_records));
    output.push_str(&format!("  Second pass records:  {}\n", manifest.dependent_records));
    output.push_str(&format!("  Warnings:             {}\n", manifest.warnings));

    output
}

/// Format the per-resource counts of an ID mapping
pub fn format_mapping(mapping: &IdMappingStore) -> String {
    if mapping.is_empty() {
        return "No ID mappings recorded.\n".to_string();
    }

    let counts = mapping.counts();
    let width = counts.iter().map(|(r, _)| r.len()).max().unwrap_or(8).max(8);

    let mut output = String::new();
    output.push_str(&format!("{:<width$}  {:>8}\n", "Resource", "Mapped", width = width));
    output.push_str(&format!("{:-<width$}  {:->8}\n", "", "", width = width));
    for (resource, count) in &counts {
        output.push_str(&format!("{:<width$}  {:>8}\n", resource, count, width = width));
    }
    output.push_str(&format!("{:-<width$}  {:->8}\n", "", "", width = width));
    output.push_str(&format!("{:<width$}  {:>8}\n", "TOTAL", mapping.len(), width = width));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, ResolutionWarning};
    use tempfile::TempDir;

    #[test]
    fn test_backup_report_lists_warnings() {
        let report = BackupReport {
            independent_records: 3,
            warnings: vec![RunWarning::Resolution(ResolutionWarning::UnmappedIdentifier {
                resource: "group".into(),
                old_id: "g1".into(),
            })],
            ..Default::default()
        };

        let output = format_backup_report(&report);
        assert!(output.contains("First pass records:   3"));
        assert!(output.contains("could not find new ID for group g1"));
    }

    #[test]
    fn test_restore_report_truncates_warnings() {
        let warning = RunWarning::Backend(BackendError::Conflict {
            resource: "group".into(),
            command: "create".into(),
            message: "exists".into(),
        });
        let report = RestoreReport {
            warnings: vec![warning; MAX_LISTED_WARNINGS + 5],
            ..Default::default()
        };

        let output = format_restore_report(&report);
        assert!(output.contains("... and 5 more"));
        assert!(output.contains("Already existed:      25"));
    }

    #[test]
    fn test_format_mapping() {
        let temp_dir = TempDir::new().unwrap();
        let mut mapping = IdMappingStore::new(temp_dir.path().join("id_mapping.json"));
        assert_eq!(format_mapping(&mapping), "No ID mappings recorded.\n");

        mapping.add_mapping("group", "g1", "n1").unwrap();
        mapping.add_mapping("group", "g2", "n2").unwrap();
        mapping.add_mapping("user", "u1", "n3").unwrap();

        let output = format_mapping(&mapping);
        assert!(output.contains("group"));
        assert!(output.lines().last().unwrap().ends_with("3"));
    }
}
