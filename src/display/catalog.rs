//! Catalog display formatting
//!
//! Formats the resource catalog as a table, grouped in traversal order.

use crate::catalog::{ResourceCatalog, ResourceDescriptor};

/// Format the catalog as a table in traversal order
pub fn format_catalog(catalog: &ResourceCatalog) -> String {
    if catalog.is_empty() {
        return "No resources in catalog.".to_string();
    }

    let rows: Vec<(&str, &ResourceDescriptor)> = catalog
        .singleton_resources()
        .map(|r| ("singleton", r))
        .chain(catalog.independent_resources().map(|r| ("first pass", r)))
        .chain(catalog.dependent_resources().map(|r| ("second pass", r)))
        .collect();

    // Calculate column widths
    let name_width = rows.iter().map(|(_, r)| r.name.len()).max().unwrap_or(8).max(8);
    let command_width = rows
        .iter()
        .map(|(_, r)| r.command().len())
        .max()
        .unwrap_or(7)
        .max(7);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<11}  {:<name_width$}  {:<command_width$}  {}\n",
        "Pass",
        "Resource",
        "Command",
        "Source",
        name_width = name_width,
        command_width = command_width,
    ));
    output.push_str(&format!(
        "{:-<11}  {:-<name_width$}  {:-<command_width$}  {:-<20}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
        command_width = command_width,
    ));

    for (pass, resource) in &rows {
        let source = match (&resource.source_type, &resource.assignment) {
            (Some(source), Some(route)) => format!(
                "{} ({}) -> {} {}",
                source,
                resource.parameter_flag(),
                route.resource,
                route.command
            ),
            (Some(source), None) => format!("{} ({})", source, resource.parameter_flag()),
            _ => String::new(),
        };

        output.push_str(&format!(
            "{:<11}  {:<name_width$}  {:<command_width$}  {}\n",
            pass,
            resource.name,
            resource.command(),
            source,
            name_width = name_width,
            command_width = command_width,
        ));
    }

    output.push_str(&format!("\n{} resource(s)\n", rows.len()));
    output
}
