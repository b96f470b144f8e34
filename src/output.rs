//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use tabled::{Table, Tabled};

use crate::models::{ClassSchema, ExternalIdMatch, PropertyMap};

/// Trait for human-readable output.
///
/// Implemented by result types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for PropertyMap {
    fn pretty_print(&self) -> String {
        let width = self.keys().map(|k| k.len()).max().unwrap_or(0) + 2;
        self.iter()
            .map(|(name, value)| format!("{:<width$}{}", format!("{name}:"), value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PrettyPrint for ClassSchema {
    fn pretty_print(&self) -> String {
        let header = format!("Class: {}", self.name);
        let divider = "─".repeat(header.len().max(30));
        let rows: Vec<PropertyRow> = self
            .properties
            .iter()
            .map(|(name, property)| PropertyRow {
                name: name.clone(),
                type_name: match &property.number_type {
                    Some(number) => format!("{} ({number})", property.type_name),
                    None => property.type_name.clone(),
                },
                values: property
                    .values
                    .as_ref()
                    .map(|values| values.keys().cloned().collect::<Vec<_>>().join(", "))
                    .unwrap_or_default(),
            })
            .collect();

        format!("{header}\n{divider}\n{}", Table::new(rows))
    }
}

impl PrettyPrint for ExternalIdMatch {
    fn pretty_print(&self) -> String {
        match self {
            ExternalIdMatch::Single(id) => id.clone(),
            ExternalIdMatch::Multiple(ids) => {
                format!("{} patients match:\n{}", ids.len(), ids.join("\n"))
            }
        }
    }
}

#[derive(Tabled)]
struct PropertyRow {
    name: String,
    #[tabled(rename = "type")]
    type_name: String,
    values: String,
}
