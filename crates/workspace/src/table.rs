//! Tabular flattener: typed records to a textual table.

use crate::rule;
use recall_core::workspace::{Column, Record, Table};

/// Shown for a record with no value in a schema column.
pub const MISSING_VALUE: &str = "N/A";

const ENTRY_RULE_WIDTH: usize = 40;

/// Flatten a table. Every entry lists the schema columns in schema order,
/// whatever order the record's own values come in.
pub fn flatten_table(title: &str, schema: &[Column], records: &[Record]) -> String {
    let mut out = format!("Database: {title}\n{}\n\n", rule());

    out.push_str("Properties:\n");
    for column in schema {
        out.push_str(&format!("- {} ({})\n", column.name, column.kind));
    }
    out.push('\n');

    out.push_str("Entries:\n");
    let entry_rule = "-".repeat(ENTRY_RULE_WIDTH);
    for record in records {
        out.push_str(&entry_rule);
        out.push('\n');
        for column in schema {
            let value = record
                .get(&column.name)
                .map(ToString::to_string)
                .unwrap_or_else(|| MISSING_VALUE.to_string());
            out.push_str(&format!("{}: {value}\n", column.name));
        }
        out.push('\n');
    }
    out
}

/// Flatten a fetched [`Table`].
pub fn flatten(table: &Table) -> String {
    flatten_table(&table.title, &table.schema, &table.records)
}

/// Frame a flattened table for the aggregate's tables section.
pub fn table_section(flattened: &str) -> String {
    format!("\n{}\n{flattened}\n\n", rule())
}
