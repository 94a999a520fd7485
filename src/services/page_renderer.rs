//! HTML fragment for the `test` table.
//!
//! Values are written as-is, without escaping.

use std::fmt::Write;

use crate::error::DataSourceError;
use crate::models::TableRow;

pub const TABLE_HEADING: &str = "<h2>Data from 'test' table:</h2>";
pub const FAILURE_PREFIX: &str = "❌ Database connection failed: ";

pub fn render_table(rows: &[TableRow]) -> String {
    let mut out = String::from(TABLE_HEADING);
    out.push_str("<table border='1'><tr><th>ID</th><th>Name</th></tr>");
    for row in rows {
        let _ = write!(out, "<tr><td>{}</td><td>{}</td></tr>", row.id, row.name);
    }
    out.push_str("</table>");
    out
}

pub fn render_failure(err: &DataSourceError) -> String {
    format!("{}{}", FAILURE_PREFIX, err.message())
}
