//! CSV export of the result table.
//!
//! Layout mirrors a spreadsheet dump of the table: an unnamed first column
//! holding the per-window row index, then one column per record key in order
//! of first appearance. Records missing a key get an empty cell.

use crate::error::Result;
use crate::models::ResultTable;
use serde_json::Value;

/// Render a single JSON value as a CSV cell.
///
/// Strings are written without quotes, `null` as an empty cell, nested
/// arrays/objects as compact JSON.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn to_csv_bytes(table: &ResultTable) -> Result<Vec<u8>> {
    let columns = table.columns();
    let mut writer = ::csv::Writer::from_writer(Vec::new());

    writer.write_record(std::iter::once("").chain(columns.iter().copied()))?;
    for row in table.rows() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(row.index.to_string());
        record.extend(columns.iter().map(|c| cell(row.record.get(*c))));
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()).into())
}
