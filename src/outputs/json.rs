//! JSON export of the result table.
//!
//! Unlike CSV this keeps nested values and types intact, which makes it the
//! better choice when the dump is going to be post-processed.
//!
//! ```text
//! [
//!   { "index": 0, "record": { "title": "...", "pubdate": 1546300800 } },
//!   ...
//! ]
//! ```

use crate::error::Result;
use crate::models::ResultTable;

pub fn to_json_bytes(table: &ResultTable) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(table)?)
}
