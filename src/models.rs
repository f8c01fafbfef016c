//! Data models for search requests and the accumulated article table.
//!
//! This module defines the core data structures used throughout the application:
//! - [`QueryParameters`]: Everything needed to build one search URL
//! - [`SortMode`]: Result ordering understood by the search endpoint
//! - [`SearchWindow`]: One contiguous date sub-range fetched as a unit
//! - [`ResultTable`]: Article records accumulated over a whole run
//!
//! Article records are kept as raw JSON objects; the search API's schema is
//! not validated or interpreted here.

use chrono::NaiveDate;
use clap::ValueEnum;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// A single article record as returned in a response's `matches` array.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Result ordering.
///
/// The endpoint encodes these as integers: relevance is `1`, date is `2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Relevance,
    #[default]
    Date,
}

impl SortMode {
    /// The value sent as the `sort` query parameter.
    pub fn as_param(self) -> u8 {
        match self {
            SortMode::Relevance => 1,
            SortMode::Date => 2,
        }
    }
}

/// Parameters for one search request.
///
/// `material_type` and `bloc` are filters where the endpoint's "all" value is
/// zero. They are modelled as `Option<NonZeroU32>` so that "no filter" cannot
/// be confused with a real value; [`QueryParameters::filter`] performs the
/// zero-to-`None` conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameters {
    /// Free-text search query; may be empty.
    pub query: String,
    /// Pagination offset (`from`).
    pub offset: u64,
    /// Page size (`size`).
    pub size: u64,
    pub sort: SortMode,
    /// Match the query against titles only.
    pub title_only: bool,
    pub domain: u32,
    /// Material type filter, e.g. `1` for news items.
    pub material_type: Option<NonZeroU32>,
    /// Category ("bloc") filter, e.g. `4` for economics.
    pub bloc: Option<NonZeroU32>,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl QueryParameters {
    /// Convert a raw filter value, treating `0` as "any".
    pub fn filter(value: u32) -> Option<NonZeroU32> {
        NonZeroU32::new(value)
    }

    /// A copy of these parameters narrowed to a single window.
    pub fn for_window(&self, window: &SearchWindow) -> Self {
        Self {
            date_from: window.from,
            date_to: window.to,
            ..self.clone()
        }
    }
}

/// An inclusive date sub-range `[from, to]` fetched with one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl SearchWindow {
    /// Number of calendar days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

/// One row of the accumulated table.
///
/// `index` is the record's position inside the response it came from, so it
/// restarts at zero for every window. It is written out as the first column
/// of exported tables and carries no other meaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub index: usize,
    pub record: Record,
}

/// Ordered, append-only collection of article records for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<TableRow>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the records returned for one window, numbering them from zero.
    pub fn append_window(&mut self, records: Vec<Record>) {
        self.rows.extend(
            records
                .into_iter()
                .enumerate()
                .map(|(index, record)| TableRow { index, record }),
        );
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Union of all record keys, in order of first appearance.
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flat_map(|row| row.record.keys().map(String::as_str))
            .unique()
            .collect()
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> &[TableRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}
