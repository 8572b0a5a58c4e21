//! Row sources and raw value types
//!
//! A row source produces a lazy, finite, one-shot stream of records
//! (`{column name -> raw value}`). Traversal consumes the stream; a fresh
//! traversal is obtained by re-opening the source.

mod csv_source;

pub use csv_source::CsvRowSource;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A raw cell value as produced by CSV parsing with type sniffing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Null,
}

impl RawValue {
    /// The value as a finite number, if it is one.
    ///
    /// Non-numbers and non-finite numbers both come back `None`; statistics
    /// and encoding treat them as missing rather than zero-filling.
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            RawValue::Number(x) if x.is_finite() => Some(*x),
            _ => None,
        }
    }

    /// Normalize the value into a categorical token.
    ///
    /// `Null` and the empty string come back `None` (the caller substitutes
    /// the sentinel token); every other value is stringified. Used
    /// identically by vocabulary building and row encoding, so the two passes
    /// can never disagree on a token.
    pub fn as_token(&self) -> Option<String> {
        match self {
            RawValue::Null => None,
            RawValue::Text(s) if s.is_empty() => None,
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Number(x) => Some(x.to_string()),
        }
    }
}

/// One raw row: column name to raw value. Column order lives in the schema,
/// not in the record.
pub type Record = HashMap<String, RawValue>;

/// Boxed traversal over all records of a source.
pub type RecordIter = Box<dyn Iterator<Item = Result<Record>>>;

/// A re-creatable, one-shot stream of records.
///
/// `rows` opens a fresh traversal each time it is called; iteration consumes
/// it. I/O failures mid-stream surface as `Err` items and abort the pass.
pub trait RowSource {
    /// Column names in source order.
    fn columns(&self) -> Result<Vec<String>>;

    /// Open a fresh traversal over all rows.
    fn rows(&self) -> Result<RecordIter>;

    /// Read up to `n` records from a fresh traversal.
    fn peek(&self, n: usize) -> Result<Vec<Record>> {
        self.rows()?.take(n).collect()
    }
}
