//! Streaming CSV row source

use super::{RawValue, Record, RecordIter, RowSource};
use crate::error::{Result, TabrixError};
use std::path::{Path, PathBuf};

/// A CSV-backed row source.
///
/// Each call to [`RowSource::rows`] re-opens the file and streams records one
/// at a time; nothing beyond the current row is held in memory. Field values
/// are sniffed per cell: empty fields become `Null`, fields that parse as a
/// finite float become `Number`, everything else becomes `Text`.
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvRowSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter: b',',
        }
    }

    /// Set the field delimiter (defaults to `,`).
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_reader(&self) -> Result<csv::Reader<std::fs::File>> {
        csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| TabrixError::Data(format!("cannot open {}: {e}", self.path.display())))
    }
}

fn sniff_value(field: &str) -> RawValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return RawValue::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(x) if x.is_finite() => RawValue::Number(x),
        _ => RawValue::Text(trimmed.to_string()),
    }
}

impl RowSource for CsvRowSource {
    fn columns(&self) -> Result<Vec<String>> {
        let mut reader = self.open_reader()?;
        let headers = reader.headers()?;
        Ok(headers.iter().map(|h| h.trim().to_string()).collect())
    }

    fn rows(&self) -> Result<RecordIter> {
        let mut reader = self.open_reader()?;
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let iter = reader.into_records().map(move |row| {
            let row = row.map_err(|e| TabrixError::Data(e.to_string()))?;
            let mut record = Record::with_capacity(headers.len());
            for (name, field) in headers.iter().zip(row.iter()) {
                record.insert(name.clone(), sniff_value(field));
            }
            Ok(record)
        });

        Ok(Box::new(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "age,city,active").unwrap();
        writeln!(file, "25,NYC,true").unwrap();
        writeln!(file, ",LA,false").unwrap();
        writeln!(file, "35,,true").unwrap();
        file
    }

    #[test]
    fn test_columns() {
        let file = sample_csv();
        let source = CsvRowSource::new(file.path());
        assert_eq!(source.columns().unwrap(), vec!["age", "city", "active"]);
    }

    #[test]
    fn test_type_sniffing() {
        let file = sample_csv();
        let source = CsvRowSource::new(file.path());
        let rows = source.peek(3).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("age"), Some(&RawValue::Number(25.0)));
        assert_eq!(rows[0].get("city"), Some(&RawValue::Text("NYC".into())));
        assert_eq!(rows[1].get("age"), Some(&RawValue::Null));
        assert_eq!(rows[2].get("city"), Some(&RawValue::Null));
    }

    #[test]
    fn test_reopen_yields_same_rows() {
        let file = sample_csv();
        let source = CsvRowSource::new(file.path());

        let first: Vec<Record> = source.rows().unwrap().map(|r| r.unwrap()).collect();
        let second: Vec<Record> = source.rows().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let file = sample_csv();
        let source = CsvRowSource::new(file.path());

        let _ = source.peek(2).unwrap();
        let all: Vec<Record> = source.rows().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let source = CsvRowSource::new("/nonexistent/data.csv");
        assert!(source.columns().is_err());
    }
}
