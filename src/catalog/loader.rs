use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::constants::{CATALOG_FILE, PROPERTY_FILE};
use crate::error::{HotelMatchError, Result};
use crate::types::{CatalogRecord, PropertyRecord, SupplierType};

/// Locations of the two CSV files making up a data set
#[derive(Debug, Clone, PartialEq)]
pub struct DataFiles {
    pub property: PathBuf,
    pub catalog: PathBuf,
}

impl DataFiles {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            property: dir.join(PROPERTY_FILE),
            catalog: dir.join(CATALOG_FILE),
        }
    }
}

/// Everything the step endpoints read, loaded once and shared read-only
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub property: PropertyRecord,
    pub records: Arc<[CatalogRecord]>,
}

// Rows are read as optional strings so a blank cell is reported as the
// missing field rather than a generic deserialization failure.
#[derive(Debug, Deserialize)]
struct PropertyRow {
    supplier_type: Option<String>,
    supplier_property_seq: Option<String>,
    name: Option<String>,
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    supplier_type: Option<String>,
    supplier_property_seq: Option<String>,
    name: Option<String>,
    address: Option<String>,
    is_correct: Option<String>,
    similarity_score: Option<String>,
    ml_score: Option<String>,
}

pub fn load_snapshot(files: &DataFiles) -> Result<CatalogSnapshot> {
    let property = load_property(&files.property)?;
    let records = load_catalog(&files.catalog)?;
    info!(
        property = %property.supplier_property_seq,
        catalog_records = records.len(),
        "Loaded catalog data"
    );
    Ok(CatalogSnapshot {
        property,
        records: records.into(),
    })
}

/// Read the first data row of the property file
pub fn load_property(path: impl AsRef<Path>) -> Result<PropertyRecord> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let row: PropertyRow = match reader.deserialize().next() {
        Some(row) => row?,
        None => {
            return Err(HotelMatchError::DataLoad(format!(
                "{} contains no property row",
                path.display()
            )))
        }
    };

    // Header is line 1
    let line = 2;
    Ok(PropertyRecord {
        supplier_type: parse_supplier(required(row.supplier_type, "supplier_type", line)?, line)?,
        supplier_property_seq: required(row.supplier_property_seq, "supplier_property_seq", line)?,
        name: required(row.name, "name", line)?,
        address: required(row.address, "address", line)?,
    })
}

pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<CatalogRecord>> {
    let path = path.as_ref();
    debug!("Reading catalog from {}", path.display());
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<CatalogRow>()
        .enumerate()
        .map(|(idx, row)| catalog_record(row?, idx as u64 + 2))
        .collect()
}

fn catalog_record(row: CatalogRow, line: u64) -> Result<CatalogRecord> {
    Ok(CatalogRecord {
        supplier_type: parse_supplier(required(row.supplier_type, "supplier_type", line)?, line)?,
        supplier_property_seq: required(row.supplier_property_seq, "supplier_property_seq", line)?,
        name: required(row.name, "name", line)?,
        address: required(row.address, "address", line)?,
        similarity_score: parse_score(
            required(row.similarity_score, "similarity_score", line)?,
            "similarity_score",
            line,
        )?,
        ml_score: parse_score(required(row.ml_score, "ml_score", line)?, "ml_score", line)?,
        is_correct: parse_flag(required(row.is_correct, "is_correct", line)?, line)?,
    })
}

fn required(value: Option<String>, field: &str, line: u64) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(HotelMatchError::MissingField {
            field: field.to_string(),
            line,
        }),
    }
}

fn invalid(field: &str, line: u64, value: String) -> HotelMatchError {
    HotelMatchError::InvalidField {
        field: field.to_string(),
        line,
        value,
    }
}

fn parse_supplier(raw: String, line: u64) -> Result<SupplierType> {
    raw.parse().map_err(|_| invalid("supplier_type", line, raw))
}

fn parse_score(raw: String, field: &str, line: u64) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(score) if score.is_finite() => Ok(score),
        _ => Err(invalid(field, line, raw)),
    }
}

// pandas writes True/False
fn parse_flag(raw: String, line: u64) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid("is_correct", line, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const CATALOG_HEADER: &str =
        "supplier_type,supplier_property_seq,name,address,is_correct,similarity_score,ml_score\n";

    #[test]
    fn reads_pandas_style_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CATALOG_FILE);
        fs::write(
            &path,
            format!(
                "{CATALOG_HEADER}AGODA,12345678,Hotel Forza,Osaka,True,0.9712,0.9931\n\
                 HB,00000042,\"Inn Bay, Kobe\",Kobe,False,0.12,0.2\n"
            ),
        )
        .unwrap();

        let records = load_catalog(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].supplier_type, SupplierType::Agoda);
        assert!(records[0].is_correct);
        assert_eq!(records[0].ml_score, 0.9931);
        // Leading zeros survive because the seq stays a string
        assert_eq!(records[1].supplier_property_seq, "00000042");
        assert_eq!(records[1].name, "Inn Bay, Kobe");
        assert!(!records[1].is_correct);
    }

    #[test]
    fn missing_score_is_reported_with_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CATALOG_FILE);
        fs::write(
            &path,
            format!("{CATALOG_HEADER}EPS,1,A,B,False,0.5,0.5\nEPS,2,A,B,False,,0.5\n"),
        )
        .unwrap();

        match load_catalog(&path) {
            Err(HotelMatchError::MissingField { field, line }) => {
                assert_eq!(field, "similarity_score");
                assert_eq!(line, 3);
            }
            other => panic!("expected missing field, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CATALOG_FILE);
        fs::write(
            &path,
            "supplier_type,supplier_property_seq,name,address,is_correct,similarity_score\n\
             EPS,1,A,B,False,0.5\n",
        )
        .unwrap();

        assert!(matches!(
            load_catalog(&path),
            Err(HotelMatchError::MissingField { ref field, .. }) if field == "ml_score"
        ));
    }

    #[test]
    fn unknown_supplier_is_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CATALOG_FILE);
        fs::write(&path, format!("{CATALOG_HEADER}EXPEDIA,1,A,B,False,0.5,0.5\n")).unwrap();

        assert!(matches!(
            load_catalog(&path),
            Err(HotelMatchError::InvalidField { ref field, .. }) if field == "supplier_type"
        ));
    }

    #[test]
    fn empty_catalog_is_not_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CATALOG_FILE);
        fs::write(&path, CATALOG_HEADER).unwrap();
        assert!(load_catalog(&path).unwrap().is_empty());
    }

    #[test]
    fn property_file_without_rows_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(PROPERTY_FILE);
        fs::write(&path, "supplier_type,supplier_property_seq,name,address\n").unwrap();
        assert!(matches!(load_property(&path), Err(HotelMatchError::DataLoad(_))));
    }

    #[test]
    fn missing_file_is_a_csv_error() {
        let dir = tempdir().unwrap();
        let files = DataFiles::in_dir(dir.path());
        assert!(load_snapshot(&files).is_err());
    }
}
