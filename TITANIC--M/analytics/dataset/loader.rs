use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use super::record::{PassengerClass, PassengerRecord, PassengerTable, Sex};

/// Columns the loader keeps; every other column is ignored.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Survived", "Pclass", "Sex", "Age"];

/// Cell contents read as missing, matched case-sensitively like pandas'
/// default `na_values`.
pub const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Raw row, every retained field optional so empty cells can be dropped.
#[derive(Debug, Deserialize)]
struct RawPassenger {
    #[serde(rename = "Survived")]
    survived: Option<String>,
    #[serde(rename = "Pclass")]
    pclass: Option<String>,
    #[serde(rename = "Sex")]
    sex: Option<String>,
    #[serde(rename = "Age")]
    age: Option<String>,
}

impl RawPassenger {
    /// Returns `Ok(None)` for incomplete rows.
    fn into_record(self, line: u64) -> Result<Option<PassengerRecord>, DatasetError> {
        let (Some(survived), Some(pclass), Some(sex), Some(age)) = (
            non_empty(self.survived),
            non_empty(self.pclass),
            non_empty(self.sex),
            non_empty(self.age),
        ) else {
            return Ok(None);
        };

        let survived = match integral_text(&survived) {
            "1" => true,
            "0" => false,
            _ => return Err(invalid(line, "Survived", survived.clone())),
        };
        let class = integral_text(&pclass)
            .parse::<u8>()
            .ok()
            .and_then(|number| PassengerClass::try_from(number).ok())
            .ok_or_else(|| invalid(line, "Pclass", pclass.clone()))?;
        let sex = sex
            .parse::<Sex>()
            .map_err(|_| invalid(line, "Sex", sex.clone()))?;
        let age = match age.parse::<f64>() {
            Ok(value) if value.is_nan() => return Ok(None),
            Ok(value) if value.is_finite() && value > 0.0 => value,
            _ => return Err(invalid(line, "Age", age)),
        };

        Ok(Some(PassengerRecord {
            survived,
            class,
            sex,
            age,
        }))
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && !MISSING_MARKERS.contains(&value.as_str()))
}

/// `"2.0"` and `"2."` become `"2"`; anything else is returned unchanged.
fn integral_text(value: &str) -> &str {
    match value.split_once('.') {
        Some((whole, fraction)) if !whole.is_empty() && fraction.bytes().all(|b| b == b'0') => {
            whole
        }
        _ => value,
    }
}

fn invalid(line: u64, column: &'static str, value: String) -> DatasetError {
    DatasetError::InvalidValue {
        line,
        column,
        value,
    }
}

/// Reads the passenger CSV at `path`, keeping the four retained columns and
/// dropping incomplete rows.
pub fn load_passengers(path: impl AsRef<Path>) -> Result<PassengerTable, DatasetError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_passengers(file, path)
}

/// Parses passenger CSV from any reader; `source` is only used for diagnostics.
pub fn parse_passengers(
    reader: impl Read,
    source: impl AsRef<Path>,
) -> Result<PassengerTable, DatasetError> {
    let source = source.as_ref();
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|err| malformed(&err, source))?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(DatasetError::MissingColumn {
                path: source.to_path_buf(),
                column,
            });
        }
    }

    let mut records = Vec::new();
    let mut rows_read = 0usize;
    for row in csv_reader.records() {
        let row = row.map_err(|err| malformed(&err, source))?;
        rows_read += 1;
        let line = row.position().map_or(0, csv::Position::line);
        let raw: RawPassenger = row
            .deserialize(Some(&headers))
            .map_err(|err| malformed(&err, source))?;
        if let Some(record) = raw.into_record(line)? {
            records.push(record);
        }
    }

    if records.is_empty() {
        return Err(DatasetError::NoCompleteRows {
            path: source.to_path_buf(),
            rows_read,
        });
    }
    Ok(PassengerTable::new(records, source, rows_read))
}

fn malformed(err: &csv::Error, source: &Path) -> DatasetError {
    DatasetError::Malformed {
        path: source.to_path_buf(),
        line: err.position().map_or(0, csv::Position::line),
        message: err.to_string(),
    }
}

/// Errors raised while loading the passenger dataset. All of them are fatal
/// for dashboard startup.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be opened or read.
    #[error("cannot read dataset {}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The header row lacks a retained column.
    #[error("dataset {} has no `{column}` column", path.display())]
    MissingColumn {
        /// Dataset path.
        path: PathBuf,
        /// Missing column name.
        column: &'static str,
    },
    /// The CSV structure itself is broken.
    #[error("malformed dataset {} at line {line}: {message}", path.display())]
    Malformed {
        /// Dataset path.
        path: PathBuf,
        /// 1-based line number, 0 when unknown.
        line: u64,
        /// Parser message.
        message: String,
    },
    /// A present value is outside its column's domain.
    #[error("invalid {column} value {value:?} at line {line}")]
    InvalidValue {
        /// 1-based line number.
        line: u64,
        /// Column name.
        column: &'static str,
        /// Offending raw value.
        value: String,
    },
    /// Nothing is left after dropping incomplete rows.
    #[error(
        "dataset {} has no complete rows ({rows_read} read, all missing Survived/Pclass/Sex/Age)",
        path.display()
    )]
    NoCompleteRows {
        /// Dataset path.
        path: PathBuf,
        /// Data rows read before filtering.
        rows_read: usize,
    },
}
