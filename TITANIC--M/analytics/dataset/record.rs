use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::controls::InputError;

/// Passenger sex as recorded in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// `male`
    Male,
    /// `female`
    Female,
}

impl Sex {
    /// Both values in display order.
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];

    /// Dataset spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = InputError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(InputError::UnknownSex(raw.trim().to_string())),
        }
    }
}

/// Ticket class, 1 being the most expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PassengerClass {
    /// First class.
    First,
    /// Second class.
    Second,
    /// Third class.
    Third,
}

impl PassengerClass {
    /// All classes in ordinal order.
    pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Third];

    /// Ordinal as written in the `Pclass` column.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }
}

impl TryFrom<u8> for PassengerClass {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            other => Err(InputError::UnknownClass(i64::from(other))),
        }
    }
}

impl TryFrom<i64> for PassengerClass {
    type Error = InputError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| InputError::UnknownClass(value))
            .and_then(Self::try_from)
    }
}

impl From<PassengerClass> for u8 {
    fn from(class: PassengerClass) -> Self {
        class.number()
    }
}

impl fmt::Display for PassengerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// One complete row of the working dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassengerRecord {
    /// Whether the passenger survived.
    pub survived: bool,
    /// Travel class.
    pub class: PassengerClass,
    /// Sex.
    pub sex: Sex,
    /// Age in years, always finite and positive.
    pub age: f64,
}

/// Immutable working set produced by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerTable {
    records: Vec<PassengerRecord>,
    source: PathBuf,
    rows_read: usize,
}

impl PassengerTable {
    /// Builds a table from already validated records.
    #[must_use]
    pub fn new(
        records: Vec<PassengerRecord>,
        source: impl Into<PathBuf>,
        rows_read: usize,
    ) -> Self {
        let rows_read = rows_read.max(records.len());
        Self {
            records,
            source: source.into(),
            rows_read,
        }
    }

    /// Records in file order.
    #[must_use]
    pub fn records(&self) -> &[PassengerRecord] {
        &self.records
    }

    /// Iterator over records.
    pub fn iter(&self) -> std::slice::Iter<'_, PassengerRecord> {
        self.records.iter()
    }

    /// Number of complete records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Where the records were read from.
    #[must_use]
    pub fn source(&self) -> &std::path::Path {
        &self.source
    }

    /// Data rows read from the file, including incomplete ones.
    #[must_use]
    pub const fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Rows dropped because a retained column was empty.
    #[must_use]
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.records.len()
    }

    /// Number of survivors.
    #[must_use]
    pub fn survivors(&self) -> usize {
        self.records.iter().filter(|record| record.survived).count()
    }

    /// Fraction of survivors, `0.0` on an empty table.
    #[must_use]
    pub fn survival_rate(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.survivors() as f64 / self.records.len() as f64
    }
}

impl<'a> IntoIterator for &'a PassengerTable {
    type Item = &'a PassengerRecord;
    type IntoIter = std::slice::Iter<'a, PassengerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
