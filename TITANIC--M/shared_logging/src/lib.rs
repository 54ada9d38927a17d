#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Structured JSON-lines logging shared by the dashboard crates.

use std::{
    fmt,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Log severity level, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Debug information.
    Debug,
    /// Informational events.
    #[default]
    Info,
    /// Warning indicator.
    Warn,
    /// Error indicator.
    Error,
}

impl LogLevel {
    /// Lower-case name used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => bail!("unknown log level {other:?} (expected debug, info, warn or error)"),
        }
    }
}

/// Structured log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Timestamp in ISO8601.
    pub timestamp: DateTime<Utc>,
    /// Module emitting the log.
    pub module: String,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
    /// Arbitrary JSON payload for metrics/fields.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl LogRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(module: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            module: module.into(),
            level,
            message: message.into(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Attaches a single metadata field.
    #[must_use]
    pub fn with_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Merges the fields of a JSON object into the metadata. Non-object values
    /// are stored under `data`.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        match metadata {
            serde_json::Value::Object(map) => self.metadata.extend(map),
            serde_json::Value::Null => {}
            other => {
                self.metadata.insert("data".into(), other);
            }
        }
        self
    }
}

/// Append-only JSON-lines logger with a minimum severity filter.
#[derive(Debug)]
pub struct JsonLogger {
    path: PathBuf,
    min_level: LogLevel,
    writer: Mutex<File>,
}

impl JsonLogger {
    /// Creates or opens a logger at the desired path, accepting every level.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_min_level(path, LogLevel::Debug)
    }

    /// Creates or opens a logger that drops records below `min_level`.
    pub fn with_min_level(path: impl AsRef<Path>, min_level: LogLevel) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path,
            min_level,
            writer: Mutex::new(file),
        })
    }

    /// Whether records of `level` pass the filter.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Writes a log record as one JSON line. Filtered records are skipped.
    pub fn log(&self, record: &LogRecord) -> Result<()> {
        if !self.enabled(record.level) {
            return Ok(());
        }
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Minimum level accepted by this logger.
    #[must_use]
    pub const fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Returns the underlying file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_json_lines() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::new(dir.path().join("nested/test.log")).unwrap();
        logger
            .log(&LogRecord::new("dataset", LogLevel::Info, "loaded").with_field("rows", 714))
            .unwrap();
        let content = fs::read_to_string(logger.path()).unwrap();
        assert!(content.contains("\"message\":\"loaded\""));
        assert!(content.contains("\"rows\":714"));
        assert!(content.contains("\"level\":\"INFO\""));
    }

    #[test]
    fn drops_records_below_min_level() {
        let dir = tempdir().unwrap();
        let logger =
            JsonLogger::with_min_level(dir.path().join("warn.log"), LogLevel::Warn).unwrap();
        logger
            .log(&LogRecord::new("views", LogLevel::Debug, "noise"))
            .unwrap();
        logger
            .log(&LogRecord::new("views", LogLevel::Error, "model failed"))
            .unwrap();
        let content = fs::read_to_string(logger.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("model failed"));
    }

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!(" warning ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("verbose".parse::<LogLevel>().is_err());
        assert!(LogLevel::Error > LogLevel::Debug);
    }

    #[test]
    fn non_object_metadata_lands_under_data() {
        let record = LogRecord::new("m", LogLevel::Info, "x").with_metadata(serde_json::json!(3));
        assert_eq!(record.metadata["data"], 3);
    }
}
