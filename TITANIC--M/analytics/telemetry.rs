use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use serde_json::Value;
use shared_logging::{JsonLogger, LogLevel, LogRecord};
use uuid::Uuid;

/// Builder for dashboard telemetry.
#[derive(Debug, Clone)]
pub struct DashboardTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    min_level: LogLevel,
}

impl DashboardTelemetryBuilder {
    /// Creates the builder; without a log path the handle is a no-op.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            min_level: LogLevel::Info,
        }
    }

    /// Sets the log path.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Sets the log path when one is given.
    #[must_use]
    pub fn maybe_log_path(mut self, path: Option<PathBuf>) -> Self {
        self.log_path = path;
        self
    }

    /// Sets the minimum level written.
    #[must_use]
    pub const fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Builds the telemetry handle.
    pub fn build(self) -> Result<DashboardTelemetry> {
        let logger = match self.log_path {
            Some(path) => Some(
                JsonLogger::with_min_level(&path, self.min_level)
                    .with_context(|| format!("opening log file {}", path.display()))?,
            ),
            None => None,
        };
        Ok(DashboardTelemetry {
            inner: Arc::new(TelemetryInner {
                module: self.module,
                session_id: Uuid::new_v4(),
                logger,
            }),
        })
    }
}

/// Telemetry handle shared by the dashboard and its views.
#[derive(Clone)]
pub struct DashboardTelemetry {
    inner: Arc<TelemetryInner>,
}

struct TelemetryInner {
    module: String,
    session_id: Uuid,
    logger: Option<JsonLogger>,
}

impl fmt::Debug for DashboardTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardTelemetry")
            .field("module", &self.inner.module)
            .field("session_id", &self.inner.session_id)
            .field("enabled", &self.inner.logger.is_some())
            .finish()
    }
}

impl DashboardTelemetry {
    /// Returns a builder.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> DashboardTelemetryBuilder {
        DashboardTelemetryBuilder::new(module)
    }

    /// Handle that drops every record.
    #[must_use]
    pub fn disabled(module: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TelemetryInner {
                module: module.into(),
                session_id: Uuid::new_v4(),
                logger: None,
            }),
        }
    }

    /// Session identifier stamped on every record.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    /// Whether a log file is attached.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.logger.is_some()
    }

    /// Logs `message` with structured metadata and the session id.
    pub fn log(&self, level: LogLevel, message: &str, metadata: Value) -> Result<()> {
        if let Some(logger) = &self.inner.logger {
            let record = LogRecord::new(&self.inner.module, level, message)
                .with_metadata(metadata)
                .with_field("session_id", self.inner.session_id.to_string());
            logger.log(&record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn telemetry_writes_session_tagged_lines() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("logs").join("dashboard.log.jsonl");
        let telemetry = DashboardTelemetry::builder("dashboard")
            .log_path(&path)
            .min_level(LogLevel::Info)
            .build()
            .unwrap();
        telemetry
            .log(LogLevel::Info, "dashboard.view_rendered", json!({ "view": "heatmap" }))
            .unwrap();
        telemetry
            .log(LogLevel::Debug, "dashboard.debug", json!({}))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 1);
        let record: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record["message"], "dashboard.view_rendered");
        assert_eq!(record["metadata"]["view"], "heatmap");
        assert_eq!(
            record["metadata"]["session_id"],
            telemetry.session_id().to_string()
        );
    }

    #[test]
    fn disabled_handle_is_a_no_op() {
        let telemetry = DashboardTelemetry::disabled("dashboard");
        assert!(!telemetry.is_enabled());
        telemetry
            .log(LogLevel::Error, "ignored", json!({ "x": 1 }))
            .unwrap();
    }
}
