use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shared_logging::LogLevel;

use crate::classical_ml::forest::{ForestParams, MaxFeatures};

/// Dashboard settings loaded from TOML. Every section is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Passenger dataset location.
    pub dataset: DatasetSettings,
    /// Classifier hyper-parameters.
    pub model: ModelSettings,
    /// Where rendered views are written.
    pub output: OutputSettings,
    /// JSON-lines log settings.
    pub logging: LoggingSettings,
    source_dir: PathBuf,
}

/// `[dataset]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetSettings {
    /// CSV path, relative paths resolve against the config file.
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

/// `[model]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ModelSettings {
    /// Number of trees.
    #[serde(default = "default_trees")]
    pub trees: usize,
    /// Seed for bootstrap and feature sampling.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Depth limit, unlimited when absent.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Minimum samples to split a node.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    /// Minimum samples per leaf.
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    /// Bootstrap sampling per tree.
    #[serde(default = "default_true")]
    pub bootstrap: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            trees: default_trees(),
            seed: default_seed(),
            max_depth: None,
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            bootstrap: true,
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputSettings {
    /// Directory receiving `<view>.svg` and `<view>.json`.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoggingSettings {
    /// Log file; logging is disabled when absent.
    pub path: Option<PathBuf>,
    /// Minimum level written.
    pub level: LogLevel,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LoggingSettingsSerde {
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default = "default_level")]
    level: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DashboardConfigSerde {
    #[serde(default)]
    dataset: DatasetSettings,
    #[serde(default)]
    model: ModelSettings,
    #[serde(default)]
    output: OutputSettings,
    #[serde(default)]
    logging: Option<LoggingSettingsSerde>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetSettings::default(),
            model: ModelSettings::default(),
            output: OutputSettings::default(),
            logging: LoggingSettings::default(),
            source_dir: PathBuf::from("."),
        }
    }
}

impl DashboardConfig {
    /// Loads and validates a TOML file; relative paths inside it resolve
    /// against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading dashboard config {}", path.display()))?;
        let source_dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self::parse(&raw, source_dir).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parses TOML text with `source_dir` as the base for relative paths.
    pub fn parse(raw: &str, source_dir: impl Into<PathBuf>) -> Result<Self> {
        let document: DashboardConfigSerde = toml::from_str(raw)?;
        let logging = document.logging.unwrap_or_else(|| LoggingSettingsSerde {
            path: None,
            level: default_level(),
        });
        let level: LogLevel = logging
            .level
            .parse()
            .with_context(|| format!("invalid [logging] level {:?}", logging.level))?;

        let mut config = Self {
            dataset: document.dataset,
            model: document.model,
            output: document.output,
            logging: LoggingSettings {
                path: logging.path,
                level,
            },
            source_dir: source_dir.into(),
        };
        config.validate()?;
        config.dataset.path = config.resolve_path(&config.dataset.path);
        config.output.dir = config.resolve_path(&config.output.dir);
        if let Some(log_path) = config.logging.path.take() {
            config.logging.path = Some(config.resolve_path(log_path));
        }
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let model = &self.model;
        if model.trees == 0 {
            bail!("[model] trees must be at least 1");
        }
        if model.min_samples_split < 2 {
            bail!("[model] min_samples_split must be at least 2");
        }
        if model.min_samples_leaf == 0 {
            bail!("[model] min_samples_leaf must be at least 1");
        }
        if model.max_depth == Some(0) {
            bail!("[model] max_depth must be at least 1 when set");
        }
        if self.dataset.path.as_os_str().is_empty() {
            bail!("[dataset] path must not be empty");
        }
        Ok(())
    }

    /// Resolves a path relative to the configuration file.
    #[must_use]
    pub fn resolve_path(&self, candidate: impl AsRef<Path>) -> PathBuf {
        let candidate = candidate.as_ref();
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.source_dir.join(candidate)
        }
    }

    /// Directory the configuration was read from.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Forest parameters; split features stay at `sqrt(n_features)`.
    #[must_use]
    pub const fn forest_params(&self) -> ForestParams {
        ForestParams {
            trees: self.model.trees,
            max_depth: self.model.max_depth,
            min_samples_split: self.model.min_samples_split,
            min_samples_leaf: self.model.min_samples_leaf,
            max_features: MaxFeatures::Sqrt,
            bootstrap: self.model.bootstrap,
            seed: self.model.seed,
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("train.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dashboard-output")
}

fn default_level() -> String {
    "info".into()
}

const fn default_trees() -> usize {
    100
}

const fn default_seed() -> u64 {
    42
}

const fn default_min_samples_split() -> usize {
    2
}

const fn default_min_samples_leaf() -> usize {
    1
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_document_uses_defaults() {
        let config = DashboardConfig::parse("", "/srv/titanic").unwrap();
        assert_eq!(config.dataset.path, PathBuf::from("/srv/titanic/train.csv"));
        assert_eq!(config.output.dir, PathBuf::from("/srv/titanic/dashboard-output"));
        assert_eq!(config.model, ModelSettings::default());
        assert_eq!(config.logging.path, None);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.forest_params(), ForestParams::default());
    }

    #[test]
    fn loads_and_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("dashboard.toml");
        fs::write(
            &config_path,
            r#"
[dataset]
path = "data/train.csv"

[model]
trees = 25
seed = 7
max_depth = 6

[output]
dir = "/tmp/titanic-out"

[logging]
path = "logs/dashboard.log.jsonl"
level = "WARN"
"#,
        )
        .unwrap();
        let config = DashboardConfig::load(&config_path).unwrap();
        assert_eq!(config.dataset.path, dir.path().join("data/train.csv"));
        assert_eq!(config.output.dir, PathBuf::from("/tmp/titanic-out"));
        assert_eq!(
            config.logging.path,
            Some(dir.path().join("logs/dashboard.log.jsonl"))
        );
        assert_eq!(config.logging.level, LogLevel::Warn);
        let params = config.forest_params();
        assert_eq!(params.trees, 25);
        assert_eq!(params.seed, 7);
        assert_eq!(params.max_depth, Some(6));
        assert!(params.bootstrap);
    }

    #[test]
    fn rejects_out_of_domain_values() {
        for raw in [
            "[model]\ntrees = 0",
            "[model]\nmin_samples_split = 1",
            "[model]\nmin_samples_leaf = 0",
            "[model]\nmax_depth = 0",
            "[logging]\nlevel = \"verbose\"",
            "[unknown]\nkey = 1",
        ] {
            assert!(DashboardConfig::parse(raw, ".").is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = DashboardConfig::load(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("absent.toml"));
    }
}
