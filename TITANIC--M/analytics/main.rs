use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::{json, Value};
use shared_logging::LogLevel;

use crate::{
    charts::{heatmap::age_group_heatmap, route::RouteMap, survival::survival_breakdown},
    classical_ml::predictor::SurvivalModel,
    config::DashboardConfig,
    controls::{LifeboatCount, PredictionInput},
    dataset::{cache::DatasetCache, record::PassengerTable},
    render,
    scenario::ScenarioEstimate,
    telemetry::DashboardTelemetry,
    views::{View, ViewRequest},
};

/// Output of one interaction.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedView {
    /// View that produced the output.
    pub view: View,
    /// Heading.
    pub title: String,
    /// Terminal summary.
    pub summary: String,
    /// Standalone SVG document.
    pub svg: String,
    /// Chart data behind the SVG.
    pub spec: Value,
    /// GeoJSON export, route map only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geojson: Option<Value>,
    /// Render time.
    pub rendered_at: DateTime<Utc>,
}

impl RenderedView {
    /// Writes `<slug>.svg`, `<slug>.json` and, when present,
    /// `<slug>.geojson` into `dir`, returning the written paths.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        let slug = self.view.slug();
        let mut written = Vec::new();

        let svg_path = dir.join(format!("{slug}.svg"));
        fs::write(&svg_path, &self.svg)
            .with_context(|| format!("writing {}", svg_path.display()))?;
        written.push(svg_path);

        let spec_path = dir.join(format!("{slug}.json"));
        let document = json!({
            "view": self.view,
            "title": self.title,
            "rendered_at": self.rendered_at,
            "spec": self.spec,
        });
        fs::write(&spec_path, serde_json::to_string_pretty(&document)?)
            .with_context(|| format!("writing {}", spec_path.display()))?;
        written.push(spec_path);

        if let Some(geojson) = &self.geojson {
            let geojson_path = dir.join(format!("{slug}.geojson"));
            fs::write(&geojson_path, serde_json::to_string_pretty(geojson)?)
                .with_context(|| format!("writing {}", geojson_path.display()))?;
            written.push(geojson_path);
        }
        Ok(written)
    }
}

/// Session context: configuration, the cached dataset and the lazily trained
/// model. Views borrow it for every render.
#[derive(Debug)]
pub struct Dashboard {
    config: DashboardConfig,
    cache: DatasetCache,
    model: OnceCell<SurvivalModel>,
    telemetry: DashboardTelemetry,
}

impl Dashboard {
    /// Opens the log file and loads the dataset; a missing or malformed
    /// dataset fails here.
    pub fn open(config: DashboardConfig) -> Result<Self> {
        let telemetry = DashboardTelemetry::builder("dashboard")
            .maybe_log_path(config.logging.path.clone())
            .min_level(config.logging.level)
            .build()?;
        let cache = DatasetCache::new(&config.dataset.path);
        let dashboard = Self {
            config,
            cache,
            model: OnceCell::new(),
            telemetry,
        };
        dashboard.passengers()?;
        Ok(dashboard)
    }

    /// Context over an already loaded table.
    #[must_use]
    pub fn with_table(
        config: DashboardConfig,
        table: PassengerTable,
        telemetry: DashboardTelemetry,
    ) -> Self {
        Self {
            config,
            cache: DatasetCache::preloaded(table),
            model: OnceCell::new(),
            telemetry,
        }
    }

    /// Cached passenger table.
    pub fn passengers(&self) -> Result<Arc<PassengerTable>> {
        let first_load = !self.cache.is_loaded();
        match self.cache.get() {
            Ok(table) => {
                if first_load {
                    self.log(
                        LogLevel::Info,
                        "dashboard.dataset_loaded",
                        json!({
                            "path": table.source().display().to_string(),
                            "rows_read": table.rows_read(),
                            "rows_kept": table.len(),
                            "rows_dropped": table.rows_dropped(),
                            "survival_rate": table.survival_rate(),
                        }),
                    );
                }
                Ok(table)
            }
            Err(err) => {
                self.log(
                    LogLevel::Error,
                    "dashboard.dataset_failed",
                    json!({
                        "path": self.cache.path().display().to_string(),
                        "error": err.to_string(),
                    }),
                );
                Err(err).context("loading passenger dataset")
            }
        }
    }

    /// Survival model, trained on first use and reused afterwards.
    pub fn model(&self) -> Result<&SurvivalModel> {
        self.model.get_or_try_init(|| {
            let table = self.passengers()?;
            let started = Instant::now();
            match SurvivalModel::train(&table, self.config.forest_params()) {
                Ok(model) => {
                    let report = model.report();
                    self.log(
                        LogLevel::Info,
                        "dashboard.model_trained",
                        json!({
                            "trees": report.trees,
                            "samples": report.samples,
                            "seed": report.seed,
                            "training_accuracy": report.training_accuracy,
                            "mean_depth": report.mean_depth,
                            "elapsed_ms": started.elapsed().as_secs_f64() * 1000.0,
                        }),
                    );
                    Ok(model)
                }
                Err(err) => {
                    self.log(
                        LogLevel::Error,
                        "dashboard.model_failed",
                        json!({ "error": err.to_string() }),
                    );
                    Err(err).context("training survival model")
                }
            }
        })
    }

    /// Whether the model has been trained in this session.
    #[must_use]
    pub fn model_trained(&self) -> bool {
        self.model.get().is_some()
    }

    /// Renders exactly one view for `request`.
    pub fn render(&self, request: &ViewRequest) -> Result<RenderedView> {
        let started = Instant::now();
        let view = request.view();
        let result = match *request {
            ViewRequest::RouteMap => Ok(Self::render_route_map()),
            ViewRequest::SurvivalAnalysis => self.render_survival(),
            ViewRequest::SurvivalPrediction(input) => self.render_prediction(input),
            ViewRequest::ScenarioSimulation { lifeboats } => Ok(Self::render_scenario(lifeboats)),
            ViewRequest::AgeHeatmap => self.render_heatmap(),
        };
        let parts = match result {
            Ok(parts) => parts,
            Err(err) => {
                self.log(
                    LogLevel::Error,
                    "dashboard.view_failed",
                    json!({ "view": view.slug(), "error": format!("{err:#}") }),
                );
                return Err(err.context(format!("rendering {}", view.title())));
            }
        };
        self.log(
            LogLevel::Info,
            "dashboard.view_rendered",
            json!({
                "view": view.slug(),
                "request": request,
                "elapsed_ms": started.elapsed().as_secs_f64() * 1000.0,
            }),
        );
        Ok(RenderedView {
            view,
            title: view.title().to_string(),
            summary: parts.summary,
            svg: parts.svg,
            spec: parts.spec,
            geojson: parts.geojson,
            rendered_at: Utc::now(),
        })
    }

    fn render_route_map() -> ViewParts {
        let map = RouteMap::titanic();
        ViewParts {
            summary: map.summary(),
            svg: render::map::route_map(&map),
            spec: json!({
                "center": map.center,
                "zoom": map.zoom,
                "tiles": map.tiles,
                "markers": map.markers,
                "path": map.path,
            }),
            geojson: Some(map.to_geojson()),
        }
    }

    fn render_survival(&self) -> Result<ViewParts> {
        let table = self.passengers()?;
        let breakdown = survival_breakdown(&table);
        Ok(ViewParts {
            summary: breakdown.summary(),
            svg: render::bars::survival_breakdown(&breakdown),
            spec: serde_json::to_value(&breakdown)?,
            geojson: None,
        })
    }

    fn render_prediction(&self, input: PredictionInput) -> Result<ViewParts> {
        let model = self.model()?;
        let estimate = model.predict(input)?;
        let report = model.report();
        Ok(ViewParts {
            summary: format!(
                "age={} sex={} class={} -> survival probability {}\n{}",
                input.age,
                input.sex,
                input.class,
                estimate.display(),
                report.summary()
            ),
            svg: render::metric::prediction_card(&estimate, report),
            spec: json!({
                "input": input,
                "probability": estimate.probability,
                "percent": estimate.rounded_percent(),
                "model": report,
            }),
            geojson: None,
        })
    }

    fn render_scenario(lifeboats: LifeboatCount) -> ViewParts {
        let estimate = ScenarioEstimate::estimate(lifeboats);
        ViewParts {
            summary: estimate.summary(),
            svg: render::metric::scenario_gauge(&estimate),
            spec: json!({
                "lifeboats": estimate.lifeboats,
                "percent": estimate.percent,
                "progress": estimate.progress(),
            }),
            geojson: None,
        }
    }

    fn render_heatmap(&self) -> Result<ViewParts> {
        let table = self.passengers()?;
        let heatmap = age_group_heatmap(&table);
        Ok(ViewParts {
            summary: heatmap.summary(),
            svg: render::heatmap::age_heatmap(&heatmap),
            spec: serde_json::to_value(&heatmap)?,
            geojson: None,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    fn log(&self, level: LogLevel, message: &str, metadata: serde_json::Value) {
        if let Err(err) = self.telemetry.log(level, message, metadata) {
            eprintln!("dashboard telemetry write failed: {err:#}");
        }
    }

    /// Telemetry handle.
    #[must_use]
    pub const fn telemetry(&self) -> &DashboardTelemetry {
        &self.telemetry
    }
}

struct ViewParts {
    summary: String,
    svg: String,
    spec: Value,
    geojson: Option<Value>,
}
