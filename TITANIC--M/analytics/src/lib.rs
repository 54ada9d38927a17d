#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Titanic case dashboard analytics: passenger dataset loading, survival charts,
//! the route map, a seeded survival classifier and the lifeboat scenario.

/// Passenger records, CSV loading and the once-initialized dataset cache.
#[path = "../dataset/main.rs"]
pub mod dataset;

/// Bounded widget inputs (sliders and select lists).
#[path = "../controls.rs"]
pub mod controls;

/// Pure chart aggregations over the passenger table.
#[path = "../charts/main.rs"]
pub mod charts;

/// Survival classifier: encoder, decision trees and the random forest.
#[path = "../ML/main.rs"]
pub mod classical_ml;

/// Lifeboat what-if formula.
#[path = "../scenario.rs"]
pub mod scenario;

/// View catalogue and selection state.
#[path = "../views.rs"]
pub mod views;

/// SVG rendering for every view.
#[path = "../render/main.rs"]
pub mod render;

/// TOML configuration.
#[path = "../config.rs"]
pub mod config;

/// Telemetry helpers for structured logging.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// Application context and view dispatch.
#[path = "../main.rs"]
pub mod orchestration_entry;

pub use charts::{
    heatmap::{AgeBucket, AgeHeatmap},
    route::RouteMap,
    survival::SurvivalBreakdown,
};
pub use classical_ml::{
    forest::{ForestParams, RandomForest},
    predictor::{ModelReport, SurvivalEstimate, SurvivalModel},
    ModelError,
};
pub use config::DashboardConfig;
pub use controls::{AgeInput, InputError, LifeboatCount, PredictionInput};
pub use dataset::{
    cache::DatasetCache,
    loader::{load_passengers, DatasetError},
    record::{PassengerClass, PassengerRecord, PassengerTable, Sex},
};
pub use orchestration_entry::{Dashboard, RenderedView};
pub use scenario::ScenarioEstimate;
pub use telemetry::{DashboardTelemetry, DashboardTelemetryBuilder};
pub use views::{View, ViewRequest, ViewSelector};
