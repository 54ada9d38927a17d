//! The five presentation modes and the single current selection.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controls::{LifeboatCount, PredictionInput};

/// One presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    /// Voyage map with ports and the sinking point.
    #[default]
    RouteMap,
    /// Outcome counts by class and sex plus the age box plot.
    SurvivalAnalysis,
    /// Classifier estimate for one passenger description.
    SurvivalPrediction,
    /// Lifeboat what-if.
    ScenarioSimulation,
    /// Survival percentage per age group.
    AgeHeatmap,
}

impl View {
    /// Every view in menu order.
    pub const ALL: [Self; 5] = [
        Self::RouteMap,
        Self::SurvivalAnalysis,
        Self::SurvivalPrediction,
        Self::ScenarioSimulation,
        Self::AgeHeatmap,
    ];

    /// Stable identifier used for file names and the shell.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::RouteMap => "route-map",
            Self::SurvivalAnalysis => "survival",
            Self::SurvivalPrediction => "predict",
            Self::ScenarioSimulation => "scenario",
            Self::AgeHeatmap => "heatmap",
        }
    }

    /// Menu label.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::RouteMap => "Titanic Route Map",
            Self::SurvivalAnalysis => "Survival Analysis",
            Self::SurvivalPrediction => "Survival Prediction",
            Self::ScenarioSimulation => "Scenario Simulation",
            Self::AgeHeatmap => "Age Group Heatmap",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Unrecognized view name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown view {0:?}; expected one of route-map, survival, predict, scenario, heatmap")]
pub struct UnknownView(pub String);

impl FromStr for View {
    type Err = UnknownView;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|view| view.slug() == normalized)
            .ok_or_else(|| UnknownView(value.to_string()))
    }
}

/// One interaction: the chosen view plus its widget values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum ViewRequest {
    /// Static route map.
    RouteMap,
    /// Survival breakdown charts.
    SurvivalAnalysis,
    /// Prediction with the given widget values.
    SurvivalPrediction(PredictionInput),
    /// Scenario with the given slider value.
    ScenarioSimulation {
        /// Slider value.
        lifeboats: LifeboatCount,
    },
    /// Age-group heatmap.
    AgeHeatmap,
}

impl ViewRequest {
    /// View this request renders.
    #[must_use]
    pub const fn view(&self) -> View {
        match self {
            Self::RouteMap => View::RouteMap,
            Self::SurvivalAnalysis => View::SurvivalAnalysis,
            Self::SurvivalPrediction(_) => View::SurvivalPrediction,
            Self::ScenarioSimulation { .. } => View::ScenarioSimulation,
            Self::AgeHeatmap => View::AgeHeatmap,
        }
    }

    /// Request with every widget at its start position.
    #[must_use]
    pub fn default_for(view: View) -> Self {
        match view {
            View::RouteMap => Self::RouteMap,
            View::SurvivalAnalysis => Self::SurvivalAnalysis,
            View::SurvivalPrediction => Self::SurvivalPrediction(PredictionInput::default()),
            View::ScenarioSimulation => Self::ScenarioSimulation {
                lifeboats: LifeboatCount::default(),
            },
            View::AgeHeatmap => Self::AgeHeatmap,
        }
    }
}

impl From<View> for ViewRequest {
    fn from(view: View) -> Self {
        Self::default_for(view)
    }
}

/// Mutually exclusive choice among the views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewSelector {
    current: View,
}

impl ViewSelector {
    /// Selector on the default view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches the selection and returns the previous one.
    pub fn select(&mut self, view: View) -> View {
        std::mem::replace(&mut self.current, view)
    }

    /// Current selection.
    #[must_use]
    pub const fn current(&self) -> View {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip_through_from_str() {
        for view in View::ALL {
            assert_eq!(view.slug().parse::<View>().unwrap(), view);
        }
        assert_eq!("Route_Map".parse::<View>().unwrap(), View::RouteMap);
        let err = "globe".parse::<View>().unwrap_err();
        assert!(err.to_string().contains("unknown view \"globe\""));
    }

    #[test]
    fn selector_starts_on_route_map() {
        let mut selector = ViewSelector::new();
        assert_eq!(selector.current(), View::RouteMap);
        assert_eq!(selector.select(View::AgeHeatmap), View::RouteMap);
        assert_eq!(selector.current(), View::AgeHeatmap);
    }

    #[test]
    fn default_requests_use_widget_start_positions() {
        for view in View::ALL {
            assert_eq!(ViewRequest::default_for(view).view(), view);
        }
        match ViewRequest::from(View::ScenarioSimulation) {
            ViewRequest::ScenarioSimulation { lifeboats } => assert_eq!(lifeboats.boats(), 35),
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn requests_serialize_with_a_view_tag() {
        let request = ViewRequest::ScenarioSimulation {
            lifeboats: LifeboatCount::new(40).unwrap(),
        };
        let json = serde_json::to_value(request).unwrap();
        assert_eq!(json["view"], "scenario-simulation");
        assert_eq!(json["lifeboats"], 40);
    }
}
