use svg::node::element::Rectangle;

use super::{canvas, label, SURVIVED_COLOR};
use crate::{
    classical_ml::predictor::{ModelReport, SurvivalEstimate},
    scenario::ScenarioEstimate,
};

const WIDTH: f64 = 720.0;
const BAR_LEFT: f64 = 60.0;
const BAR_WIDTH: f64 = 600.0;
const BAR_HEIGHT: f64 = 28.0;

fn progress_bar(doc: svg::Document, y: f64, fill_percent: f64, color: &str) -> svg::Document {
    let filled = BAR_WIDTH * fill_percent.clamp(0.0, 100.0) / 100.0;
    doc.add(
        Rectangle::new()
            .set("x", BAR_LEFT)
            .set("y", y)
            .set("width", BAR_WIDTH)
            .set("height", BAR_HEIGHT)
            .set("rx", 6)
            .set("fill", "#e9ecef"),
    )
    .add(
        Rectangle::new()
            .set("x", BAR_LEFT)
            .set("y", y)
            .set("width", filled)
            .set("height", BAR_HEIGHT)
            .set("rx", 6)
            .set("fill", color),
    )
}

/// Prediction view: inputs, the probability metric and the model report.
#[must_use]
pub fn prediction_card(estimate: &SurvivalEstimate, report: &ModelReport) -> String {
    let input = estimate.input;
    let mut doc = canvas(WIDTH, 320.0, "Survival Prediction")
        .add(label(
            format!(
                "Age {} | Sex {} | Class {}",
                input.age, input.sex, input.class
            ),
            BAR_LEFT,
            80.0,
            15,
        ))
        .add(label("Survival probability", BAR_LEFT, 130.0, 14).set("fill", "#555555"))
        .add(label(estimate.display(), BAR_LEFT, 180.0, 44).set("font-weight", "bold"));
    doc = progress_bar(doc, 205.0, estimate.percent(), SURVIVED_COLOR);
    doc.add(
        label(
            format!(
                "{} trees (mean depth {:.1}), {} training passengers, training accuracy {:.1}%",
                report.trees,
                report.mean_depth,
                report.samples,
                report.training_accuracy * 100.0
            ),
            BAR_LEFT,
            270.0,
            12,
        )
        .set("fill", "#777777"),
    )
    .add(
        label(
            report
                .feature_importances
                .iter()
                .map(|(name, value)| format!("{name} {:.0}%", value * 100.0))
                .collect::<Vec<_>>()
                .join(" | "),
            BAR_LEFT,
            292.0,
            12,
        )
        .set("fill", "#777777"),
    )
    .to_string()
}

/// Scenario view: slider value, estimate and a progress bar filled to the
/// truncated percentage.
#[must_use]
pub fn scenario_gauge(estimate: &ScenarioEstimate) -> String {
    let mut doc = canvas(WIDTH, 260.0, "Scenario Simulation")
        .add(label(
            format!("Number of lifeboats: {}", estimate.lifeboats),
            BAR_LEFT,
            80.0,
            15,
        ))
        .add(label("Estimated survival rate", BAR_LEFT, 130.0, 14).set("fill", "#555555"))
        .add(label(estimate.display(), BAR_LEFT, 175.0, 40).set("font-weight", "bold"));
    doc = progress_bar(doc, 200.0, f64::from(estimate.progress()), "#1f77b4");
    doc.add(
        label(format!("{}/100", estimate.progress()), BAR_LEFT + BAR_WIDTH, 250.0, 12)
            .set("text-anchor", "end")
            .set("fill", "#777777"),
    )
    .to_string()
}
