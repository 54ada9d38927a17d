use svg::{
    node::element::{Line, Rectangle},
    Document,
};

use super::{canvas, label, nice_step, Frame, DIED_COLOR, SURVIVED_COLOR};
use crate::charts::{stats::BoxStats, survival::SurvivalBreakdown, OutcomeCounts};

const PANEL_WIDTH: f64 = 380.0;
const PANEL_HEIGHT: f64 = 360.0;
const MARGIN: f64 = 60.0;

/// Survival analysis view: class bars, sex bars and the age box plot side by
/// side.
#[must_use]
pub fn survival_breakdown(breakdown: &SurvivalBreakdown) -> String {
    let width = 3.0 * PANEL_WIDTH + 40.0;
    let height = PANEL_HEIGHT + 140.0;
    let mut doc = canvas(width, height, "Survival Analysis");
    doc = legend(doc, width - 220.0, 56.0);

    let top = 90.0;
    let panels = [
        Frame::new(20.0, top, PANEL_WIDTH, PANEL_HEIGHT),
        Frame::new(20.0 + PANEL_WIDTH, top, PANEL_WIDTH, PANEL_HEIGHT),
        Frame::new(20.0 + 2.0 * PANEL_WIDTH, top, PANEL_WIDTH, PANEL_HEIGHT),
    ];
    doc = stacked_bars(doc, &breakdown.by_class, panels[0]);
    doc = stacked_bars(doc, &breakdown.by_sex, panels[1]);
    doc = box_plot(
        doc,
        &[
            ("died", DIED_COLOR, breakdown.age.died.as_ref()),
            ("survived", SURVIVED_COLOR, breakdown.age.survived.as_ref()),
        ],
        panels[2],
    );
    doc.to_string()
}

fn legend(mut doc: Document, x: f64, y: f64) -> Document {
    for (idx, (name, color)) in [("Died (0)", DIED_COLOR), ("Survived (1)", SURVIVED_COLOR)]
        .into_iter()
        .enumerate()
    {
        let offset = x + idx as f64 * 110.0;
        doc = doc
            .add(
                Rectangle::new()
                    .set("x", offset)
                    .set("y", y - 11.0)
                    .set("width", 14)
                    .set("height", 14)
                    .set("fill", color),
            )
            .add(label(name, offset + 20.0, y, 13));
    }
    doc
}

/// Plot area of a panel and the value-to-y mapping for `[0, max]`.
struct Axis {
    plot: Frame,
    max: f64,
}

impl Axis {
    fn y(&self, value: f64) -> f64 {
        if self.max <= 0.0 {
            return self.plot.bottom();
        }
        self.plot.bottom() - value / self.max * self.plot.height
    }
}

fn y_axis(mut doc: Document, axis: &Axis, min: f64, step: f64) -> Document {
    let plot = axis.plot;
    let mut tick = min;
    while tick <= axis.max + 1e-9 {
        let y = axis.y(tick);
        doc = doc
            .add(
                Line::new()
                    .set("x1", plot.x)
                    .set("y1", y)
                    .set("x2", plot.right())
                    .set("y2", y)
                    .set("stroke", "#e5e7eb")
                    .set("stroke-width", 1),
            )
            .add(label(format!("{tick}"), plot.x - 6.0, y + 4.0, 11).set("text-anchor", "end"));
        tick += step;
    }
    doc.add(
        Line::new()
            .set("x1", plot.x)
            .set("y1", plot.bottom())
            .set("x2", plot.right())
            .set("y2", plot.bottom())
            .set("stroke", "#333333")
            .set("stroke-width", 1),
    )
}

/// Stacked died/survived bars, one per category.
pub(crate) fn stacked_bars(mut doc: Document, counts: &OutcomeCounts, frame: Frame) -> Document {
    let plot = Frame::new(
        frame.x + MARGIN,
        frame.y + 30.0,
        frame.width - MARGIN - 20.0,
        frame.height - 80.0,
    );
    let step = nice_step(counts.max_total() as f64, 5);
    let max = (counts.max_total() as f64 / step).ceil().max(1.0) * step;
    let axis = Axis { plot, max };

    doc = doc.add(
        label(counts.title.clone(), frame.x + frame.width / 2.0, frame.y + 12.0, 15)
            .set("text-anchor", "middle"),
    );
    doc = y_axis(doc, &axis, 0.0, step);

    let n = counts.categories.len().max(1);
    let slot = plot.width / n as f64;
    let bar_width = slot * 0.6;
    for (idx, category) in counts.categories.iter().enumerate() {
        let x = plot.x + slot * idx as f64 + (slot - bar_width) / 2.0;
        let died = counts.died.get(idx).copied().unwrap_or(0) as f64;
        let survived = counts.survived.get(idx).copied().unwrap_or(0) as f64;
        for (lower, upper, color) in [
            (0.0, died, DIED_COLOR),
            (died, died + survived, SURVIVED_COLOR),
        ] {
            if upper <= lower {
                continue;
            }
            doc = doc.add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", axis.y(upper))
                    .set("width", bar_width)
                    .set("height", axis.y(lower) - axis.y(upper))
                    .set("fill", color),
            );
        }
        doc = doc.add(
            label(category.clone(), x + bar_width / 2.0, plot.bottom() + 18.0, 12)
                .set("text-anchor", "middle"),
        );
    }
    doc.add(
        label(counts.axis.clone(), plot.x + plot.width / 2.0, plot.bottom() + 40.0, 13)
            .set("text-anchor", "middle"),
    )
    .add(
        label("count", frame.x + 14.0, plot.y + plot.height / 2.0, 13)
            .set("text-anchor", "middle")
            .set(
                "transform",
                format!("rotate(-90 {} {})", frame.x + 14.0, plot.y + plot.height / 2.0),
            ),
    )
}

/// Vertical box plots sharing one age axis.
pub(crate) fn box_plot(
    mut doc: Document,
    groups: &[(&str, &str, Option<&BoxStats>)],
    frame: Frame,
) -> Document {
    let plot = Frame::new(
        frame.x + MARGIN,
        frame.y + 30.0,
        frame.width - MARGIN - 20.0,
        frame.height - 80.0,
    );
    let observed_max = groups
        .iter()
        .filter_map(|(_, _, stats)| stats.map(BoxStats::max))
        .fold(0.0, f64::max);
    let step = nice_step(observed_max, 5);
    let max = (observed_max / step).ceil().max(1.0) * step;
    let axis = Axis { plot, max };

    doc = doc.add(
        label("Age distribution by outcome", frame.x + frame.width / 2.0, frame.y + 12.0, 15)
            .set("text-anchor", "middle"),
    );
    doc = y_axis(doc, &axis, 0.0, step);

    let slot = plot.width / groups.len().max(1) as f64;
    let box_width = slot * 0.45;
    for (idx, (name, color, stats)) in groups.iter().enumerate() {
        let center = plot.x + slot * (idx as f64 + 0.5);
        doc = doc.add(
            label(*name, center, plot.bottom() + 18.0, 12).set("text-anchor", "middle"),
        );
        let Some(stats) = stats else {
            continue;
        };
        let left = center - box_width / 2.0;
        doc = doc
            .add(
                Line::new()
                    .set("x1", center)
                    .set("y1", axis.y(stats.lower_whisker))
                    .set("x2", center)
                    .set("y2", axis.y(stats.upper_whisker))
                    .set("stroke", *color)
                    .set("stroke-width", 1.5),
            )
            .add(
                Rectangle::new()
                    .set("x", left)
                    .set("y", axis.y(stats.q3))
                    .set("width", box_width)
                    .set("height", axis.y(stats.q1) - axis.y(stats.q3))
                    .set("fill", *color)
                    .set("fill-opacity", 0.35)
                    .set("stroke", *color)
                    .set("stroke-width", 1.5),
            )
            .add(
                Line::new()
                    .set("x1", left)
                    .set("y1", axis.y(stats.median))
                    .set("x2", left + box_width)
                    .set("y2", axis.y(stats.median))
                    .set("stroke", *color)
                    .set("stroke-width", 2.5),
            );
        for whisker in [stats.lower_whisker, stats.upper_whisker] {
            doc = doc.add(
                Line::new()
                    .set("x1", center - box_width / 4.0)
                    .set("y1", axis.y(whisker))
                    .set("x2", center + box_width / 4.0)
                    .set("y2", axis.y(whisker))
                    .set("stroke", *color)
                    .set("stroke-width", 1.5),
            );
        }
        for outlier in &stats.outliers {
            doc = doc.add(
                svg::node::element::Circle::new()
                    .set("cx", center)
                    .set("cy", axis.y(*outlier))
                    .set("r", 2.5)
                    .set("fill", "none")
                    .set("stroke", *color),
            );
        }
    }
    doc.add(
        label("Survived", plot.x + plot.width / 2.0, plot.bottom() + 40.0, 13)
            .set("text-anchor", "middle"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::survival::AgeByOutcome;

    fn breakdown() -> SurvivalBreakdown {
        SurvivalBreakdown {
            by_class: OutcomeCounts {
                title: "Survival by travel class".into(),
                axis: "Pclass".into(),
                categories: vec!["1".into(), "2".into(), "3".into()],
                died: vec![80, 97, 372],
                survived: vec![136, 87, 119],
            },
            by_sex: OutcomeCounts {
                title: "Survival by sex".into(),
                axis: "Sex".into(),
                categories: vec!["male".into(), "female".into()],
                died: vec![468, 81],
                survived: vec![109, 233],
            },
            age: AgeByOutcome {
                died: BoxStats::from_values([2.0, 20.0, 25.0, 30.0, 40.0, 74.0]),
                survived: None,
            },
        }
    }

    #[test]
    fn breakdown_document_has_every_panel() {
        let svg = survival_breakdown(&breakdown());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Survival by travel class"));
        assert!(svg.contains("Survival by sex"));
        assert!(svg.contains("Age distribution by outcome"));
        assert!(svg.contains(DIED_COLOR));
        assert!(svg.contains(SURVIVED_COLOR));
        assert!(svg.contains("female"));
    }

    #[test]
    fn bar_heights_follow_counts() {
        let counts = OutcomeCounts {
            title: "t".into(),
            axis: "a".into(),
            categories: vec!["x".into()],
            died: vec![10],
            survived: vec![0],
        };
        let svg = stacked_bars(Document::new(), &counts, Frame::new(0.0, 0.0, 380.0, 360.0))
            .to_string();
        // survivors bar is skipped when empty
        assert!(svg.contains(DIED_COLOR));
        assert!(!svg.contains(SURVIVED_COLOR));
    }
}
