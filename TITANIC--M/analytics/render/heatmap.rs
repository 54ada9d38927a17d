use svg::node::element::Rectangle;

use super::{canvas, label};
use crate::charts::heatmap::AgeHeatmap;

const CELL_WIDTH: f64 = 180.0;
const CELL_HEIGHT: f64 = 56.0;
const LEFT: f64 = 140.0;
const TOP: f64 = 80.0;

const BLUES_LOW: (f64, f64, f64) = (247.0, 251.0, 255.0);
const BLUES_HIGH: (f64, f64, f64) = (8.0, 48.0, 107.0);

/// White-to-blue colour for a percentage in `[0, 100]`.
#[must_use]
pub fn blues(percent: f64) -> String {
    let t = (percent / 100.0).clamp(0.0, 1.0);
    let mix = |low: f64, high: f64| (low + (high - low) * t).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(BLUES_LOW.0, BLUES_HIGH.0),
        mix(BLUES_LOW.1, BLUES_HIGH.1),
        mix(BLUES_LOW.2, BLUES_HIGH.2)
    )
}

/// Crosstab grid: one row per age group, columns died/survived, with the
/// percentage printed in each cell.
#[must_use]
pub fn age_heatmap(heatmap: &AgeHeatmap) -> String {
    let rows = heatmap.rows.len();
    let width = LEFT + 2.0 * CELL_WIDTH + 140.0;
    let height = TOP + rows.max(1) as f64 * CELL_HEIGHT + 90.0;
    let mut doc = canvas(width, height, &heatmap.title);

    for (col, name) in ["0 (died)", "1 (survived)"].into_iter().enumerate() {
        doc = doc.add(
            label(name, LEFT + CELL_WIDTH * (col as f64 + 0.5), TOP - 10.0, 13)
                .set("text-anchor", "middle"),
        );
    }

    for (idx, row) in heatmap.rows.iter().enumerate() {
        let y = TOP + idx as f64 * CELL_HEIGHT;
        doc = doc.add(
            label(row.bucket.label(), LEFT - 12.0, y + CELL_HEIGHT / 2.0 + 5.0, 13)
                .set("text-anchor", "end"),
        );
        for (col, value) in [row.died_pct, row.survived_pct].into_iter().enumerate() {
            let x = LEFT + col as f64 * CELL_WIDTH;
            let text_color = if value > 50.0 { "#ffffff" } else { "#08306b" };
            doc = doc
                .add(
                    Rectangle::new()
                        .set("x", x)
                        .set("y", y)
                        .set("width", CELL_WIDTH)
                        .set("height", CELL_HEIGHT)
                        .set("fill", blues(value))
                        .set("stroke", "#ffffff")
                        .set("stroke-width", 2),
                )
                .add(
                    label(
                        format!("{value:.1}"),
                        x + CELL_WIDTH / 2.0,
                        y + CELL_HEIGHT / 2.0 + 5.0,
                        14,
                    )
                    .set("text-anchor", "middle")
                    .set("fill", text_color),
                );
        }
    }

    // colour bar
    let bar_x = LEFT + 2.0 * CELL_WIDTH + 40.0;
    let bar_height = rows.max(1) as f64 * CELL_HEIGHT;
    let steps: u32 = 20;
    for step in 0..steps {
        let percent = 100.0 - f64::from(step) * 100.0 / f64::from(steps);
        doc = doc.add(
            Rectangle::new()
                .set("x", bar_x)
                .set("y", TOP + bar_height * f64::from(step) / f64::from(steps))
                .set("width", 18)
                .set("height", bar_height / f64::from(steps) + 0.5)
                .set("fill", blues(percent)),
        );
    }
    doc = doc
        .add(label("100", bar_x + 24.0, TOP + 10.0, 11))
        .add(label("0", bar_x + 24.0, TOP + bar_height, 11))
        .add(
            label("Survived", LEFT + CELL_WIDTH, TOP + bar_height + 36.0, 13)
                .set("text-anchor", "middle"),
        );
    if heatmap.unbucketed > 0 {
        doc = doc.add(label(
            format!("{} passengers outside 0-100 years not shown", heatmap.unbucketed),
            LEFT,
            TOP + bar_height + 60.0,
            11,
        ));
    }
    doc.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::heatmap::{AgeBucket, HeatmapRow};

    #[test]
    fn scale_endpoints() {
        assert_eq!(blues(0.0), "#f7fbff");
        assert_eq!(blues(100.0), "#08306b");
        assert_eq!(blues(250.0), "#08306b");
    }

    #[test]
    fn cells_print_their_values() {
        let heatmap = AgeHeatmap {
            title: "Survival rate per age group".into(),
            rows: vec![
                HeatmapRow {
                    bucket: AgeBucket::Child,
                    passengers: 4,
                    died_pct: 42.0,
                    survived_pct: 58.0,
                },
                HeatmapRow {
                    bucket: AgeBucket::MiddleAged,
                    passengers: 3,
                    died_pct: 66.666_666,
                    survived_pct: 33.333_334,
                },
            ],
            unbucketed: 1,
        };
        let svg = age_heatmap(&heatmap);
        assert!(svg.contains("Survival rate per age group"));
        assert!(svg.contains("Middle-aged"));
        assert!(svg.contains("58.0"));
        assert!(svg.contains("66.7"));
        assert!(svg.contains("outside 0-100 years"));
    }
}
