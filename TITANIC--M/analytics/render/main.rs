//! SVG documents for every view, built with the `svg` crate.

/// Stacked outcome bars and the age box plot.
pub mod bars;
/// Age-group heatmap grid.
pub mod heatmap;
/// Equirectangular route map.
pub mod map;
/// Prediction card and scenario progress bar.
pub mod metric;

use svg::{
    node::element::{Rectangle, Text},
    Document,
};

/// Colour for non-survivors.
pub const DIED_COLOR: &str = "#636efa";
/// Colour for survivors.
pub const SURVIVED_COLOR: &str = "#ef553b";

const FONT: &str = "sans-serif";

/// Drawing area inside a document, in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Frame {
    /// Creates a frame.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Frame shrunk by `pad` on every side.
    #[must_use]
    pub fn inset(&self, pad: f64) -> Self {
        Self::new(
            self.x + pad,
            self.y + pad,
            (self.width - 2.0 * pad).max(0.0),
            (self.height - 2.0 * pad).max(0.0),
        )
    }
}

/// White canvas of the given size with a heading.
pub(crate) fn canvas(width: f64, height: f64, title: &str) -> Document {
    Document::new()
        .set("viewBox", (0, 0, width, height))
        .set("width", width)
        .set("height", height)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height)
                .set("fill", "#ffffff"),
        )
        .add(label(title, width / 2.0, 32.0, 20).set("text-anchor", "middle"))
}

/// Text node with the shared font settings.
pub(crate) fn label(content: impl Into<String>, x: f64, y: f64, size: u32) -> Text {
    Text::new(content.into())
        .set("x", x)
        .set("y", y)
        .set("font-family", FONT)
        .set("font-size", size)
        .set("fill", "#222222")
}

/// Round tick step giving roughly `target` intervals up to `max`.
pub(crate) fn nice_step(max: f64, target: usize) -> f64 {
    if max <= 0.0 || target == 0 {
        return 1.0;
    }
    let raw = max / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_steps() {
        assert!((nice_step(100.0, 5) - 20.0).abs() < 1e-9);
        assert!((nice_step(540.0, 5) - 200.0).abs() < 1e-9);
        assert!((nice_step(7.0, 5) - 2.0).abs() < 1e-9);
        assert!((nice_step(0.0, 5) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn canvas_has_heading() {
        let svg = canvas(200.0, 100.0, "Heading").to_string();
        assert!(svg.contains("viewBox=\"0 0 200 100\""));
        assert!(svg.contains("Heading"));
    }

    #[test]
    fn inset_shrinks_both_axes() {
        let frame = Frame::new(10.0, 20.0, 100.0, 50.0).inset(5.0);
        assert_eq!(frame, Frame::new(15.0, 25.0, 90.0, 40.0));
        assert!((frame.right() - 105.0).abs() < 1e-9);
        assert!((frame.bottom() - 65.0).abs() < 1e-9);
    }
}
