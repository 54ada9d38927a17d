use svg::node::element::{Circle, Line, Polyline, Rectangle};

use super::{canvas, label, Frame};
use crate::charts::route::{GeoPoint, RouteMap};

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 560.0;
const PADDING_DEG: f64 = 8.0;
const GRATICULE_DEG: f64 = 10.0;

/// Plate carrée projection of a lat/lon window onto a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    south_west: GeoPoint,
    north_east: GeoPoint,
    frame: Frame,
}

impl Projection {
    /// Fits the window `[south_west, north_east]` into `frame`, keeping one
    /// degree of latitude as tall as one degree of longitude is wide.
    #[must_use]
    pub fn fit(south_west: GeoPoint, north_east: GeoPoint, frame: Frame) -> Self {
        let lat_span = (north_east.lat - south_west.lat).max(1e-6);
        let lon_span = (north_east.lon - south_west.lon).max(1e-6);
        let scale = (frame.width / lon_span).min(frame.height / lat_span);
        let used_width = lon_span * scale;
        let used_height = lat_span * scale;
        Self {
            south_west,
            north_east,
            frame: Frame::new(
                frame.x + (frame.width - used_width) / 2.0,
                frame.y + (frame.height - used_height) / 2.0,
                used_width,
                used_height,
            ),
        }
    }

    /// SVG coordinates of a point.
    #[must_use]
    pub fn project(&self, point: GeoPoint) -> (f64, f64) {
        let lon_span = self.north_east.lon - self.south_west.lon;
        let lat_span = self.north_east.lat - self.south_west.lat;
        let x = self.frame.x + (point.lon - self.south_west.lon) / lon_span * self.frame.width;
        let y = self.frame.y + (self.north_east.lat - point.lat) / lat_span * self.frame.height;
        (x, y)
    }

    /// Area covered by the projected window.
    #[must_use]
    pub const fn frame(&self) -> Frame {
        self.frame
    }
}

/// Map with graticule, dashed route and coloured markers.
#[must_use]
pub fn route_map(map: &RouteMap) -> String {
    let (south_west, north_east) = map.bounds();
    let south_west = GeoPoint::new(south_west.lat - PADDING_DEG, south_west.lon - PADDING_DEG);
    let north_east = GeoPoint::new(north_east.lat + PADDING_DEG, north_east.lon + PADDING_DEG);
    let projection = Projection::fit(
        south_west,
        north_east,
        Frame::new(40.0, 60.0, WIDTH - 80.0, HEIGHT - 100.0),
    );
    let area = projection.frame();

    let mut doc = canvas(WIDTH, HEIGHT, "Titanic Route Map").add(
        Rectangle::new()
            .set("x", area.x)
            .set("y", area.y)
            .set("width", area.width)
            .set("height", area.height)
            .set("fill", "#f2f4f5")
            .set("stroke", "#c8cdd0"),
    );

    let mut lon = (south_west.lon / GRATICULE_DEG).ceil() * GRATICULE_DEG;
    while lon <= north_east.lon {
        let (x, _) = projection.project(GeoPoint::new(south_west.lat, lon));
        doc = doc
            .add(
                Line::new()
                    .set("x1", x)
                    .set("y1", area.y)
                    .set("x2", x)
                    .set("y2", area.bottom())
                    .set("stroke", "#dde1e3")
                    .set("stroke-width", 1),
            )
            .add(
                label(format!("{lon}°"), x, area.bottom() + 16.0, 10)
                    .set("text-anchor", "middle")
                    .set("fill", "#777777"),
            );
        lon += GRATICULE_DEG;
    }
    let mut lat = (south_west.lat / GRATICULE_DEG).ceil() * GRATICULE_DEG;
    while lat <= north_east.lat {
        let (_, y) = projection.project(GeoPoint::new(lat, south_west.lon));
        doc = doc
            .add(
                Line::new()
                    .set("x1", area.x)
                    .set("y1", y)
                    .set("x2", area.right())
                    .set("y2", y)
                    .set("stroke", "#dde1e3")
                    .set("stroke-width", 1),
            )
            .add(
                label(format!("{lat}°"), area.x - 6.0, y + 4.0, 10)
                    .set("text-anchor", "end")
                    .set("fill", "#777777"),
            );
        lat += GRATICULE_DEG;
    }

    if map.path.points.len() > 1 {
        let points = map
            .path
            .points
            .iter()
            .map(|point| {
                let (x, y) = projection.project(*point);
                format!("{x:.2},{y:.2}")
            })
            .collect::<Vec<_>>()
            .join(" ");
        doc = doc.add(
            Polyline::new()
                .set("points", points)
                .set("fill", "none")
                .set("stroke", map.path.color.as_str())
                .set("stroke-width", map.path.weight)
                .set("stroke-dasharray", map.path.dash_array.as_str()),
        );
    }

    for marker in &map.markers {
        let (x, y) = projection.project(marker.point);
        doc = doc
            .add(
                Circle::new()
                    .set("cx", x)
                    .set("cy", y)
                    .set("r", 7)
                    .set("fill", marker.role.color())
                    .set("stroke", "#ffffff")
                    .set("stroke-width", 2),
            )
            .add(label(marker.popup.clone(), x + 10.0, y - 10.0, 13));
    }

    doc.add(
        label(
            format!("tiles: {} | zoom {}", map.tiles, map.zoom),
            area.x,
            HEIGHT - 12.0,
            10,
        )
        .set("fill", "#777777"),
    )
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_preserves_orientation() {
        let projection = Projection::fit(
            GeoPoint::new(30.0, -80.0),
            GeoPoint::new(60.0, 10.0),
            Frame::new(0.0, 0.0, 900.0, 300.0),
        );
        let (west_x, _) = projection.project(GeoPoint::new(45.0, -80.0));
        let (east_x, _) = projection.project(GeoPoint::new(45.0, 10.0));
        let (_, north_y) = projection.project(GeoPoint::new(60.0, 0.0));
        let (_, south_y) = projection.project(GeoPoint::new(30.0, 0.0));
        assert!(west_x < east_x);
        assert!(north_y < south_y);
        assert!((east_x - west_x - 900.0).abs() < 1e-9);
        assert!((south_y - north_y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn document_draws_route_and_markers() {
        let svg = route_map(&RouteMap::titanic());
        assert!(svg.contains("stroke-dasharray=\"5,10\""));
        assert!(svg.contains("stroke=\"orange\""));
        for color in ["green", "blue", "red"] {
            assert!(svg.contains(&format!("fill=\"{color}\"")));
        }
        assert!(svg.contains("Southampton (Start)"));
        assert!(svg.contains("New York (Destination)"));
        assert!(svg.contains("cartodbpositron"));
    }
}
