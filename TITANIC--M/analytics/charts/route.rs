use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a point.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Departure port.
pub const SOUTHAMPTON: GeoPoint = GeoPoint::new(50.9097, -1.4043);
/// Intended arrival port.
pub const NEW_YORK: GeoPoint = GeoPoint::new(40.7128, -74.0060);
/// Where the ship went down.
pub const SINKING_POINT: GeoPoint = GeoPoint::new(41.73, -49.95);

/// What a marker stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerRole {
    /// Start of the voyage.
    Origin,
    /// Planned end of the voyage.
    Destination,
    /// Sinking location.
    Incident,
}

impl MarkerRole {
    /// Marker colour name.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Origin => "green",
            Self::Destination => "blue",
            Self::Incident => "red",
        }
    }
}

/// Pin on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteMarker {
    /// Role.
    pub role: MarkerRole,
    /// Popup text.
    pub popup: String,
    /// Location.
    pub point: GeoPoint,
}

/// Dashed polyline connecting the markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    /// Vertices in travel order.
    pub points: Vec<GeoPoint>,
    /// Stroke colour.
    pub color: String,
    /// Stroke width in pixels.
    pub weight: u32,
    /// SVG/Leaflet dash pattern.
    pub dash_array: String,
}

/// The static voyage map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteMap {
    /// Initial map centre.
    pub center: GeoPoint,
    /// Initial zoom level.
    pub zoom: u8,
    /// Tile layer name.
    pub tiles: String,
    /// Origin, destination and incident markers.
    pub markers: Vec<RouteMarker>,
    /// Connecting path.
    pub path: RoutePath,
}

impl RouteMap {
    /// Southampton to New York with the sinking point in between.
    #[must_use]
    pub fn titanic() -> Self {
        Self {
            center: GeoPoint::new(45.0, -50.0),
            zoom: 3,
            tiles: "cartodbpositron".into(),
            markers: vec![
                RouteMarker {
                    role: MarkerRole::Origin,
                    popup: "Southampton (Start)".into(),
                    point: SOUTHAMPTON,
                },
                RouteMarker {
                    role: MarkerRole::Destination,
                    popup: "New York (Destination)".into(),
                    point: NEW_YORK,
                },
                RouteMarker {
                    role: MarkerRole::Incident,
                    popup: "Sinking point".into(),
                    point: SINKING_POINT,
                },
            ],
            path: RoutePath {
                points: vec![SOUTHAMPTON, SINKING_POINT, NEW_YORK],
                color: "orange".into(),
                weight: 3,
                dash_array: "5,10".into(),
            },
        }
    }

    /// South-west and north-east corners enclosing every marker and vertex.
    #[must_use]
    pub fn bounds(&self) -> (GeoPoint, GeoPoint) {
        let points = self
            .markers
            .iter()
            .map(|marker| marker.point)
            .chain(self.path.points.iter().copied());
        let mut south_west = GeoPoint::new(f64::INFINITY, f64::INFINITY);
        let mut north_east = GeoPoint::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for point in points {
            south_west.lat = south_west.lat.min(point.lat);
            south_west.lon = south_west.lon.min(point.lon);
            north_east.lat = north_east.lat.max(point.lat);
            north_east.lon = north_east.lon.max(point.lon);
        }
        (south_west, north_east)
    }

    /// GeoJSON `FeatureCollection`: one point per marker plus the path.
    /// Coordinates are `[lon, lat]` as GeoJSON requires.
    #[must_use]
    pub fn to_geojson(&self) -> Value {
        let mut features: Vec<Value> = self
            .markers
            .iter()
            .map(|marker| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [marker.point.lon, marker.point.lat],
                    },
                    "properties": {
                        "role": marker.role,
                        "popup": marker.popup,
                        "marker-color": marker.role.color(),
                    },
                })
            })
            .collect();
        features.push(json!({
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": self
                    .path
                    .points
                    .iter()
                    .map(|point| [point.lon, point.lat])
                    .collect::<Vec<_>>(),
            },
            "properties": {
                "stroke": self.path.color,
                "stroke-width": self.path.weight,
                "dash-array": self.path.dash_array,
            },
        }));
        json!({ "type": "FeatureCollection", "features": features })
    }

    /// Text listing of the markers.
    #[must_use]
    pub fn summary(&self) -> String {
        self.markers
            .iter()
            .map(|marker| {
                format!(
                    "{:<24} {:>9.4}, {:>9.4} ({})",
                    marker.popup,
                    marker.point.lat,
                    marker.point.lon,
                    marker.role.color()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_passes_the_sinking_point() {
        let map = RouteMap::titanic();
        assert_eq!(map.markers.len(), 3);
        assert_eq!(map.path.points, vec![SOUTHAMPTON, SINKING_POINT, NEW_YORK]);
        assert_eq!(map.path.dash_array, "5,10");
        let incident = map
            .markers
            .iter()
            .find(|marker| marker.role == MarkerRole::Incident)
            .unwrap();
        assert_eq!(incident.role.color(), "red");
    }

    #[test]
    fn bounds_cover_both_ports() {
        let (sw, ne) = RouteMap::titanic().bounds();
        assert!((sw.lat - 40.7128).abs() < 1e-9);
        assert!((sw.lon - -74.0060).abs() < 1e-9);
        assert!((ne.lat - 50.9097).abs() < 1e-9);
        assert!((ne.lon - -1.4043).abs() < 1e-9);
    }

    #[test]
    fn geojson_uses_lon_lat_order() {
        let geojson = RouteMap::titanic().to_geojson();
        let features = geojson["features"].as_array().unwrap();
        assert_eq!(features.len(), 4);
        assert_eq!(features[0]["geometry"]["coordinates"][0], -1.4043);
        assert_eq!(features[3]["geometry"]["type"], "LineString");
        assert_eq!(features[3]["geometry"]["coordinates"][1][1], 41.73);
    }
}
