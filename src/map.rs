//! GeoJSON hand-off to the map front end.
//!
//! Route polylines are drawn in their legend color; every vehicle is a point
//! marker. The fixed initial view is attached as a foreign member.

use serde_json::{Value, json};

use crate::flatten::VehiclePositionRecord;
use crate::shapes::{RouteShapePoint, polylines};

pub const MAP_CENTER: [f64; 2] = [38.95, -77.15];
pub const MAP_ZOOM: f64 = 9.3;
pub const MAP_STYLE: &str = "carto-darkmatter";

const LINE_WIDTH: u32 = 4;
const VEHICLE_COLOR: &str = "mintcream";
const VEHICLE_SIZE: u32 = 10;
const VEHICLE_OPACITY: f64 = 0.8;

/// Builds a `FeatureCollection` with one line per route and one point per vehicle.
pub fn build_map(shapes: &[RouteShapePoint], vehicles: &[VehiclePositionRecord]) -> Value {
    let mut features: Vec<Value> = polylines(shapes)
        .into_iter()
        .map(|(route, line)| {
            json!({
                "type": "Feature",
                "geometry": { "type": "LineString", "coordinates": line },
                "properties": {
                    "name": route.display_name(),
                    "stroke": route.color(),
                    "stroke-width": LINE_WIDTH,
                },
            })
        })
        .collect();

    features.extend(vehicles.iter().map(vehicle_feature));

    json!({
        "type": "FeatureCollection",
        "view": {
            "center": { "lat": MAP_CENTER[0], "lon": MAP_CENTER[1] },
            "zoom": MAP_ZOOM,
            "style": MAP_STYLE,
        },
        "features": features,
    })
}

fn vehicle_feature(v: &VehiclePositionRecord) -> Value {
    json!({
        "type": "Feature",
        "id": v.id,
        "geometry": {
            "type": "Point",
            "coordinates": [v.longitude as f64, v.latitude as f64],
        },
        "properties": {
            "name": "Vehicle Positions",
            "trip_id": v.trip_id,
            "route_id": v.route_id,
            "vehicle_id": v.vehicle_id,
            "label": v.label,
            "bearing": v.bearing,
            "timestamp": v.timestamp.to_rfc3339(),
            "marker-color": VEHICLE_COLOR,
            "marker-size": VEHICLE_SIZE,
            "opacity": VEHICLE_OPACITY,
        },
    })
}
