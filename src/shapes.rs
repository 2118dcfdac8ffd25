//! Static route geometry loaded from a GTFS `shapes.txt`-style CSV.
//!
//! Only the six rail line shapes are retained; each is relabeled from its
//! internal shape code to the line's display name.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// A rail line with a known shape, display name and legend color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Route {
    Red,
    Green,
    Yellow,
    Blue,
    Silver,
    Orange,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Red,
        Route::Green,
        Route::Yellow,
        Route::Blue,
        Route::Silver,
        Route::Orange,
    ];

    /// Looks up the line drawn by an internal shape code.
    pub fn from_shape_id(shape_id: &str) -> Option<Self> {
        match shape_id {
            "RRED_16" => Some(Route::Red),
            "RGRN_72" => Some(Route::Green),
            "RYEL_96" => Some(Route::Yellow),
            "RBLU_47" => Some(Route::Blue),
            "RSLV_192" => Some(Route::Silver),
            "RORG_134" => Some(Route::Orange),
            _ => None,
        }
    }

    pub fn shape_id(self) -> &'static str {
        match self {
            Route::Red => "RRED_16",
            Route::Green => "RGRN_72",
            Route::Yellow => "RYEL_96",
            Route::Blue => "RBLU_47",
            Route::Silver => "RSLV_192",
            Route::Orange => "RORG_134",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Route::Red => "RED",
            Route::Green => "GREEN",
            Route::Yellow => "YELLOW",
            Route::Blue => "BLUE",
            Route::Silver => "SILVER",
            Route::Orange => "ORANGE",
        }
    }

    /// Legend color as a `#RRGGBB` string.
    pub fn color(self) -> &'static str {
        match self {
            Route::Red => "#E31837",
            Route::Green => "#00A94F",
            Route::Yellow => "#FFD200",
            Route::Blue => "#0076C0",
            Route::Silver => "#A1A2A1",
            Route::Orange => "#F7941E",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One point of a route polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteShapePoint {
    #[serde(rename = "shape_id")]
    pub route: Route,
    #[serde(rename = "shape_pt_lat")]
    pub latitude: f64,
    #[serde(rename = "shape_pt_lon")]
    pub longitude: f64,
    /// Zero-based position within the route's polyline, in file order.
    pub sequence: usize,
}

#[derive(Debug, Deserialize)]
struct ShapeRow {
    shape_id: String,
    shape_pt_lat: f64,
    shape_pt_lon: f64,
}

/// Reads and filters the shapes CSV at `path`.
///
/// # Errors
///
/// A missing or unreadable file is reported as [`Error::Config`]; malformed
/// rows surface as [`Error::Csv`].
pub fn load_route_shapes(path: impl AsRef<Path>) -> Result<Vec<RouteShapePoint>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::Config(format!("cannot open shapes file {}: {e}", path.display())))?;
    let points = read_route_shapes(file)?;
    info!(path = %path.display(), points = points.len(), "Route shapes loaded");
    Ok(points)
}

/// Reads shape points from any CSV source, keeping only the known lines.
pub fn read_route_shapes<R: Read>(reader: R) -> Result<Vec<RouteShapePoint>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut counts = [0usize; 6];
    let mut points = Vec::new();
    let mut dropped = 0usize;

    for result in rdr.deserialize() {
        let row: ShapeRow = result?;
        let Some(route) = Route::from_shape_id(&row.shape_id) else {
            dropped += 1;
            continue;
        };
        let seq = &mut counts[route as usize];
        points.push(RouteShapePoint {
            route,
            latitude: row.shape_pt_lat,
            longitude: row.shape_pt_lon,
            sequence: *seq,
        });
        *seq += 1;
    }

    debug!(kept = points.len(), dropped, "Filtered shape rows");
    Ok(points)
}

/// Groups points into one polyline per route, in [`Route::ALL`] order.
///
/// Routes with no points are omitted.
pub fn polylines(points: &[RouteShapePoint]) -> Vec<(Route, Vec<[f64; 2]>)> {
    Route::ALL
        .iter()
        .filter_map(|&route| {
            let line: Vec<[f64; 2]> = points
                .iter()
                .filter(|p| p.route == route)
                .map(|p| [p.longitude, p.latitude])
                .collect();
            (!line.is_empty()).then_some((route, line))
        })
        .collect()
}
