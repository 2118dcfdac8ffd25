//! CLI entry point for the rail real-time positions dashboard.
//!
//! Provides subcommands for one-off fetches of vehicle positions and trip
//! updates, inspecting the static route shapes, writing the map document,
//! and a manually refreshed dashboard loop.

use std::ffi::OsStr;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rail_rt::config::{
    DEFAULT_KEY_FILE, DEFAULT_KEY_HEADER, DEFAULT_SHAPES_FILE, DEFAULT_TRIP_UPDATES_URL,
    DEFAULT_VEHICLE_POSITIONS_URL, FeedConfig,
};
use rail_rt::fetch::{BasicClient, FeedSource, HttpClient};
use rail_rt::flatten::VehiclePositionTable;
use rail_rt::map::build_map;
use rail_rt::output::{print_json, print_pretty, write_json_atomic, write_records, write_records_to};
use rail_rt::pipeline::{refresh_trip_updates, refresh_vehicle_positions};
use rail_rt::shapes::{Route, RouteShapePoint, load_route_shapes};
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "rail_rt")]
#[command(about = "Real-time rail vehicle positions over route shapes", long_about = None)]
struct Cli {
    #[command(flatten)]
    auth: AuthArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct AuthArgs {
    /// File holding the API key, read once at startup
    #[arg(long, global = true, default_value = DEFAULT_KEY_FILE)]
    key_file: PathBuf,

    /// Header that carries the API key
    #[arg(long, global = true, default_value = DEFAULT_KEY_HEADER)]
    key_header: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch vehicle positions once and print or save them
    Positions {
        /// URL or captured .pb file
        #[arg(value_name = "FILE_OR_URL", default_value = DEFAULT_VEHICLE_POSITIONS_URL)]
        source: String,

        /// CSV file to write the rows to (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Log rows as JSON instead of CSV
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Only emit the vehicle with this entity id
        #[arg(long)]
        entity: Option<String>,
    },
    /// Fetch trip updates once and print or save them, one row per stop
    TripUpdates {
        /// URL or captured .pb file
        #[arg(value_name = "FILE_OR_URL", default_value = DEFAULT_TRIP_UPDATES_URL)]
        source: String,

        /// CSV file to write the rows to (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Log rows as JSON instead of CSV
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Load the static route shapes and summarize them
    Shapes {
        #[arg(short, long, default_value = DEFAULT_SHAPES_FILE)]
        shapes: PathBuf,

        /// CSV file to write the relabeled points to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch vehicle positions once and write the GeoJSON map
    Map {
        #[arg(value_name = "FILE_OR_URL", default_value = DEFAULT_VEHICLE_POSITIONS_URL)]
        source: String,

        #[arg(short, long, default_value = DEFAULT_SHAPES_FILE)]
        shapes: PathBuf,

        #[arg(short, long, default_value = "map.geojson")]
        output: PathBuf,
    },
    /// Refresh the map each time Enter is pressed; `q` quits
    Dashboard {
        #[arg(value_name = "FILE_OR_URL", default_value = DEFAULT_VEHICLE_POSITIONS_URL)]
        source: String,

        #[arg(short, long, default_value = DEFAULT_SHAPES_FILE)]
        shapes: PathBuf,

        #[arg(short, long, default_value = "map.geojson")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/rail_rt.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("rail_rt.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Positions {
            source,
            output,
            json,
            entity,
        } => {
            let source = FeedSource::parse(&source);
            let client = client_for(&source, &cli.auth)?;
            let snapshot = refresh_vehicle_positions(client.as_ref(), &source)?;
            print_pretty(&snapshot.summary);
            match entity {
                Some(entity_id) => {
                    let table = VehiclePositionTable::from(snapshot.rows);
                    let row = table
                        .get(&entity_id)
                        .with_context(|| format!("no vehicle entity {entity_id} in {source}"))?;
                    emit(std::slice::from_ref(row), output.as_deref(), json)?;
                }
                None => emit(&snapshot.rows, output.as_deref(), json)?,
            }
        }
        Commands::TripUpdates {
            source,
            output,
            json,
        } => {
            let source = FeedSource::parse(&source);
            let client = client_for(&source, &cli.auth)?;
            let snapshot = refresh_trip_updates(client.as_ref(), &source)?;
            print_pretty(&snapshot.summary);
            emit(&snapshot.rows, output.as_deref(), json)?;
        }
        Commands::Shapes { shapes, output } => {
            let points = load_shapes(&shapes)?;
            for route in Route::ALL {
                let count = points.iter().filter(|p| p.route == route).count();
                info!(route = %route, color = route.color(), points = count, "Route shape");
            }
            if let Some(path) = output {
                write_records(&path, &points)?;
            }
        }
        Commands::Map {
            source,
            shapes,
            output,
        } => {
            let points = load_shapes(&shapes)?;
            let source = FeedSource::parse(&source);
            let client = client_for(&source, &cli.auth)?;
            let snapshot = refresh_vehicle_positions(client.as_ref(), &source)?;
            write_json_atomic(&output, &build_map(&points, &snapshot.rows))?;
            info!(path = %output.display(), vehicles = snapshot.rows.len(), "Map written");
        }
        Commands::Dashboard {
            source,
            shapes,
            output,
        } => {
            let points = load_shapes(&shapes)?;
            let source = FeedSource::parse(&source);
            let client = client_for(&source, &cli.auth)?;
            dashboard(client.as_ref(), &source, &points, &output)?;
        }
    }

    Ok(())
}

/// Builds the HTTP client for `source`. The key file is only read when the
/// source is a live endpoint.
fn client_for(source: &FeedSource, auth: &AuthArgs) -> Result<Box<dyn HttpClient>> {
    match source {
        FeedSource::Url(_) => {
            let config = FeedConfig::from_key_file(&auth.key_file)
                .context("API key is required for live feeds")?
                .with_key_header(auth.key_header.as_str());
            Ok(Box::new(config.client()?))
        }
        FeedSource::File(_) => Ok(Box::new(BasicClient::new())),
    }
}

fn load_shapes(path: &Path) -> Result<Vec<RouteShapePoint>> {
    load_route_shapes(path).with_context(|| format!("loading route shapes from {}", path.display()))
}

/// Writes rows to `output` as CSV, or to the log (JSON) / stdout (CSV).
fn emit<T: Serialize>(rows: &[T], output: Option<&Path>, json: bool) -> Result<()> {
    match output {
        Some(path) => {
            write_records(path, rows)?;
            info!(path = %path.display(), rows = rows.len(), "Rows written");
        }
        None if json => print_json(rows)?,
        None => write_records_to(std::io::stdout().lock(), rows)?,
    }
    Ok(())
}

/// Runs one refresh per line read from stdin until `q` or end of input.
///
/// A failed refresh is logged and leaves the last written map untouched.
fn dashboard(
    client: &dyn HttpClient,
    source: &FeedSource,
    shapes: &[RouteShapePoint],
    output: &Path,
) -> Result<()> {
    info!(source = %source, map = %output.display(), "Press Enter to refresh, q to quit");

    let stdin = std::io::stdin();
    let mut refreshes = 0usize;

    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "q" | "quit" => break,
            "" | "r" | "refresh" => {}
            other => {
                warn!(input = other, "Unknown command; press Enter to refresh, q to quit");
                continue;
            }
        }

        refreshes += 1;
        let cycle = refresh_vehicle_positions(client, source).and_then(|snapshot| {
            write_json_atomic(output, &build_map(shapes, &snapshot.rows))?;
            Ok(snapshot)
        });

        match cycle {
            Ok(snapshot) => info!(
                refresh = refreshes,
                vehicles = snapshot.rows.len(),
                deleted = snapshot.summary.deleted,
                occupancy_pct = snapshot.summary.occupancy_pct(),
                "Map updated"
            ),
            Err(e) => error!(
                refresh = refreshes,
                kind = e.kind(),
                error = %e,
                "Refresh failed; keeping previous map"
            ),
        }
    }

    info!(refreshes, "Dashboard closed");
    Ok(())
}
