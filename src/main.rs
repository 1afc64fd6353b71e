// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use waypath::{Annotator, Heuristic, Location};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] waypath::reader::Error);

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct LabelsLoadError(PathBuf, #[source] io::Error);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Auto,
    Text,
    TextGz,
    TextBz2,
    Xml,
    XmlGz,
    XmlBz2,
}

impl From<Format> for waypath::reader::FileFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Auto => Self::Unknown,
            Format::Text => Self::Text,
            Format::TextGz => Self::TextGz,
            Format::TextBz2 => Self::TextBz2,
            Format::Xml => Self::Xml,
            Format::XmlGz => Self::XmlGz,
            Format::XmlBz2 => Self::XmlBz2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HeuristicKind {
    /// Straight-line distance over raw coordinates
    Euclidean,
    /// Great-circle distance in kilometers
    Haversine,
    /// No estimate (Dijkstra's algorithm)
    Zero,
}

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The path to the segments file
    segments_file: PathBuf,

    /// Latitude of the start point
    start_lat: f64,

    /// Longitude of the start point
    start_lon: f64,

    /// Latitude of the end point
    end_lat: f64,

    /// Longitude of the end point
    end_lon: f64,

    /// Format of the segments file
    #[arg(long, value_enum, default_value_t = Format::Auto)]
    format: Format,

    /// Estimate of the remaining cost used to guide the search
    #[arg(long, value_enum, default_value_t = HeuristicKind::Euclidean)]
    heuristic: HeuristicKind,

    /// Divide heuristic estimates by this maximum travel rate (e.g. top speed for time costs)
    #[arg(long, value_parser = parse_rate)]
    max_rate: Option<f64>,

    /// Give up after expanding this many locations
    #[arg(long, default_value_t = waypath::DEFAULT_STEP_LIMIT)]
    step_limit: usize,

    /// Give up after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// File with place names, one `lat lon label` per line
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Only accept start and end points which exactly match a known location,
    /// instead of using the nearest known one
    #[arg(long)]
    exact: bool,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

pub fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let g = load_graph(&cli.segments_file, cli.format.into())?;

    let heuristic: Box<dyn Heuristic> = match (cli.heuristic, cli.max_rate) {
        (HeuristicKind::Euclidean, None) => Box::new(waypath::Euclidean),
        (HeuristicKind::Euclidean, Some(r)) => Box::new(waypath::Scaled::new(waypath::Euclidean, r)),
        (HeuristicKind::Haversine, None) => Box::new(waypath::Haversine),
        (HeuristicKind::Haversine, Some(r)) => Box::new(waypath::Scaled::new(waypath::Haversine, r)),
        (HeuristicKind::Zero, _) => Box::new(waypath::Zero),
    };

    let requested_start = Location::new(cli.start_lat, cli.start_lon);
    let requested_end = Location::new(cli.end_lat, cli.end_lon);
    let (start, end) = if cli.exact {
        (requested_start, requested_end)
    } else {
        let Some(tree) = waypath::KDTree::from_graph(&g) else {
            println!("no path found: the graph is empty");
            return Ok(ExitCode::FAILURE);
        };
        // Snap with a real distance, even if the search runs without an estimate
        let metric: &dyn Heuristic = match cli.heuristic {
            HeuristicKind::Haversine => &waypath::Haversine,
            HeuristicKind::Euclidean | HeuristicKind::Zero => &waypath::Euclidean,
        };
        (
            tree.find_nearest(requested_start, metric).1,
            tree.find_nearest(requested_end, metric).1,
        )
    };
    log::info!("routing from {} to {}", start, end);

    let limits = waypath::SearchLimits {
        step_limit: cli.step_limit,
        deadline: cli
            .timeout_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms)),
    };

    let route = match waypath::find_path_with_limits(&g, heuristic.as_ref(), start, end, &limits) {
        Ok(route) => route,
        Err(waypath::SearchError::NotFound) => {
            println!("no path found from {} to {}", start, end);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    let annotator: Box<dyn Annotator> = match cli.labels {
        Some(ref path) => Box::new(load_labels(path)?),
        None => Box::new(waypath::CoordinateAnnotator::default()),
    };

    for (idx, waypoint) in waypath::annotate(&route, annotator.as_ref())
        .iter()
        .enumerate()
    {
        println!(
            "{:>4}  {:>11.6} {:>11.6}  {}",
            idx, waypoint.location.lat, waypoint.location.lon, waypoint.label
        );
    }
    println!("total cost: {}", route.cost);

    Ok(ExitCode::SUCCESS)
}

fn parse_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("rate must be a positive, finite number, got {}", rate))
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    colog::default_builder().filter_level(level).init();
}

fn load_graph<P: AsRef<Path>>(
    path: P,
    file_format: waypath::reader::FileFormat,
) -> Result<waypath::Graph, GraphLoadError> {
    let mut g = waypath::Graph::default();
    let options = waypath::reader::Options {
        file_format,
        ..Default::default()
    };
    match waypath::reader::add_segments_from_file(&mut g, &options, path.as_ref()) {
        Ok(_) => Ok(g),
        Err(e) => Err(GraphLoadError(PathBuf::from(path.as_ref()), e)),
    }
}

fn load_labels(path: &Path) -> Result<waypath::Gazetteer, LabelsLoadError> {
    File::open(path)
        .and_then(|f| waypath::Gazetteer::from_io(io::BufReader::new(f)))
        .map_err(|e| LabelsLoadError(PathBuf::from(path), e))
}
