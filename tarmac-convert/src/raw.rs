//! Raw scenario records.
//!
//! Raw records follow the JSON mapping of the Waymo `Scenario` proto with
//! proto field names and integer enums. Every field is optional; defaults
//! are applied by the extractor, not here.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// An id given either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// Integer id.
    Int(i64),
    /// String id.
    Str(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Int(v) => write!(f, "{}", v),
            RawId::Str(s) => write!(f, "{}", s),
        }
    }
}

/// A state sample of a track.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawState {
    pub center_x: Option<f64>,
    pub center_y: Option<f64>,
    pub center_z: Option<f64>,
    pub heading: Option<f64>,
    pub velocity_x: Option<f64>,
    pub velocity_y: Option<f64>,
    pub valid: Option<bool>,
}

/// A track of an object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTrack {
    pub id: Option<RawId>,
    pub object_type: Option<i64>,
    pub states: Vec<RawState>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// A map point.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

/// Geometry payload of a map feature.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawGeometry {
    pub polyline: Vec<RawPoint>,
    pub polygon: Vec<RawPoint>,
}

/// A map feature. At most one of the geometry payloads is expected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMapFeature {
    pub id: Option<RawId>,
    pub lane: Option<RawGeometry>,
    pub road_line: Option<RawGeometry>,
    pub road_edge: Option<RawGeometry>,
    pub crosswalk: Option<RawGeometry>,
    pub driveway: Option<RawGeometry>,
}

/// A raw scenario.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawScenario {
    pub scenario_id: Option<String>,
    pub timestamps_seconds: Vec<f64>,
    pub sdc_track_index: Option<i64>,
    pub tracks: Vec<RawTrack>,
    pub map_features: Vec<RawMapFeature>,
}

/// Iterator over the raw records of a file.
///
/// A record that cannot be decoded is yielded as an error so that the caller
/// can skip it and continue with the rest of the file.
pub type RawRecords = Box<dyn Iterator<Item = Result<RawScenario>> + Send>;

/// Reads raw scenario records from dataset files.
pub trait RawRecordSource: Send + Sync {
    /// Returns `true` if the file at `path` can be read by this source.
    fn accepts(&self, path: &Path) -> bool;

    /// Opens a file and returns its records in file order.
    fn open(&self, path: &Path) -> Result<RawRecords>;
}

/// Reads proto-JSON scenarios.
///
/// `*.jsonl` and `*.ndjson` files hold one scenario per line, blank lines are
/// ignored. `*.json` files hold a single scenario.
#[derive(Debug, Clone, Default)]
pub struct JsonScenarioSource;

impl JsonScenarioSource {
    fn is_lines(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("jsonl") | Some("ndjson")
        )
    }
}

impl RawRecordSource for JsonScenarioSource {
    fn accepts(&self, path: &Path) -> bool {
        path.is_file()
            && matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("json") | Some("jsonl") | Some("ndjson")
            )
    }

    fn open(&self, path: &Path) -> Result<RawRecords> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let rdr = BufReader::new(file);

        if !Self::is_lines(path) {
            let scenario: Result<RawScenario> = serde_json::from_reader(rdr)
                .with_context(|| format!("parsing {}", path.display()));
            return Ok(Box::new(std::iter::once(scenario)));
        }

        let display = path.display().to_string();
        let records = rdr
            .lines()
            .enumerate()
            .filter(|(_, line)| !matches!(line, Ok(l) if l.trim().is_empty()))
            .map(move |(ix, line)| {
                let line = line.with_context(|| format!("reading {} line {}", display, ix + 1))?;
                serde_json::from_str::<RawScenario>(&line)
                    .with_context(|| format!("parsing {} line {}", display, ix + 1))
            });
        Ok(Box::new(records))
    }
}
