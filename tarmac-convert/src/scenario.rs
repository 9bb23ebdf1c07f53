//! Scenario records as stored on disk.
//!
//! Field names and type strings follow the scenario description format read
//! by the simulator. State and geometry are stored as nested lists, not
//! arrays, so the simulator receives records through the environment's
//! injection path, which converts them to arrays.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version tag written in every record.
pub const SCENARIO_VERSION: &str = "waymo_v1.2";

/// Dataset name written in record metadata.
pub const DATASET_NAME: &str = "waymo";

/// Type of a tracked object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    /// Vehicle.
    Vehicle,
    /// Pedestrian.
    Pedestrian,
    /// Cyclist.
    Cyclist,
    /// Anything else, including unset types.
    Other,
}

/// Type of a map feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapFeatureType {
    /// Lane center line.
    #[serde(rename = "LANE_SURFACE_STREET")]
    LaneSurfaceStreet,
    /// Painted road line of unknown kind.
    #[serde(rename = "UNKNOWN_LINE")]
    LineUnknown,
    /// Road edge.
    #[serde(rename = "ROAD_EDGE_BOUNDARY")]
    BoundaryLine,
    /// Crosswalk polygon.
    #[serde(rename = "CROSSWALK")]
    Crosswalk,
    /// Driveway polygon.
    #[serde(rename = "DRIVEWAY")]
    Driveway,
    /// Unset.
    #[serde(rename = "UNSET")]
    Unset,
}

/// Time-indexed state arrays of a track.
///
/// All arrays have the same length, the number of samples of the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSeries {
    /// Center position `[x, y, z]`.
    pub position: Vec<[f32; 3]>,

    /// Heading in radians.
    pub heading: Vec<f32>,

    /// Velocity `[vx, vy]`.
    pub velocity: Vec<[f32; 2]>,

    /// Bounding box size `[length, width, height]`.
    pub size: Vec<[f32; 3]>,

    /// Validity flags, 1 for valid.
    pub valid: Vec<i8>,

    /// Bounding box length, broadcast over samples.
    pub length: Vec<f32>,

    /// Bounding box width, broadcast over samples.
    pub width: Vec<f32>,

    /// Bounding box height, broadcast over samples.
    pub height: Vec<f32>,
}

impl StateSeries {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.valid.len()
    }

    /// Returns `true` if there is no sample.
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    /// Returns `true` if all arrays have the same length.
    pub fn is_consistent(&self) -> bool {
        let n = self.len();
        [
            self.position.len(),
            self.heading.len(),
            self.velocity.len(),
            self.size.len(),
            self.length.len(),
            self.width.len(),
            self.height.len(),
        ]
        .iter()
        .all(|len| *len == n)
    }
}

/// Metadata of a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Number of samples.
    pub track_length: usize,

    /// Object type, repeated from the track.
    #[serde(rename = "type")]
    pub object_type: ObjectType,

    /// Object id.
    pub object_id: String,
}

/// A tracked object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Object type.
    #[serde(rename = "type")]
    pub object_type: ObjectType,

    /// State arrays.
    pub state: StateSeries,

    /// Metadata.
    pub metadata: TrackMetadata,
}

/// Geometry of a map feature, stored under the key `polyline` or `polygon`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Open line through the points.
    #[serde(rename = "polyline")]
    Polyline(Vec<[f32; 2]>),

    /// Closed polygon.
    #[serde(rename = "polygon")]
    Polygon(Vec<[f32; 2]>),
}

impl Geometry {
    /// Points of the geometry.
    pub fn points(&self) -> &[[f32; 2]] {
        match self {
            Geometry::Polyline(pts) | Geometry::Polygon(pts) => pts,
        }
    }
}

/// A static map feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFeature {
    /// Feature id.
    pub id: String,

    /// Feature type.
    #[serde(rename = "type")]
    pub feature_type: MapFeatureType,

    /// Geometry.
    #[serde(flatten)]
    pub geometry: Geometry,
}

/// Metadata of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    /// Object id of the self-driving car.
    pub sdc_id: String,

    /// Scenario id.
    pub scenario_id: String,

    /// Dataset name.
    pub dataset: String,
}

/// A converted scenario, one per file.
///
/// The self-driving car id in [`ScenarioMetadata::sdc_id`] is always a key of
/// [`ScenarioRecord::tracks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    /// Scenario id.
    pub id: String,

    /// Version tag.
    pub version: String,

    /// Number of timestamps.
    pub length: usize,

    /// Timestamps in seconds.
    #[serde(rename = "ts")]
    pub timestamps: Vec<f32>,

    /// Metadata.
    pub metadata: ScenarioMetadata,

    /// Tracks keyed by object id.
    pub tracks: BTreeMap<String, Track>,

    /// Map features keyed by feature id.
    pub map_features: BTreeMap<String, MapFeature>,

    /// Traffic signal states. Always empty.
    pub dynamic_map_states: BTreeMap<String, serde_json::Value>,
}

impl ScenarioRecord {
    /// Returns the track of the self-driving car.
    pub fn sdc_track(&self) -> Option<&Track> {
        self.tracks.get(&self.metadata.sdc_id)
    }
}
