//! Assembly of scenario records from raw scenarios.
use crate::{
    extract::{extract_map_feature, extract_state_series, object_type},
    raw::RawScenario,
    scenario::{ScenarioMetadata, ScenarioRecord, Track, TrackMetadata, DATASET_NAME, SCENARIO_VERSION},
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Object id used when the self-driving car cannot be resolved.
pub const UNKNOWN_ID: &str = "unknown";

/// How the scenario identifier is derived from the raw `scenario_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum IdPolicy {
    /// Keep the part before the first `|`. Raw ids look like
    /// `<hash>|<source-path>`. If that part is empty or still names a
    /// `tfrecord`, the id `<source>_<index>` is synthesized.
    #[default]
    SplitPrefix,

    /// Keep the raw id.
    Raw,
}

impl IdPolicy {
    /// Derives the scenario identifier.
    ///
    /// * `raw_id` - `scenario_id` of the raw record, if any.
    /// * `source` - file name of the input file.
    /// * `index` - position of the record in the input file.
    pub fn apply(&self, raw_id: Option<&str>, source: &str, index: usize) -> String {
        let raw_id = raw_id.unwrap_or(UNKNOWN_ID);
        match self {
            IdPolicy::Raw => raw_id.to_string(),
            IdPolicy::SplitPrefix => {
                let clean = raw_id.split('|').next().unwrap_or_default();
                if clean.is_empty() || clean.contains("tfrecord") {
                    format!("{}_{}", source, index)
                } else {
                    clean.to_string()
                }
            }
        }
    }
}

/// Builds [`ScenarioRecord`]s from [`RawScenario`]s.
#[derive(Debug, Clone)]
pub struct ScenarioAssembler {
    id_policy: IdPolicy,
    dataset: String,
    version: String,
}

impl Default for ScenarioAssembler {
    fn default() -> Self {
        Self {
            id_policy: IdPolicy::default(),
            dataset: DATASET_NAME.to_string(),
            version: SCENARIO_VERSION.to_string(),
        }
    }
}

impl ScenarioAssembler {
    /// Sets the identifier policy.
    pub fn id_policy(mut self, v: IdPolicy) -> Self {
        self.id_policy = v;
        self
    }

    /// Sets the dataset name written in the metadata.
    pub fn dataset(mut self, v: impl Into<String>) -> Self {
        self.dataset = v.into();
        self
    }

    /// Sets the version tag.
    pub fn version(mut self, v: impl Into<String>) -> Self {
        self.version = v.into();
        self
    }

    /// Resolves the object id of the self-driving car.
    ///
    /// An index outside the track list, or a track without id, resolves to
    /// [`UNKNOWN_ID`].
    pub fn resolve_sdc_id(raw: &RawScenario) -> String {
        let ix = raw.sdc_track_index.unwrap_or(0);
        usize::try_from(ix)
            .ok()
            .and_then(|ix| raw.tracks.get(ix))
            .and_then(|track| track.id.as_ref())
            .map(|id| id.to_string())
            .unwrap_or_else(|| UNKNOWN_ID.to_string())
    }

    /// Builds the track table. Tracks without id or states are skipped.
    pub fn tracks(raw: &RawScenario) -> BTreeMap<String, Track> {
        raw.tracks
            .iter()
            .filter_map(|track| {
                let object_id = track.id.as_ref()?.to_string();
                let state = extract_state_series(track)?;
                let object_type = object_type(track.object_type);
                let metadata = TrackMetadata {
                    track_length: state.len(),
                    object_type,
                    object_id: object_id.clone(),
                };
                Some((
                    object_id,
                    Track {
                        object_type,
                        state,
                        metadata,
                    },
                ))
            })
            .collect()
    }

    /// Assembles a scenario record.
    ///
    /// Returns `None` when the self-driving car is not among the extracted
    /// tracks.
    ///
    /// * `source` - file name of the input file, used for synthesized ids.
    /// * `index` - position of the record in the input file.
    pub fn assemble(&self, raw: &RawScenario, source: &str, index: usize) -> Option<ScenarioRecord> {
        let sdc_id = Self::resolve_sdc_id(raw);
        let tracks = Self::tracks(raw);
        if !tracks.contains_key(&sdc_id) {
            return None;
        }

        let id = self.id_policy.apply(raw.scenario_id.as_deref(), source, index);
        let map_features = raw
            .map_features
            .iter()
            .filter_map(extract_map_feature)
            .map(|f| (f.id.clone(), f))
            .collect();
        let timestamps: Vec<f32> = raw.timestamps_seconds.iter().map(|t| *t as f32).collect();

        Some(ScenarioRecord {
            id: id.clone(),
            version: self.version.clone(),
            length: timestamps.len(),
            timestamps,
            metadata: ScenarioMetadata {
                sdc_id,
                scenario_id: id,
                dataset: self.dataset.clone(),
            },
            tracks,
            map_features,
            dynamic_map_states: BTreeMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Geometry, ObjectType};

    fn raw(value: serde_json::Value) -> RawScenario {
        serde_json::from_value(value).unwrap()
    }

    fn two_track_scenario(sdc_track_index: i64) -> RawScenario {
        raw(serde_json::json!({
            "scenario_id": "abc123|training.tfrecord-00000",
            "timestamps_seconds": [0.0, 0.1, 0.2],
            "sdc_track_index": sdc_track_index,
            "tracks": [
                {"id": 11, "object_type": 1, "states": [{"center_x": 1.0}, {"center_x": 2.0}, {}]},
                {"id": 12, "object_type": 2, "states": []},
                {"id": 13, "object_type": 3, "states": [{}, {}, {}]}
            ],
            "map_features": [
                {"id": 100, "lane": {"polyline": [{"x": 0.0, "y": 0.0}, {"x": 1.0, "y": 0.0}]}},
                {"id": 101, "lane": {"polyline": []}},
                {"id": 102, "stop_sign": {}}
            ]
        }))
    }

    #[test]
    fn test_assemble_scenario() {
        let record = ScenarioAssembler::default()
            .assemble(&two_track_scenario(0), "training.jsonl", 4)
            .unwrap();

        assert_eq!(record.id, "abc123");
        assert_eq!(record.metadata.scenario_id, "abc123");
        assert_eq!(record.metadata.sdc_id, "11");
        assert_eq!(record.metadata.dataset, "waymo");
        assert_eq!(record.version, "waymo_v1.2");
        assert_eq!(record.length, 3);
        assert_eq!(record.timestamps, vec![0.0, 0.1, 0.2]);
        assert_eq!(record.tracks.keys().collect::<Vec<_>>(), vec!["11", "13"]);
        assert_eq!(record.tracks["13"].object_type, ObjectType::Cyclist);
        assert_eq!(record.tracks["11"].metadata.track_length, 3);
        assert_eq!(record.sdc_track().unwrap().state.position[1][0], 2.0);
        assert_eq!(record.map_features.len(), 1);
        assert!(matches!(
            record.map_features["100"].geometry,
            Geometry::Polyline(_)
        ));
        assert!(record.dynamic_map_states.is_empty());
    }

    #[test]
    fn test_sdc_without_states_rejects_record() {
        assert!(ScenarioAssembler::default()
            .assemble(&two_track_scenario(1), "training.jsonl", 0)
            .is_none());
    }

    #[test]
    fn test_sdc_index_out_of_range_resolves_unknown() {
        assert_eq!(ScenarioAssembler::resolve_sdc_id(&two_track_scenario(3)), UNKNOWN_ID);
        assert_eq!(ScenarioAssembler::resolve_sdc_id(&two_track_scenario(-1)), UNKNOWN_ID);
        assert!(ScenarioAssembler::default()
            .assemble(&two_track_scenario(3), "training.jsonl", 0)
            .is_none());
    }

    #[test]
    fn test_split_prefix_policy() {
        let p = IdPolicy::SplitPrefix;
        assert_eq!(p.apply(Some("abc123|training.tfrecord-00000"), "f.jsonl", 0), "abc123");
        assert_eq!(p.apply(Some("plain_id"), "f.jsonl", 0), "plain_id");
        assert_eq!(p.apply(Some("|training.tfrecord-00000"), "f.jsonl", 2), "f.jsonl_2");
        assert_eq!(p.apply(Some("training.tfrecord-00000"), "f.jsonl", 5), "f.jsonl_5");
        assert_eq!(p.apply(Some(""), "f.jsonl", 1), "f.jsonl_1");
        assert_eq!(p.apply(None, "f.jsonl", 1), UNKNOWN_ID);
    }

    #[test]
    fn test_raw_policy() {
        let p = IdPolicy::Raw;
        assert_eq!(
            p.apply(Some("abc123|training.tfrecord-00000"), "f.jsonl", 0),
            "abc123|training.tfrecord-00000"
        );
        assert_eq!(p.apply(None, "f.jsonl", 0), UNKNOWN_ID);
    }

    #[test]
    fn test_id_policy_from_cli_value() {
        assert_eq!(IdPolicy::from_str("split-prefix", false), Ok(IdPolicy::SplitPrefix));
        assert_eq!(IdPolicy::from_str("raw", false), Ok(IdPolicy::Raw));
        assert!(IdPolicy::from_str("prefix", false).is_err());
    }
}
