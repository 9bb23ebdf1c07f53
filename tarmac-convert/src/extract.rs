//! Conversion of raw tracks and map features into typed arrays.
use crate::{
    raw::{RawGeometry, RawMapFeature, RawTrack},
    scenario::{Geometry, MapFeature, MapFeatureType, ObjectType, StateSeries},
};

/// Bounding box length used when a track has none.
pub const DEFAULT_LENGTH: f64 = 4.5;

/// Bounding box width used when a track has none.
pub const DEFAULT_WIDTH: f64 = 2.0;

/// Bounding box height used when a track has none.
pub const DEFAULT_HEIGHT: f64 = 1.5;

/// Maps a Waymo object type code to [`ObjectType`].
pub fn object_type(code: Option<i64>) -> ObjectType {
    match code {
        Some(1) => ObjectType::Vehicle,
        Some(2) => ObjectType::Pedestrian,
        Some(3) => ObjectType::Cyclist,
        _ => ObjectType::Other,
    }
}

/// Builds the state arrays of a track.
///
/// Returns `None` for a track without states. Missing sample fields are 0 and
/// every sample is marked valid; no gap filling is done.
pub fn extract_state_series(track: &RawTrack) -> Option<StateSeries> {
    if track.states.is_empty() {
        return None;
    }

    let length = track.length.unwrap_or(DEFAULT_LENGTH) as f32;
    let width = track.width.unwrap_or(DEFAULT_WIDTH) as f32;
    let height = track.height.unwrap_or(DEFAULT_HEIGHT) as f32;
    let n = track.states.len();

    let mut series = StateSeries {
        position: Vec::with_capacity(n),
        heading: Vec::with_capacity(n),
        velocity: Vec::with_capacity(n),
        size: Vec::with_capacity(n),
        valid: Vec::with_capacity(n),
        length: vec![length; n],
        width: vec![width; n],
        height: vec![height; n],
    };

    for state in track.states.iter() {
        series.position.push([
            state.center_x.unwrap_or(0.0) as f32,
            state.center_y.unwrap_or(0.0) as f32,
            state.center_z.unwrap_or(0.0) as f32,
        ]);
        series.heading.push(state.heading.unwrap_or(0.0) as f32);
        series.velocity.push([
            state.velocity_x.unwrap_or(0.0) as f32,
            state.velocity_y.unwrap_or(0.0) as f32,
        ]);
        series.size.push([length, width, height]);
        series.valid.push(1);
    }

    Some(series)
}

/// Selects the geometry source of a map feature.
///
/// The first present key wins in the order lane, road line, road edge,
/// crosswalk, driveway. The choice does not look at the points.
fn select_geometry(feature: &RawMapFeature) -> Option<(MapFeatureType, &RawGeometry, bool)> {
    use MapFeatureType::*;
    [
        (LaneSurfaceStreet, feature.lane.as_ref(), false),
        (LineUnknown, feature.road_line.as_ref(), false),
        (BoundaryLine, feature.road_edge.as_ref(), false),
        (Crosswalk, feature.crosswalk.as_ref(), true),
        (Driveway, feature.driveway.as_ref(), true),
    ]
    .into_iter()
    .find_map(|(t, g, is_polygon)| g.map(|g| (t, g, is_polygon)))
}

/// Converts a raw map feature.
///
/// Returns `None` if the feature has no id, no known geometry source, or no
/// points under the selected source.
pub fn extract_map_feature(feature: &RawMapFeature) -> Option<MapFeature> {
    let id = feature.id.as_ref()?.to_string();
    let (feature_type, raw, is_polygon) = select_geometry(feature)?;
    let points_raw = if is_polygon { &raw.polygon } else { &raw.polyline };
    if points_raw.is_empty() {
        return None;
    }

    let points = points_raw
        .iter()
        .map(|p| [p.x.unwrap_or(0.0) as f32, p.y.unwrap_or(0.0) as f32])
        .collect();
    let geometry = if is_polygon {
        Geometry::Polygon(points)
    } else {
        Geometry::Polyline(points)
    };

    Some(MapFeature {
        id,
        feature_type,
        geometry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{RawId, RawPoint, RawState};

    fn point(x: f64, y: f64) -> RawPoint {
        RawPoint {
            x: Some(x),
            y: Some(y),
            z: None,
        }
    }

    fn feature(id: i64) -> RawMapFeature {
        RawMapFeature {
            id: Some(RawId::Int(id)),
            ..Default::default()
        }
    }

    #[test]
    fn test_state_series_lengths_and_validity() {
        let states = (0..11)
            .map(|i| RawState {
                center_x: Some(i as f64),
                heading: Some(0.1),
                ..Default::default()
            })
            .collect();
        let track = RawTrack {
            id: Some(RawId::Int(1)),
            states,
            ..Default::default()
        };

        let series = extract_state_series(&track).unwrap();
        assert_eq!(series.len(), 11);
        assert!(series.is_consistent());
        assert!(series.valid.iter().all(|v| *v == 1));
        assert_eq!(series.position[10], [10.0, 0.0, 0.0]);
        assert_eq!(series.velocity[3], [0.0, 0.0]);
    }

    #[test]
    fn test_state_series_dimensions() {
        let mut track = RawTrack {
            states: vec![RawState::default(); 2],
            ..Default::default()
        };
        let series = extract_state_series(&track).unwrap();
        assert_eq!(series.size[0], [4.5, 2.0, 1.5]);
        assert_eq!(series.width, vec![2.0, 2.0]);

        track.length = Some(5.0);
        track.width = Some(2.2);
        track.height = Some(1.8);
        let series = extract_state_series(&track).unwrap();
        assert_eq!(series.size[1], [5.0, 2.2, 1.8]);
        assert_eq!(series.height, vec![1.8, 1.8]);
    }

    #[test]
    fn test_empty_states_yield_none() {
        assert!(extract_state_series(&RawTrack::default()).is_none());
    }

    #[test]
    fn test_object_type_codes() {
        assert_eq!(object_type(Some(1)), ObjectType::Vehicle);
        assert_eq!(object_type(Some(2)), ObjectType::Pedestrian);
        assert_eq!(object_type(Some(3)), ObjectType::Cyclist);
        assert_eq!(object_type(Some(0)), ObjectType::Other);
        assert_eq!(object_type(Some(4)), ObjectType::Other);
        assert_eq!(object_type(None), ObjectType::Other);
    }

    #[test]
    fn test_lane_polyline() {
        let mut f = feature(3);
        f.lane = Some(RawGeometry {
            polyline: vec![point(1.0, 2.0), point(3.0, 4.0)],
            ..Default::default()
        });
        let out = extract_map_feature(&f).unwrap();
        assert_eq!(out.id, "3");
        assert_eq!(out.feature_type, MapFeatureType::LaneSurfaceStreet);
        assert_eq!(
            out.geometry,
            Geometry::Polyline(vec![[1.0, 2.0], [3.0, 4.0]])
        );
    }

    #[test]
    fn test_crosswalk_and_driveway_use_polygon() {
        let mut f = feature(4);
        f.crosswalk = Some(RawGeometry {
            polyline: vec![point(9.0, 9.0)],
            polygon: vec![point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0)],
        });
        let out = extract_map_feature(&f).unwrap();
        assert_eq!(out.feature_type, MapFeatureType::Crosswalk);
        assert!(matches!(out.geometry, Geometry::Polygon(ref pts) if pts.len() == 3));

        let mut f = feature(5);
        f.driveway = Some(RawGeometry {
            polygon: vec![point(0.0, 0.0)],
            ..Default::default()
        });
        let out = extract_map_feature(&f).unwrap();
        assert_eq!(out.feature_type, MapFeatureType::Driveway);
    }

    #[test]
    fn test_empty_lane_is_dropped_even_with_other_sources() {
        let mut f = feature(6);
        f.lane = Some(RawGeometry::default());
        f.road_edge = Some(RawGeometry {
            polyline: vec![point(1.0, 1.0)],
            ..Default::default()
        });
        assert!(extract_map_feature(&f).is_none());
    }

    #[test]
    fn test_priority_order() {
        let mut f = feature(7);
        f.road_edge = Some(RawGeometry {
            polyline: vec![point(1.0, 1.0)],
            ..Default::default()
        });
        f.road_line = Some(RawGeometry {
            polyline: vec![point(2.0, 2.0)],
            ..Default::default()
        });
        let out = extract_map_feature(&f).unwrap();
        assert_eq!(out.feature_type, MapFeatureType::LineUnknown);
        assert_eq!(out.geometry.points(), &[[2.0, 2.0]]);
    }

    #[test]
    fn test_feature_without_source_or_id_is_dropped() {
        assert!(extract_map_feature(&feature(8)).is_none());

        let f = RawMapFeature {
            lane: Some(RawGeometry {
                polyline: vec![point(1.0, 1.0)],
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(extract_map_feature(&f).is_none());
    }
}
