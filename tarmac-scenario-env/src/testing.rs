//! Scenario fixtures for tests.
use anyhow::Result;
use std::path::Path;
use tarmac_convert::{
    NamingPolicy, RawScenario, ScenarioAssembler, ScenarioRecord, ScenarioWriter,
};

/// A scenario whose SDC drives along the x axis at 10 m/s, 1 m per step.
pub fn straight_record(scenario_id: &str, n_steps: usize) -> ScenarioRecord {
    let states = (0..n_steps)
        .map(|i| serde_json::json!({"center_x": i as f64, "velocity_x": 10.0, "valid": true}))
        .collect::<Vec<_>>();
    let timestamps = (0..n_steps).map(|i| i as f64 * 0.1).collect::<Vec<_>>();
    let raw: RawScenario = serde_json::from_value(serde_json::json!({
        "scenario_id": scenario_id,
        "timestamps_seconds": timestamps,
        "sdc_track_index": 0,
        "tracks": [{"id": 1, "object_type": 1, "states": states}]
    }))
    .unwrap();
    ScenarioAssembler::default()
        .assemble(&raw, "fixture.jsonl", 0)
        .unwrap()
}

/// Writes one 5-step scenario per id into `dir`.
pub fn write_scenarios(dir: &Path, ids: &[&str]) -> Result<()> {
    let writer = ScenarioWriter::new(dir, NamingPolicy::ScenarioId)?;
    for (ix, id) in ids.iter().enumerate() {
        writer.write(&straight_record(id, 5), ix)?;
    }
    Ok(())
}
