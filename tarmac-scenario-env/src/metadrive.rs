//! MetaDrive `ScenarioEnv` driven through Python.
//!
//! The engine keeps a single scenario slot. Each injection replaces the
//! fields of the engine data manager listed in [`INJECTED_FIELDS`], so the
//! engine never scans the data directory for the scenario it plays.
use crate::{
    expert::Pose,
    simulator::{ScenarioSimulator, SimStep},
    DriveAction, ScenarioObs, SimulatorConfig,
};
use anyhow::Result;
use log::info;
use pyo3::{
    types::{IntoPyDict, PyBytes, PyModule},
    PyObject, Python, ToPyObject,
};
use serde_pickle::SerOptions;
use tarmac_convert::ScenarioRecord;

/// Fields of the engine data manager overwritten at injection.
pub const INJECTED_FIELDS: [&str; 3] = ["_scenarios", "summary_lookup", "summary_dict"];

const HELPER: &str = r#"
import json
import pickle

import numpy as np

INJECTED_FIELDS = ("_scenarios", "summary_lookup", "summary_dict")


def make_env(config_json):
    from metadrive.envs.scenario_env import ScenarioEnv
    return ScenarioEnv(json.loads(config_json))


def is_engine_initialized(env):
    try:
        return env.engine is not None
    except Exception:
        return False


def init_engine(env):
    env.lazy_init()


def _to_arrays(scenario):
    from metadrive.scenario.scenario_description import ScenarioDescription

    for track in scenario["tracks"].values():
        track["state"] = {k: np.asarray(v, dtype=np.float32) for k, v in track["state"].items()}
    for feature in scenario["map_features"].values():
        for key in ("polyline", "polygon"):
            if key in feature:
                feature[key] = np.asarray(feature[key], dtype=np.float32)
    scenario["ts"] = np.asarray(scenario["ts"], dtype=np.float32)
    scenario["metadata"]["ts"] = scenario["ts"]
    return ScenarioDescription(scenario)


def inject(env, data, filename):
    scenario = _to_arrays(pickle.loads(data))
    index = env.config["start_scenario_index"]
    manager = env.engine.data_manager
    manager._scenarios = {index: scenario}
    manager.summary_lookup = [filename]
    manager.summary_dict = {
        filename: {
            "id": scenario["id"],
            "filename": filename,
            "length": scenario["length"],
            "object_summary": {},
        }
    }


def reset(env):
    obs, _ = env.reset(seed=env.config["start_scenario_index"])
    return np.asarray(obs, dtype=np.float32).tolist()


def step(env, steering, throttle):
    obs, reward, terminated, truncated, _ = env.step([steering, throttle])
    return (
        np.asarray(obs, dtype=np.float32).tolist(),
        float(reward),
        bool(terminated),
        bool(truncated),
    )


def sdc_route(env):
    route = env.engine.map_manager.current_sdc_route
    if route is None:
        return []
    points = route.get_polyline() if hasattr(route, "get_polyline") else route
    return [(float(p[0]), float(p[1])) for p in points]


def sdc_pose(env):
    vehicle = env.agent
    return (
        float(vehicle.position[0]),
        float(vehicle.position[1]),
        float(vehicle.heading_theta),
    )


def missing_fields():
    import inspect
    from metadrive.manager.scenario_data_manager import ScenarioDataManager

    source = inspect.getsource(ScenarioDataManager)
    return [f for f in INJECTED_FIELDS if "self." + f not in source]
"#;

fn helper(py: Python) -> Result<PyObject> {
    // sys.argv may be empty in an embedded interpreter.
    let locals = [("sys", py.import("sys")?)].into_py_dict(py);
    py.eval("sys.argv.insert(0, 'tarmac')", None, Some(locals))?;
    let module = PyModule::from_code(py, HELPER, "tarmac_metadrive.py", "tarmac_metadrive")?;
    Ok(module.to_object(py))
}

/// A [`ScenarioSimulator`] backed by MetaDrive.
pub struct MetaDriveSim {
    helper: PyObject,
    env: PyObject,
    engine_initialized: bool,
}

impl MetaDriveSim {
    fn call1<A>(&self, name: &str, args: A) -> Result<PyObject>
    where
        A: pyo3::IntoPy<pyo3::Py<pyo3::types::PyTuple>>,
    {
        Python::with_gil(|py| {
            let ret = self.helper.as_ref(py).getattr(name)?.call1(args)?;
            Ok(ret.to_object(py))
        })
    }

    /// Field names of [`INJECTED_FIELDS`] that the installed MetaDrive does
    /// not define.
    pub fn missing_injected_fields() -> Result<Vec<String>> {
        Python::with_gil(|py| {
            let helper = helper(py)?;
            let ret = helper.as_ref(py).getattr("missing_fields")?.call0()?;
            Ok(ret.extract()?)
        })
    }
}

impl ScenarioSimulator for MetaDriveSim {
    type Obs = ScenarioObs;

    fn build(config: &SimulatorConfig) -> Result<Self> {
        let config_json = serde_json::to_string(config)?;
        Python::with_gil(|py| {
            info!("Initialize MetaDriveSim");
            let helper = helper(py)?;
            let env = helper
                .as_ref(py)
                .getattr("make_env")?
                .call1((config_json,))?
                .to_object(py);
            Ok(Self {
                helper,
                env,
                engine_initialized: false,
            })
        })
    }

    fn is_engine_initialized(&self) -> bool {
        if self.engine_initialized {
            return true;
        }
        Python::with_gil(|py| {
            self.call1("is_engine_initialized", (self.env.clone_ref(py),))
                .and_then(|ret| Ok(ret.extract::<bool>(py)?))
                .unwrap_or(false)
        })
    }

    fn init_engine(&mut self) -> Result<()> {
        let env = Python::with_gil(|py| self.env.clone_ref(py));
        self.call1("init_engine", (env,))?;
        self.engine_initialized = true;
        Ok(())
    }

    fn inject_scenario(&mut self, record: ScenarioRecord, filename: &str) -> Result<()> {
        let bytes = serde_pickle::to_vec(&record, SerOptions::new())?;
        Python::with_gil(|py| {
            let data = PyBytes::new(py, &bytes);
            self.helper
                .as_ref(py)
                .getattr("inject")?
                .call1((self.env.as_ref(py), data, filename))?;
            Ok(())
        })
    }

    fn reset(&mut self, _seed: i64) -> Result<ScenarioObs> {
        Python::with_gil(|py| {
            let ret = self.call1("reset", (self.env.clone_ref(py),))?;
            Ok(ScenarioObs(ret.extract(py)?))
        })
    }

    fn step(&mut self, act: &DriveAction) -> Result<SimStep<ScenarioObs>> {
        Python::with_gil(|py| {
            let ret = self.call1("step", (self.env.clone_ref(py), act.steering, act.throttle))?;
            let (obs, reward, terminated, truncated): (Vec<f32>, f32, bool, bool) =
                ret.extract(py)?;
            Ok(SimStep {
                obs: ScenarioObs(obs),
                reward,
                terminated,
                truncated,
            })
        })
    }

    fn sdc_route(&self) -> Result<Vec<[f32; 2]>> {
        Python::with_gil(|py| {
            let ret = self.call1("sdc_route", (self.env.clone_ref(py),))?;
            let points: Vec<(f32, f32)> = ret.extract(py)?;
            Ok(points.into_iter().map(|(x, y)| [x, y]).collect())
        })
    }

    fn sdc_pose(&self) -> Result<Pose> {
        Python::with_gil(|py| {
            let ret = self.call1("sdc_pose", (self.env.clone_ref(py),))?;
            let (x, y, heading): (f32, f32, f32) = ret.extract(py)?;
            Ok(Pose { x, y, heading })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "requires MetaDrive installed in the Python environment"]
    fn test_injected_fields_exist() -> Result<()> {
        let missing = MetaDriveSim::missing_injected_fields()?;
        assert!(missing.is_empty(), "missing fields: {:?}", missing);
        Ok(())
    }

    #[test]
    fn test_helper_lists_the_same_fields() {
        for field in INJECTED_FIELDS.iter() {
            assert!(HELPER.contains(&format!("\"{}\"", field)));
        }
    }
}
