//! Configuration of the scenario environment.
use crate::expert::ExpertController;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Lidar of the ego vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LidarConfig {
    pub num_lasers: usize,
    pub distance: f32,
    pub num_others: usize,
}

impl Default for LidarConfig {
    fn default() -> Self {
        Self {
            num_lasers: 60,
            distance: 50.0,
            num_others: 0,
        }
    }
}

/// Ego vehicle options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleConfig {
    pub lidar: LidarConfig,
    pub show_lidar: bool,
    pub show_navi_mark: bool,
    pub show_dest_mark: bool,
}

/// Options forwarded to the simulator.
///
/// Field names follow the simulator's configuration keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Directory of scenario files.
    pub data_directory: PathBuf,

    /// Number of scenarios the simulator loads by itself.
    pub num_scenarios: usize,

    /// Maximum number of steps in an episode.
    pub horizon: Option<usize>,

    pub use_render: bool,

    pub start_scenario_index: usize,

    pub vehicle_config: VehicleConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("scenarios"),
            num_scenarios: 1,
            horizon: Some(500),
            use_render: false,
            start_scenario_index: 0,
            vehicle_config: VehicleConfig::default(),
        }
    }
}

impl SimulatorConfig {
    /// Sets the directory of scenario files.
    pub fn data_directory(mut self, v: impl Into<PathBuf>) -> Self {
        self.data_directory = v.into();
        self
    }

    /// Sets the number of scenarios.
    pub fn num_scenarios(mut self, v: usize) -> Self {
        self.num_scenarios = v;
        self
    }

    /// Sets the horizon.
    pub fn horizon(mut self, v: Option<usize>) -> Self {
        self.horizon = v;
        self
    }

    /// Enables rendering.
    pub fn use_render(mut self, v: bool) -> Self {
        self.use_render = v;
        self
    }

    /// Sets the lidar of the ego vehicle.
    pub fn lidar(mut self, v: LidarConfig) -> Self {
        self.vehicle_config.lidar = v;
        self
    }
}

/// Configuration of [`ScenarioEnv`](crate::ScenarioEnv).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioEnvConfig {
    pub simulator: SimulatorConfig,
    pub expert: ExpertController,
}

impl ScenarioEnvConfig {
    /// Sets the simulator configuration.
    pub fn simulator(mut self, v: SimulatorConfig) -> Self {
        self.simulator = v;
        self
    }

    /// Sets the expert controller.
    pub fn expert(mut self, v: ExpertController) -> Self {
        self.expert = v;
        self
    }

    /// Constructs [`ScenarioEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ScenarioEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
