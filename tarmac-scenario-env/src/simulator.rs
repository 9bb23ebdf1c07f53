//! Interface of scenario-driving simulators.
use crate::{expert::Pose, DriveAction, SimulatorConfig};
use anyhow::Result;
use tarmac_convert::ScenarioRecord;
use tarmac_core::Obs;

/// Outcome of a simulator step.
#[derive(Debug, Clone)]
pub struct SimStep<O> {
    pub obs: O,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
}

/// A simulator that replays one injected scenario at a time.
///
/// Scenario data enters a simulator only through
/// [`ScenarioSimulator::inject_scenario`]; the simulator never reads the data
/// directory by itself.
pub trait ScenarioSimulator {
    /// Observation of the ego vehicle.
    type Obs: Obs;

    /// Builds the simulator.
    fn build(config: &SimulatorConfig) -> Result<Self>
    where
        Self: Sized;

    /// Returns `true` once the engine has been initialized.
    fn is_engine_initialized(&self) -> bool;

    /// Initializes the engine.
    fn init_engine(&mut self) -> Result<()>;

    /// Replaces the scenario played by the next reset.
    fn inject_scenario(&mut self, record: ScenarioRecord, filename: &str) -> Result<()>;

    /// Starts an episode of the injected scenario.
    fn reset(&mut self, seed: i64) -> Result<Self::Obs>;

    /// Advances the simulation by one step.
    fn step(&mut self, act: &DriveAction) -> Result<SimStep<Self::Obs>>;

    /// Reference path of the ego vehicle, possibly empty.
    fn sdc_route(&self) -> Result<Vec<[f32; 2]>>;

    /// Current pose of the ego vehicle.
    fn sdc_pose(&self) -> Result<Pose>;
}
