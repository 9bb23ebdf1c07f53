//! Simulator replaying the logged trajectory of the ego vehicle.
use crate::{
    error::EnvError,
    expert::Pose,
    simulator::{ScenarioSimulator, SimStep},
    DriveAction, ScenarioObs, SimulatorConfig,
};
use anyhow::Result;
use log::trace;
use tarmac_convert::StateSeries;

/// A [`ScenarioSimulator`] without physics.
///
/// The ego vehicle follows its logged track whatever the action. The
/// observation is `[x, y, heading, vx, vy]` and the reward is always 0. An
/// episode terminates at the end of the log and is truncated at the horizon.
#[derive(Debug, Clone)]
pub struct LogReplaySim {
    horizon: Option<usize>,
    engine_initialized: bool,
    sdc: Option<StateSeries>,
    scenario_file: Option<String>,
    t: usize,
}

impl LogReplaySim {
    /// File name of the injected scenario.
    pub fn scenario_file(&self) -> Option<&str> {
        self.scenario_file.as_deref()
    }

    fn sdc(&self) -> Result<&StateSeries> {
        Ok(self.sdc.as_ref().ok_or(EnvError::NoScenario)?)
    }

    fn obs(&self) -> Result<ScenarioObs> {
        let sdc = self.sdc()?;
        let p = sdc.position[self.t];
        let v = sdc.velocity[self.t];
        Ok(ScenarioObs(vec![p[0], p[1], sdc.heading[self.t], v[0], v[1]]))
    }
}

impl ScenarioSimulator for LogReplaySim {
    type Obs = ScenarioObs;

    fn build(config: &SimulatorConfig) -> Result<Self> {
        Ok(Self {
            horizon: config.horizon,
            engine_initialized: false,
            sdc: None,
            scenario_file: None,
            t: 0,
        })
    }

    fn is_engine_initialized(&self) -> bool {
        self.engine_initialized
    }

    fn init_engine(&mut self) -> Result<()> {
        self.engine_initialized = true;
        Ok(())
    }

    fn inject_scenario(
        &mut self,
        record: tarmac_convert::ScenarioRecord,
        filename: &str,
    ) -> Result<()> {
        let sdc = record
            .sdc_track()
            .ok_or_else(|| EnvError::MissingSdcTrack(record.id.clone()))?;
        if sdc.state.is_empty() {
            return Err(EnvError::MissingSdcTrack(record.id.clone()).into());
        }
        self.sdc = Some(sdc.state.clone());
        self.scenario_file = Some(filename.to_string());
        Ok(())
    }

    fn reset(&mut self, seed: i64) -> Result<ScenarioObs> {
        trace!("LogReplaySim::reset(seed = {})", seed);
        self.t = 0;
        self.obs()
    }

    fn step(&mut self, _act: &DriveAction) -> Result<SimStep<ScenarioObs>> {
        let last = self.sdc()?.len() - 1;
        self.t = (self.t + 1).min(last);
        let terminated = self.t == last;
        let truncated = !terminated && self.horizon.map(|h| self.t >= h).unwrap_or(false);
        Ok(SimStep {
            obs: self.obs()?,
            reward: 0.0,
            terminated,
            truncated,
        })
    }

    fn sdc_route(&self) -> Result<Vec<[f32; 2]>> {
        let sdc = self.sdc()?;
        Ok(sdc.position[self.t + 1..]
            .iter()
            .map(|p| [p[0], p[1]])
            .collect())
    }

    fn sdc_pose(&self) -> Result<Pose> {
        let sdc = self.sdc()?;
        let p = sdc.position[self.t];
        Ok(Pose {
            x: p[0],
            y: p[1],
            heading: sdc.heading[self.t],
        })
    }
}
