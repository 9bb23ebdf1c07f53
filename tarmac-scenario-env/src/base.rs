//! Environment adapter feeding scenario files to a simulator.
use crate::{
    provider::{DirectoryProvider, ScenarioProvider},
    simulator::ScenarioSimulator,
    DriveAction, ExpertController, ScenarioEnvConfig,
};
use anyhow::{anyhow, Result};
use log::{info, trace, warn};
use tarmac_core::{
    record::{Record, RecordValue},
    Env, Info, Step,
};

/// Selects the scenario played after a reset with `seed`.
pub fn select_index(seed: i64, count: usize) -> usize {
    debug_assert!(count > 0);
    seed.rem_euclid(count as i64) as usize
}

/// Scenario currently injected in the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioStatus {
    /// Nothing has been injected yet.
    Empty,

    /// The scenario selected by the last reset.
    Fresh { file: String },

    /// The scenario selected by the last reset could not be loaded or
    /// injected, `file` is the one still in place.
    Stale { file: Option<String>, error: String },
}

impl ScenarioStatus {
    pub fn is_stale(&self) -> bool {
        matches!(self, ScenarioStatus::Stale { .. })
    }

    /// File of the scenario in place.
    pub fn file(&self) -> Option<&str> {
        match self {
            ScenarioStatus::Empty => None,
            ScenarioStatus::Fresh { file } => Some(file),
            ScenarioStatus::Stale { file, .. } => file.as_deref(),
        }
    }
}

/// Information given at every step.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioInfo {
    /// Action of the expert heuristic at the new state.
    pub expert_action: DriveAction,

    /// File of the scenario being played.
    pub scenario_file: Option<String>,

    /// The last reset could not load its scenario.
    pub stale_scenario: bool,
}

impl Info for ScenarioInfo {}

/// An environment that plays one scenario file per episode.
///
/// At every reset a scenario is selected from the seed, loaded from the
/// provider and injected into the simulator.
pub struct ScenarioEnv<S, P = DirectoryProvider>
where
    S: ScenarioSimulator,
    P: ScenarioProvider,
{
    sim: S,
    provider: P,
    expert: ExpertController,
    status: ScenarioStatus,

    /// Seed used by the next reset.
    pending_seed: Option<i64>,

    count_steps: usize,
    last_obs: Option<S::Obs>,
}

impl<S, P> ScenarioEnv<S, P>
where
    S: ScenarioSimulator,
    P: ScenarioProvider,
{
    /// Builds the environment with a given provider.
    ///
    /// The simulator is told to hold a single scenario, the one injected at
    /// each reset.
    pub fn with_provider(config: &ScenarioEnvConfig, provider: P, seed: i64) -> Result<Self> {
        let sim_config = config.simulator.clone().num_scenarios(1);
        let sim = S::build(&sim_config)?;
        Ok(Self {
            sim,
            provider,
            expert: config.expert.clone(),
            status: ScenarioStatus::Empty,
            pending_seed: Some(seed),
            count_steps: 0,
            last_obs: None,
        })
    }

    pub fn scenario_status(&self) -> &ScenarioStatus {
        &self.status
    }

    pub fn simulator(&self) -> &S {
        &self.sim
    }

    /// Expert action at the current state, zero if it cannot be computed.
    pub fn expert_action(&self) -> DriveAction {
        let target = match self.sim.sdc_route() {
            Ok(route) => route.last().copied(),
            Err(e) => {
                trace!("No route: {}", e);
                None
            }
        };
        match (target, self.sim.sdc_pose()) {
            (Some(target), Ok(pose)) => self.expert.action(&pose, target),
            _ => DriveAction::zero(),
        }
    }

    fn load_scenario(&mut self, seed: i64) -> Result<()> {
        let ix = select_index(seed, self.provider.len());
        let file = self.provider.filename(ix).to_string();
        let loaded = self.provider.load(ix);

        if !self.sim.is_engine_initialized() {
            info!("Initialize simulator engine");
            self.sim.init_engine()?;
        }

        let injected = loaded.and_then(|record| {
            trace!("Inject {} (seed = {})", file, seed);
            self.sim.inject_scenario(record, &file)
        });
        match injected {
            Ok(()) => self.status = ScenarioStatus::Fresh { file },
            Err(e) => {
                let error = format!("{:#}", e);
                warn!("Failed to load or inject {}, keeping the previous scenario: {}", file, error);
                let file = self.status.file().map(String::from);
                self.status = ScenarioStatus::Stale { file, error };
            }
        }
        Ok(())
    }

    fn reset_scenario(&mut self) -> Result<S::Obs> {
        let seed = self
            .pending_seed
            .take()
            .unwrap_or_else(|| fastrand::u32(..) as i64);
        self.load_scenario(seed)?;
        let obs = self.sim.reset(seed)?;
        self.count_steps = 0;
        self.last_obs = Some(obs.clone());
        Ok(obs)
    }
}

impl<S, P> Env for ScenarioEnv<S, P>
where
    S: ScenarioSimulator,
    P: ScenarioProvider,
{
    type Config = ScenarioEnvConfig;
    type Obs = S::Obs;
    type Act = DriveAction;
    type Info = ScenarioInfo;

    /// Scans the scenarios and builds the simulator.
    ///
    /// * `seed` - Selects the scenario of the first reset.
    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let provider = P::open(&config.simulator)?;
        Self::with_provider(config, provider, seed)
    }

    fn step(&mut self, a: &DriveAction) -> Result<(Step<Self>, Record)> {
        trace!("ScenarioEnv::step({:?})", a);
        let sim_step = self.sim.step(a)?;
        self.count_steps += 1;

        let expert_action = self.expert_action();
        let mut record = Record::from_slice(&[(
            "expert_action",
            RecordValue::Array1(expert_action.to_vec()),
        )]);
        if let Some(file) = self.status.file() {
            record.insert("scenario_file", RecordValue::String(file.to_string()));
        }
        if sim_step.terminated || sim_step.truncated {
            record = record.merge(Record::from_scalar(
                "episode_length",
                self.count_steps as f32,
            ));
        }

        let info = ScenarioInfo {
            expert_action,
            scenario_file: self.status.file().map(String::from),
            stale_scenario: self.status.is_stale(),
        };
        self.last_obs = Some(sim_step.obs.clone());
        let step = Step::new(
            sim_step.obs,
            *a,
            vec![sim_step.reward],
            vec![sim_step.terminated as i8],
            vec![sim_step.truncated as i8],
            info,
            None,
        );

        Ok((step, record))
    }

    /// Resets the environment if `is_done[0] == 1` or `is_done` is `None`.
    ///
    /// Otherwise the last observation is returned.
    fn reset(&mut self, is_done: Option<&Vec<i8>>) -> Result<S::Obs> {
        let reset = match is_done {
            None => true,
            Some(v) => {
                debug_assert_eq!(v.len(), 1);
                v[0] != 0
            }
        };

        if reset {
            self.reset_scenario()
        } else {
            self.last_obs
                .clone()
                .ok_or_else(|| anyhow!("The environment has not been reset"))
        }
    }

    fn step_with_reset(&mut self, a: &DriveAction) -> Result<(Step<Self>, Record)> {
        let (mut step, record) = self.step(a)?;
        if step.is_done() {
            step.init_obs = Some(self.reset(None)?);
        }
        Ok((step, record))
    }

    /// Resets the environment with `ix` as the seed.
    fn reset_with_index(&mut self, ix: usize) -> Result<S::Obs> {
        self.pending_seed = Some(ix as i64);
        self.reset(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expert::Pose, simulator::SimStep, testing::write_scenarios, ScenarioObs, SimulatorConfig,
    };
    use std::fs;
    use tarmac_convert::ScenarioRecord;
    use tempdir::TempDir;

    /// Records what is injected and replays nothing.
    struct MockSim {
        engine: bool,
        injected: Vec<String>,
        seeds: Vec<i64>,
        route: Vec<[f32; 2]>,

        /// Id of a scenario the simulator refuses.
        reject: Option<String>,
    }

    impl ScenarioSimulator for MockSim {
        type Obs = ScenarioObs;

        fn build(config: &SimulatorConfig) -> Result<Self> {
            assert_eq!(config.num_scenarios, 1);
            Ok(Self {
                engine: false,
                injected: vec![],
                seeds: vec![],
                route: vec![],
                reject: None,
            })
        }

        fn is_engine_initialized(&self) -> bool {
            self.engine
        }

        fn init_engine(&mut self) -> Result<()> {
            assert!(!self.engine);
            self.engine = true;
            Ok(())
        }

        fn inject_scenario(&mut self, record: ScenarioRecord, filename: &str) -> Result<()> {
            assert!(self.engine);
            assert_eq!(filename, format!("sd_waymo_{}.pkl", record.id));
            if self.reject.as_deref() == Some(record.id.as_str()) {
                anyhow::bail!("scenario {} has no SDC route", record.id);
            }
            self.injected.push(filename.to_string());
            Ok(())
        }

        fn reset(&mut self, seed: i64) -> Result<ScenarioObs> {
            self.seeds.push(seed);
            Ok(ScenarioObs(vec![0.0]))
        }

        fn step(&mut self, _act: &DriveAction) -> Result<SimStep<ScenarioObs>> {
            Ok(SimStep {
                obs: ScenarioObs(vec![1.0]),
                reward: 1.0,
                terminated: true,
                truncated: false,
            })
        }

        fn sdc_route(&self) -> Result<Vec<[f32; 2]>> {
            Ok(self.route.clone())
        }

        fn sdc_pose(&self) -> Result<Pose> {
            Ok(Pose::default())
        }
    }

    fn config(dir: &std::path::Path) -> ScenarioEnvConfig {
        ScenarioEnvConfig::default()
            .simulator(SimulatorConfig::default().data_directory(dir).num_scenarios(10))
    }

    #[test]
    fn test_select_index() {
        assert_eq!(select_index(0, 3), 0);
        assert_eq!(select_index(7, 3), 1);
        assert_eq!(select_index(-1, 3), 2);
        assert_eq!(select_index(i64::MAX, 1), 0);
    }

    #[test]
    fn test_same_seed_same_scenario() -> Result<()> {
        let dir = TempDir::new("scenario_env")?;
        write_scenarios(dir.path(), &["a", "b", "c"])?;

        let mut env1 = ScenarioEnv::<MockSim>::build(&config(dir.path()), 4)?;
        let mut env2 = ScenarioEnv::<MockSim>::build(&config(dir.path()), 4)?;
        env1.reset(None)?;
        env2.reset(None)?;
        assert_eq!(env1.simulator().injected, vec!["sd_waymo_b.pkl"]);
        assert_eq!(env1.simulator().injected, env2.simulator().injected);
        assert_eq!(env1.simulator().seeds, vec![4]);

        env1.reset_with_index(2)?;
        assert_eq!(env1.simulator().injected[1], "sd_waymo_c.pkl");
        assert_eq!(
            env1.scenario_status(),
            &ScenarioStatus::Fresh {
                file: "sd_waymo_c.pkl".to_string()
            }
        );

        // Unseeded resets still inject one of the files.
        env1.reset(None)?;
        assert_eq!(env1.simulator().injected.len(), 3);
        Ok(())
    }

    #[test]
    fn test_corrupt_file_keeps_previous_scenario() -> Result<()> {
        let dir = TempDir::new("scenario_env")?;
        write_scenarios(dir.path(), &["a", "b"])?;
        let mut env = ScenarioEnv::<MockSim>::build(&config(dir.path()), 0)?;
        env.reset(None)?;
        fs::write(dir.path().join("sd_waymo_b.pkl"), b"garbage")?;

        env.reset_with_index(1)?;
        assert_eq!(env.simulator().injected, vec!["sd_waymo_a.pkl"]);
        assert_eq!(env.simulator().seeds, vec![0, 1]);
        let status = env.scenario_status();
        assert!(status.is_stale());
        assert_eq!(status.file(), Some("sd_waymo_a.pkl"));

        let (step, record) = env.step(&DriveAction::zero())?;
        assert!(step.info.stale_scenario);
        assert_eq!(step.info.scenario_file.as_deref(), Some("sd_waymo_a.pkl"));
        assert_eq!(record.get_string("scenario_file")?, "sd_waymo_a.pkl");
        Ok(())
    }

    #[test]
    fn test_rejected_injection_keeps_previous_scenario() -> Result<()> {
        let dir = TempDir::new("scenario_env")?;
        write_scenarios(dir.path(), &["a", "b"])?;
        let mut env = ScenarioEnv::<MockSim>::build(&config(dir.path()), 0)?;
        env.reset(None)?;
        env.sim.reject = Some("b".to_string());

        env.reset_with_index(1)?;
        assert_eq!(env.simulator().injected, vec!["sd_waymo_a.pkl"]);
        assert_eq!(env.simulator().seeds, vec![0, 1]);
        match env.scenario_status() {
            ScenarioStatus::Stale { file, error } => {
                assert_eq!(file.as_deref(), Some("sd_waymo_a.pkl"));
                assert!(error.contains("no SDC route"));
            }
            status => panic!("unexpected status {:?}", status),
        }

        env.sim.reject = None;
        env.reset_with_index(1)?;
        assert_eq!(env.simulator().injected[1], "sd_waymo_b.pkl");
        assert!(!env.scenario_status().is_stale());
        Ok(())
    }

    #[test]
    fn test_expert_action_in_info_and_record() -> Result<()> {
        let dir = TempDir::new("scenario_env")?;
        write_scenarios(dir.path(), &["a"])?;
        let mut env = ScenarioEnv::<MockSim>::build(&config(dir.path()), 0)?;
        env.reset(None)?;

        // No route.
        let (step, record) = env.step(&DriveAction::zero())?;
        assert_eq!(step.info.expert_action, DriveAction::zero());
        assert_eq!(record.get_array1("expert_action")?, vec![0.0, 0.0]);
        assert_eq!(record.get_scalar("episode_length")?, 1.0);

        env.sim.route = vec![[5.0, 5.0], [10.0, 0.0]];
        let (step, record) = env.step(&DriveAction::zero())?;
        assert_eq!(step.info.expert_action, DriveAction::new(0.0, 0.6));
        assert_eq!(record.get_array1("expert_action")?, vec![0.0, 0.6]);
        assert!(!step.info.stale_scenario);
        Ok(())
    }

    #[test]
    fn test_step_with_reset() -> Result<()> {
        let dir = TempDir::new("scenario_env")?;
        write_scenarios(dir.path(), &["a", "b"])?;
        let mut env = ScenarioEnv::<MockSim>::build(&config(dir.path()), 0)?;
        env.reset(None)?;
        assert_eq!(env.reset(Some(&vec![0]))?, ScenarioObs(vec![0.0]));

        let (step, _) = env.step_with_reset(&DriveAction::zero())?;
        assert!(step.is_done());
        assert_eq!(step.init_obs, Some(ScenarioObs(vec![0.0])));
        assert_eq!(env.simulator().injected.len(), 2);
        Ok(())
    }

    #[test]
    fn test_empty_directory_is_fatal() -> Result<()> {
        let dir = TempDir::new("scenario_env")?;
        assert!(ScenarioEnv::<MockSim>::build(&config(dir.path()), 0).is_err());
        Ok(())
    }
}
