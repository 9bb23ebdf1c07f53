//! Scenario-driving environment fed with converted Waymo scenarios.
//!
//! [`ScenarioEnv`] implements [`tarmac_core::Env`]. At every reset it selects
//! a scenario file from the seed, loads it through a [`ScenarioProvider`] and
//! injects it into a [`ScenarioSimulator`]. Each step carries the action of
//! the [`ExpertController`] as a demonstration for behavior cloning.
//!
//! Two simulators are available:
//!
//! * [`LogReplaySim`] replays the logged trajectory of the ego vehicle.
//! * `MetaDriveSim` drives MetaDrive through Python, with feature `metadrive`.
//!
//! ```no_run
//! use tarmac_core::Env as _;
//! use tarmac_scenario_env::{
//!     DriveAction, LogReplaySim, ScenarioEnv, ScenarioEnvConfig, SimulatorConfig,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ScenarioEnvConfig::default()
//!     .simulator(SimulatorConfig::default().data_directory("/data/scenarios"));
//! let mut env = ScenarioEnv::<LogReplaySim>::build(&config, 0)?;
//! env.reset(None)?;
//! let (step, _record) = env.step(&DriveAction::zero())?;
//! println!("{:?}", step.info.expert_action);
//! # Ok(())
//! # }
//! ```
mod act;
mod base;
mod config;
mod demo;
mod error;
pub mod expert;
#[cfg(feature = "metadrive")]
mod metadrive;
mod obs;
pub mod provider;
mod replay;
pub mod simulator;
#[cfg(test)]
mod testing;

pub use act::DriveAction;
pub use base::{select_index, ScenarioEnv, ScenarioInfo, ScenarioStatus};
pub use config::{LidarConfig, ScenarioEnvConfig, SimulatorConfig, VehicleConfig};
pub use demo::{behavior_cloning_loss, collect_demonstrations, DemoBuffer, DEFAULT_BC_COEF};
pub use error::EnvError;
pub use expert::{normalize_angle, ExpertController, Pose};
#[cfg(feature = "metadrive")]
pub use metadrive::{MetaDriveSim, INJECTED_FIELDS};
pub use obs::ScenarioObs;
pub use provider::{DirectoryProvider, ScenarioProvider};
pub use replay::LogReplaySim;
pub use simulator::{ScenarioSimulator, SimStep};
