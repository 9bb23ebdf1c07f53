//! Errors in the scenario environment.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("No scenario files found in {0}")]
    NoScenarioFiles(PathBuf),

    #[error("No scenario has been injected")]
    NoScenario,

    #[error("Scenario {0} has no track for its SDC")]
    MissingSdcTrack(String),

    #[error("Behavior cloning expects as many predictions as expert actions, got {0} and {1}")]
    LengthMismatch(usize, usize),
}
