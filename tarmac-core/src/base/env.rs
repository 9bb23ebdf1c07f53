//! Environment.
use super::{Act, Info, Obs, Step};
use crate::record::Record;
use anyhow::Result;

/// Represents an environment, typically an MDP.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    ///
    /// The seed is consumed by the first call of [`Env::reset`].
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Performes an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized;

    /// Resets the environment if `is_done[0] == 1` or `is_done.is_none()`.
    ///
    /// Vectorized environments are not supported and `is_done.len()` is expected to be 1.
    fn reset(&mut self, is_done: Option<&Vec<i8>>) -> Result<Self::Obs>;

    /// Performes an environment step and resets the environment if an episode ends.
    ///
    /// The observation after the reset is stored in [`Step::init_obs`].
    fn step_with_reset(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized;

    /// Resets the environment with a given index.
    ///
    /// The index is used in an arbitrary way. The scenario environment uses it
    /// as the seed that selects the scenario file, which makes evaluation runs
    /// reproducible.
    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs>;
}
