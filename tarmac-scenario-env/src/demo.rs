//! Expert demonstrations for behavior cloning.
use crate::{
    error::EnvError, provider::ScenarioProvider, simulator::ScenarioSimulator, DriveAction,
    ScenarioEnv,
};
use anyhow::Result;
use tarmac_core::{record::Recorder, util::run_episodes, Policy};

/// Weight of the behavior cloning loss.
pub const DEFAULT_BC_COEF: f32 = 0.5;

/// Observations paired with the expert action at the same state.
#[derive(Debug, Clone)]
pub struct DemoBuffer<O> {
    obs: Vec<O>,
    expert_actions: Vec<DriveAction>,
}

impl<O> Default for DemoBuffer<O> {
    fn default() -> Self {
        Self {
            obs: vec![],
            expert_actions: vec![],
        }
    }
}

impl<O> DemoBuffer<O> {
    pub fn push(&mut self, obs: O, expert_action: DriveAction) {
        self.obs.push(obs);
        self.expert_actions.push(expert_action);
    }

    pub fn len(&self) -> usize {
        self.obs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obs.is_empty()
    }

    pub fn obs(&self) -> &[O] {
        &self.obs
    }

    pub fn expert_actions(&self) -> &[DriveAction] {
        &self.expert_actions
    }

    pub fn iter(&self) -> impl Iterator<Item = (&O, &DriveAction)> {
        self.obs.iter().zip(self.expert_actions.iter())
    }
}

/// Runs `n_episodes` episodes with `policy` and collects expert demonstrations.
///
/// Records of the steps are written to `recorder` as [`eval_with_recorder`]
/// does.
///
/// [`eval_with_recorder`]: tarmac_core::util::eval_with_recorder
pub fn collect_demonstrations<S, P, Pol, R>(
    env: &mut ScenarioEnv<S, P>,
    policy: &mut Pol,
    n_episodes: usize,
    recorder: &mut R,
) -> Result<DemoBuffer<S::Obs>>
where
    S: ScenarioSimulator,
    P: ScenarioProvider,
    Pol: Policy<ScenarioEnv<S, P>>,
    R: Recorder,
{
    let mut buffer = DemoBuffer::default();
    run_episodes(env, policy, n_episodes, |step, record| {
        recorder.write(record);
        buffer.push(step.obs.clone(), step.info.expert_action);
    })?;
    Ok(buffer)
}

/// `bc_coef` times the mean squared error between predicted and expert
/// actions, averaged over steering and throttle.
pub fn behavior_cloning_loss(
    pred: &[DriveAction],
    expert: &[DriveAction],
    bc_coef: f32,
) -> Result<f32> {
    if pred.len() != expert.len() {
        return Err(EnvError::LengthMismatch(pred.len(), expert.len()).into());
    }
    if pred.is_empty() {
        return Ok(0.0);
    }

    let sum = pred
        .iter()
        .zip(expert.iter())
        .map(|(p, e)| (p.steering - e.steering).powi(2) + (p.throttle - e.throttle).powi(2))
        .sum::<f32>();
    Ok(bc_coef * sum / (2 * pred.len()) as f32)
}
