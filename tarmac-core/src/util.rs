//! Utilities for interaction of agents and environments.
use crate::{
    record::{Record, RecordValue, Recorder},
    Env, Policy, Step,
};
use anyhow::Result;

/// Runs episodes with a policy and hands every step to `on_step`.
///
/// Episode `i` starts with `reset_with_index(i)`. The record given with each
/// step is the one returned by [`Env::step`] with `reward`, `episode` and
/// `step` added. It returns the undiscounted return of each episode.
/// Vectorized environments are not supported.
pub fn run_episodes<E, P, F>(
    env: &mut E,
    policy: &mut P,
    n_episodes: usize,
    mut on_step: F,
) -> Result<Vec<f32>>
where
    E: Env,
    P: Policy<E>,
    F: FnMut(&Step<E>, Record),
{
    let mut rs = Vec::new();

    for episode in 0..n_episodes {
        let mut prev_obs = env.reset_with_index(episode)?;
        let mut count_step = 0;
        let mut r_total = 0.0;

        loop {
            let act = policy.sample(&prev_obs);
            let (step, mut record) = env.step(&act)?;
            r_total += step.reward[0];

            record.insert("reward", RecordValue::Scalar(step.reward[0]));
            record.insert("episode", RecordValue::Scalar(episode as _));
            record.insert("step", RecordValue::Scalar(count_step as _));
            on_step(&step, record);

            if step.is_done() {
                break;
            }
            prev_obs = step.obs;
            count_step += 1;
        }
        rs.push(r_total);
    }

    Ok(rs)
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs episodes with a policy and writes a record at every step.
///
/// It returns the undiscounted return of each episode.
///
/// ```mermaid
/// graph LR
///     Env --> Obs
///     Obs --> Policy
///     Policy --> Act
///     Act --> Env
///     Env --> Record
///     Record --> Recorder
/// ```
///
/// Records are the ones given by [`run_episodes`].
pub fn eval_with_recorder<E, P, R>(
    env: &mut E,
    policy: &mut P,
    n_episodes: usize,
    recorder: &mut R,
) -> Result<Vec<f32>>
where
    E: Env,
    P: Policy<E>,
    R: Recorder,
{
    run_episodes(env, policy, n_episodes, |_, record| recorder.write(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::BufferedRecorder, Act, Obs};

    #[derive(Clone, Debug)]
    struct Counter(usize);

    impl Obs for Counter {
        fn len(&self) -> usize {
            1
        }
    }

    #[derive(Clone, Debug)]
    struct Noop;

    impl Act for Noop {
        fn len(&self) -> usize {
            1
        }
    }

    /// Episodes last `ix + 2` steps and every step pays 1.
    struct CountdownEnv {
        t: usize,
        len: usize,
    }

    impl Env for CountdownEnv {
        type Config = ();
        type Obs = Counter;
        type Act = Noop;
        type Info = ();

        fn build(_config: &(), _seed: i64) -> Result<Self> {
            Ok(Self { t: 0, len: 0 })
        }

        fn step(&mut self, a: &Noop) -> Result<(Step<Self>, Record)> {
            self.t += 1;
            let done = (self.t >= self.len) as i8;
            let step = Step::new(Counter(self.t), a.clone(), vec![1.0], vec![done], vec![0], (), None);
            Ok((step, Record::empty()))
        }

        fn reset(&mut self, _is_done: Option<&Vec<i8>>) -> Result<Counter> {
            self.t = 0;
            Ok(Counter(0))
        }

        fn step_with_reset(&mut self, a: &Noop) -> Result<(Step<Self>, Record)> {
            self.step(a)
        }

        fn reset_with_index(&mut self, ix: usize) -> Result<Counter> {
            self.len = ix + 2;
            self.reset(None)
        }
    }

    struct NoopPolicy;

    impl Policy<CountdownEnv> for NoopPolicy {
        fn sample(&mut self, _obs: &Counter) -> Noop {
            Noop
        }
    }

    #[test]
    fn test_eval_with_recorder_returns_and_records() -> Result<()> {
        let mut env = CountdownEnv::build(&(), 0)?;
        let mut recorder = BufferedRecorder::new();
        let returns = eval_with_recorder(&mut env, &mut NoopPolicy, 2, &mut recorder)?;

        assert_eq!(returns, vec![2.0, 3.0]);
        assert_eq!(recorder.len(), 5);
        let last = recorder.iter().last().unwrap();
        assert_eq!(last.get_scalar("episode")?, 1.0);
        assert_eq!(last.get_scalar("step")?, 2.0);
        Ok(())
    }

    #[test]
    fn test_run_episodes_visits_every_step() -> Result<()> {
        let mut env = CountdownEnv::build(&(), 0)?;
        let mut visited = vec![];
        let returns = run_episodes(&mut env, &mut NoopPolicy, 3, |step, record| {
            visited.push((step.obs.0, record.get_scalar("step").unwrap()));
        })?;

        assert_eq!(returns, vec![2.0, 3.0, 4.0]);
        assert_eq!(visited.len(), 9);
        assert_eq!(visited[..2], [(1, 0.0), (2, 1.0)]);
        assert_eq!(visited[8], (4, 3.0));
        Ok(())
    }
}
