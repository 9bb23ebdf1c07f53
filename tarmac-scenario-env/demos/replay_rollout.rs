use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::{convert::TryFrom, fs::File, path::PathBuf};
use tarmac_core::{
    record::{AggregateRecorder, BufferedRecorder, LogRecorder, NullRecorder, Record},
    util, Env as _, Policy,
};
use tarmac_scenario_env::{
    behavior_cloning_loss, collect_demonstrations, DriveAction, LogReplaySim, ScenarioEnv,
    ScenarioEnvConfig, ScenarioObs, SimulatorConfig, DEFAULT_BC_COEF,
};

type Env = ScenarioEnv<LogReplaySim>;

/// Replays converted scenarios with a random policy and dumps expert actions.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory of scenario files.
    #[arg(long)]
    data: PathBuf,

    /// Number of episodes.
    #[arg(long, default_value_t = 3)]
    episodes: usize,

    /// CSV file of the rollout.
    #[arg(long, default_value = "replay_rollout.csv")]
    out: PathBuf,
}

struct RandomPolicy;

impl Policy<Env> for RandomPolicy {
    fn sample(&mut self, _: &ScenarioObs) -> DriveAction {
        DriveAction::new(fastrand::f32() * 2.0 - 1.0, fastrand::f32())
    }
}

#[derive(Debug, Serialize)]
struct RolloutRecord {
    episode: usize,
    step: usize,
    reward: f32,
    expert_steering: f32,
    expert_throttle: f32,
}

impl TryFrom<&Record> for RolloutRecord {
    type Error = anyhow::Error;

    fn try_from(record: &Record) -> Result<Self> {
        let expert = record.get_array1("expert_action")?;
        Ok(Self {
            episode: record.get_scalar("episode")? as _,
            step: record.get_scalar("step")? as _,
            reward: record.get_scalar("reward")?,
            expert_steering: expert[0],
            expert_throttle: expert[1],
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    fastrand::seed(42);
    let args = Args::parse();

    let env_config = ScenarioEnvConfig::default()
        .simulator(SimulatorConfig::default().data_directory(&args.data));
    let mut env = Env::build(&env_config, 0)?;
    let mut recorder = BufferedRecorder::new();
    let mut policy = RandomPolicy;

    let _ = util::eval_with_recorder(&mut env, &mut policy, args.episodes, &mut recorder)?;

    let mut wtr = csv::WriterBuilder::new().from_writer(File::create(&args.out)?);
    let mut summary = LogRecorder::new();
    for record in recorder.iter() {
        wtr.serialize(RolloutRecord::try_from(record)?)?;
        summary.store(record.clone());
    }
    wtr.flush()?;
    summary.flush(args.episodes as i64);

    let mut null = NullRecorder {};
    let demos = collect_demonstrations(&mut env, &mut policy, args.episodes, &mut null)?;
    let pred = demos
        .obs()
        .iter()
        .map(|obs| policy.sample(obs))
        .collect::<Vec<_>>();
    let loss = behavior_cloning_loss(&pred, demos.expert_actions(), DEFAULT_BC_COEF)?;
    println!(
        "{} demonstration steps, behavior cloning loss of the random policy = {}",
        demos.len(),
        loss
    );

    Ok(())
}
