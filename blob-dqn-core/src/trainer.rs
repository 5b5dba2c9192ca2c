//! Train [`Agent`].
mod config;
use crate::{
    checkpoint::{checkpoint_path, run_dir, Epoch},
    record::{Record, RecordValue::Scalar, Recorder},
    replay_buffer::Transition,
    Agent, Env, ExperienceBufferBase, ReplayBufferBase,
};
use anyhow::Result;
use chrono::Local;
pub use config::TrainerConfig;
use log::{debug, info};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Statistics of a finished training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSummary {
    /// Number of episodes run.
    pub episodes: usize,

    /// Number of environment steps.
    pub env_steps: usize,

    /// Number of optimization steps.
    pub opt_steps: usize,

    /// Total reward of the last episode.
    pub last_episode_reward: f32,

    /// Epoch of the checkpoint the run resumed from.
    pub resumed_from: Option<Epoch>,

    /// Directory where checkpoints were saved.
    pub run_dir: PathBuf,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs the episode loop of DQN training.
///
/// Every episode goes through
///
/// ```mermaid
/// graph LR
///     RESET --> SELECT_ACTION
///     SELECT_ACTION --> STEP_ENV
///     STEP_ENV --> STORE_TRANSITION
///     STORE_TRANSITION -->|buffer filled| OPTIMIZE
///     STORE_TRANSITION -->|filling| LOG
///     OPTIMIZE --> LOG
///     LOG -->|not done| SELECT_ACTION
///     LOG -->|done| DONE
/// ```
///
/// 0. If a checkpoint exists at `resume_path`, it is loaded into the agent.
/// 1. The environment and the replay buffer are built from their configurations.
/// 2. For each of `n_episodes` episodes, the environment is reset and stepped
///    until it reports done. Every transition is pushed to the replay buffer.
///    Once the buffer holds `min_replay_size` transitions, an optimization step
///    follows every environment step.
/// 3. The running reward is recorded at every step (step index: step in the
///    episode), the total reward and length at the end of every episode (step
///    index: episode) and the agent's record after every optimization step
///    (step index: optimization steps).
/// 4. After an episode, if the buffer is filled, a checkpoint
///    `network_<episode>.ckpt` is saved in the run directory.
/// 5. At the end of the run, `network_final.ckpt` is saved.
pub struct Trainer<E, R>
where
    E: Env,
    R: ExperienceBufferBase<Item = Transition<E::Obs, E::Act>> + ReplayBufferBase,
{
    config: TrainerConfig,

    /// Configuration of the environment for training.
    env_config: E::Config,

    /// Configuration of the replay buffer.
    replay_buffer_config: R::Config,

    /// Seed given to the environment.
    env_seed: i64,

    /// Hyperparameters recorded at the start of a run.
    hparams: Option<Record>,
}

/// Counters shared by the episodes of a run.
struct Session<R> {
    buffer: R,
    env_steps: usize,
    opt_steps: usize,
    filling: bool,
}

impl<E, R> Trainer<E, R>
where
    E: Env,
    R: ExperienceBufferBase<Item = Transition<E::Obs, E::Act>> + ReplayBufferBase,
{
    /// Constructs a trainer.
    pub fn build(
        config: TrainerConfig,
        env_config: E::Config,
        replay_buffer_config: R::Config,
    ) -> Self {
        Self {
            config,
            env_config,
            replay_buffer_config,
            env_seed: 0,
            hparams: None,
        }
    }

    /// Sets the seed of the environment.
    pub fn env_seed(mut self, seed: i64) -> Self {
        self.env_seed = seed;
        self
    }

    /// Sets the hyperparameters recorded at the start of a run.
    ///
    /// They are passed to [`Recorder::write_hparams`] and their scalars saved as
    /// `hparams.yaml` in the run directory.
    pub fn hparams(mut self, hparams: Record) -> Self {
        self.hparams = Some(hparams);
        self
    }

    fn save_hparams(hparams: &Record, run_dir: &Path) -> Result<()> {
        let scalars = hparams
            .iter()
            .filter_map(|(k, v)| match v {
                Scalar(v) => Some((k.as_str(), *v)),
                _ => None,
            })
            .collect::<BTreeMap<_, _>>();
        let path = run_dir.join("hparams.yaml");
        fs::write(&path, serde_yaml::to_string(&scalars)?)?;
        debug!("Saved hyperparameters to {:?}", path);
        Ok(())
    }

    fn resume<A: Agent<E, R>>(&self, agent: &mut A) -> Result<Option<Epoch>> {
        match &self.config.resume_path {
            Some(path) if Path::new(path).exists() => {
                let epoch = agent.load_params(Path::new(path))?;
                info!("Loaded epoch {} from {}", epoch, path);
                Ok(Some(epoch))
            }
            _ => Ok(None),
        }
    }

    fn save<A: Agent<E, R>>(agent: &A, run_dir: &Path, epoch: Epoch) -> Result<()> {
        let path = checkpoint_path(run_dir, epoch);
        agent.save_params(&path, epoch)?;
        info!("Saved checkpoint {:?}", &path);
        Ok(())
    }

    /// Runs a single episode and returns its total reward.
    fn run_episode<A: Agent<E, R>>(
        &self,
        episode: usize,
        env: &mut E,
        agent: &mut A,
        session: &mut Session<R>,
        recorder: &mut dyn Recorder,
    ) -> Result<f32> {
        let mut obs = env.reset()?;
        let mut reward_sum = 0f32;
        let mut t = 0;

        loop {
            let act = agent.sample(&obs);
            let (step, _) = env.step(&act)?;
            reward_sum += step.reward;
            let is_done = step.is_done();
            let next_obs = step.obs.clone();

            session
                .buffer
                .push(Transition::from_step(obs, step))?;
            session.env_steps += 1;
            obs = next_obs;

            if session.buffer.len() >= self.config.min_replay_size {
                if session.filling {
                    session.filling = false;
                    info!("Replay buffer filled");
                }
                if let Some(record) = agent.opt_with_record(&mut session.buffer)? {
                    session.opt_steps += 1;
                    recorder.write(session.opt_steps, record);
                }
            }

            if self.config.record_step_reward {
                recorder.write(t, Record::from_scalar("current_reward", reward_sum));
            }

            if is_done {
                let record = Record::from_slice(&[
                    ("reward", Scalar(reward_sum)),
                    ("step_count", Scalar((t + 1) as f32)),
                ]);
                recorder.write(episode, record);
                debug!(
                    "Episode {}: reward = {}, steps = {}",
                    episode,
                    reward_sum,
                    t + 1
                );
                break;
            }
            t += 1;
        }

        Ok(reward_sum)
    }

    /// Trains the agent.
    pub fn train<A>(&mut self, agent: &mut A, recorder: &mut dyn Recorder) -> Result<TrainSummary>
    where
        A: Agent<E, R>,
    {
        let resumed_from = self.resume(agent)?;
        let run_dir = run_dir(&self.config.model_dir, &Local::now());
        fs::create_dir_all(&run_dir)?;
        if let Some(hparams) = &self.hparams {
            recorder.write_hparams(hparams);
            Self::save_hparams(hparams, &run_dir)?;
        }

        let mut env = E::build(&self.env_config, self.env_seed)?;
        let mut session = Session {
            buffer: R::build(&self.replay_buffer_config),
            env_steps: 0,
            opt_steps: 0,
            filling: true,
        };
        let mut last_episode_reward = 0f32;
        agent.train();

        for episode in 0..self.config.n_episodes {
            last_episode_reward =
                self.run_episode(episode, &mut env, agent, &mut session, recorder)?;

            if !session.filling {
                Self::save(agent, &run_dir, Epoch::Index(episode))?;
            }
        }

        Self::save(agent, &run_dir, Epoch::Final)?;
        recorder.flush();
        info!("Complete");

        Ok(TrainSummary {
            episodes: self.config.n_episodes,
            env_steps: session.env_steps,
            opt_steps: session.opt_steps,
            last_episode_reward,
            resumed_from,
            run_dir,
        })
    }
}
