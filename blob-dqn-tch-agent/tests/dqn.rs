use anyhow::Result;
use blob_dqn_core::{
    checkpoint::Epoch,
    error::BlobDqnError,
    record::Record,
    replay_buffer::{ReplayBuffer, ReplayBufferConfig, Transition},
    Act, Agent, Env, ExperienceBufferBase, Obs, Policy, ReplayBufferBase, Step,
};
use blob_dqn_tch_agent::{
    dqn::{Dqn, DqnConfig, DqnModelConfig, EpsilonGreedy},
    opt::OptimizerConfig,
    qnet::{PixelInput, QNet, QNetConfig, StackObs},
};
use tch::{Device, Tensor};
use tempdir::TempDir;

const C: i64 = 3;
const H: i64 = 21;
const W: i64 = 16;
const AUX: i64 = 4;
const N_ACTIONS: i64 = 3;

#[derive(Clone, Debug)]
struct FrameObs {
    pixels: Vec<u8>,
    aux: Vec<f32>,
}

impl Obs for FrameObs {}

impl FrameObs {
    fn random() -> Self {
        Self {
            pixels: (0..C * H * W).map(|_| fastrand::u8(..)).collect(),
            aux: (0..AUX).map(|_| fastrand::f32()).collect(),
        }
    }
}

impl StackObs for FrameObs {
    type Input = PixelInput;

    fn stack(obs: &[Self]) -> PixelInput {
        let n = obs.len() as i64;
        let pixels = obs.iter().flat_map(|o| o.pixels.iter().copied()).collect::<Vec<_>>();
        let aux = obs.iter().flat_map(|o| o.aux.iter().copied()).collect::<Vec<_>>();
        PixelInput {
            pixels: Tensor::from_slice(&pixels).view([n, C, H, W]),
            aux: Tensor::from_slice(&aux).view([n, AUX]),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct DiscreteAct(i64);

impl Act for DiscreteAct {}

impl From<i64> for DiscreteAct {
    fn from(a: i64) -> Self {
        Self(a)
    }
}

impl From<DiscreteAct> for i64 {
    fn from(a: DiscreteAct) -> Self {
        a.0
    }
}

/// Emits random frames and ends every episode after `Config` steps.
struct RandomFrameEnv {
    len: usize,
    t: usize,
}

impl Env for RandomFrameEnv {
    type Config = usize;
    type Obs = FrameObs;
    type Act = DiscreteAct;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self { len: *config, t: 0 })
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        self.t += 1;
        let is_terminated = self.t == self.len;
        let reward = if a.0 == 0 { 1.0 } else { 0.0 };
        let step = Step::new(FrameObs::random(), a.clone(), reward, is_terminated, false, ());
        Ok((step, Record::empty()))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.t = 0;
        Ok(FrameObs::random())
    }
}

type Buffer = ReplayBuffer<FrameObs, DiscreteAct>;
type DqnAgent = Dqn<RandomFrameEnv, QNet, Buffer>;

fn agent_config(head_units: Vec<i64>) -> DqnConfig<QNet> {
    let mut q_config = QNetConfig::default().aux_units(vec![16, 8]).head_units(head_units);
    q_config
        .bind_shapes(&FrameObs::stack(&[FrameObs::random()]))
        .unwrap();
    let model_config = DqnModelConfig::default()
        .q_config(q_config)
        .opt_config(OptimizerConfig::default());

    DqnConfig::default()
        .model_config(model_config)
        .out_dim(N_ACTIONS)
        .min_transitions_warmup(8)
        .batch_size(4)
        .explorer(EpsilonGreedy::new().eps_decay(10.0))
        .device(Device::Cpu)
        .train(true)
}

fn filled_buffer(n: usize) -> Buffer {
    let mut buffer = Buffer::build(&ReplayBufferConfig::default().capacity(100).seed(7));
    let mut env = RandomFrameEnv::build(&5, 0).unwrap();
    let mut obs = env.reset().unwrap();
    for _ in 0..n {
        let act = DiscreteAct(fastrand::i64(0..N_ACTIONS));
        let (step, _) = env.step(&act).unwrap();
        let next_obs = if step.is_done() {
            env.reset().unwrap()
        } else {
            step.obs.clone()
        };
        buffer.push(Transition::from_step(obs, step)).unwrap();
        obs = next_obs;
    }
    buffer
}

fn q_values(agent: &DqnAgent, obs: &[FrameObs]) -> Vec<f32> {
    let q = agent.action_values(obs);
    Vec::<f32>::try_from(&q.flatten(0, -1)).unwrap()
}

#[test]
fn test_no_optimization_before_warmup() -> Result<()> {
    let mut agent = DqnAgent::build(agent_config(vec![32, 16]))?;
    let mut buffer = filled_buffer(7);
    assert!(agent.opt_with_record(&mut buffer)?.is_none());
    assert_eq!(agent.n_opts(), 0);
    Ok(())
}

#[test]
fn test_opt_records_loss_and_epsilon() -> Result<()> {
    let mut agent = DqnAgent::build(agent_config(vec![32, 16]))?;
    let mut buffer = filled_buffer(20);
    let obs = FrameObs::random();
    for _ in 0..5 {
        let a = agent.sample(&obs);
        assert!((0..N_ACTIONS).contains(&a.0));
    }
    assert_eq!(agent.explorer().n_steps, 5);

    let record = agent.opt_with_record(&mut buffer)?.unwrap();
    assert!(record.get_scalar("loss")?.is_finite());
    let eps = record.get_scalar("epsilon")?;
    assert!((eps as f64 - agent.explorer().eps_at(5)).abs() < 1e-6);
    assert_eq!(agent.n_opts(), 1);
    Ok(())
}

#[test]
fn test_eval_mode_is_greedy() -> Result<()> {
    let mut agent = DqnAgent::build(agent_config(vec![32, 16]))?;
    agent.eval();
    let obs = FrameObs::random();
    let greedy = agent
        .action_values(std::slice::from_ref(&obs))
        .argmax(-1, false)
        .int64_value(&[0]);
    for _ in 0..10 {
        assert_eq!(agent.sample(&obs).0, greedy);
    }
    assert_eq!(agent.explorer().n_steps, 0);
    Ok(())
}

#[test]
fn test_checkpoint_round_trip() -> Result<()> {
    let dir = TempDir::new("dqn_checkpoint")?;
    let path = dir.path().join("run").join("network_3.ckpt");

    let mut agent = DqnAgent::build(agent_config(vec![32, 16]))?;
    let mut buffer = filled_buffer(20);
    let obs = FrameObs::random();
    for _ in 0..7 {
        agent.sample(&obs);
    }
    for _ in 0..3 {
        agent.opt_with_record(&mut buffer)?;
    }
    agent.save_params(&path, Epoch::Index(3))?;

    let mut restored = DqnAgent::build(agent_config(vec![32, 16]))?;
    assert_eq!(restored.load_params(&path)?, Epoch::Index(3));
    assert_eq!(restored.explorer().n_steps, 7);

    let obs = (0..4).map(|_| FrameObs::random()).collect::<Vec<_>>();
    let q1 = agent.action_values(&obs);
    let q2 = restored.action_values(&obs);
    assert!(q1.allclose(&q2, 1e-6, 1e-6, false));

    // Training continues identically from the restored state
    let mut buffer_ = Buffer::build(&ReplayBufferConfig::default().capacity(100).seed(11));
    let mut buffer__ = Buffer::build(&ReplayBufferConfig::default().capacity(100).seed(11));
    for tr in buffer.iter() {
        buffer_.push(tr.clone())?;
        buffer__.push(tr.clone())?;
    }
    agent.opt_with_record(&mut buffer_)?;
    restored.opt_with_record(&mut buffer__)?;
    let q1 = agent.action_values(&obs);
    let q2 = restored.action_values(&obs);
    assert!(q1.allclose(&q2, 1e-5, 1e-5, false));
    Ok(())
}

#[test]
fn test_final_epoch_round_trip() -> Result<()> {
    let dir = TempDir::new("dqn_checkpoint")?;
    let path = dir.path().join("network_final.ckpt");
    let agent = DqnAgent::build(agent_config(vec![32, 16]))?;
    agent.save_params(&path, Epoch::Final)?;

    let mut restored = DqnAgent::build(agent_config(vec![32, 16]))?;
    assert_eq!(restored.load_params(&path)?, Epoch::Final);
    let obs = (0..4).map(|_| FrameObs::random()).collect::<Vec<_>>();
    assert_eq!(q_values(&agent, &obs), q_values(&restored, &obs));
    Ok(())
}

#[test]
fn test_mismatched_network_fails_to_load() -> Result<()> {
    let dir = TempDir::new("dqn_checkpoint")?;
    let path = dir.path().join("network_0.ckpt");
    let agent = DqnAgent::build(agent_config(vec![32, 16]))?;
    agent.save_params(&path, Epoch::Index(0))?;

    let mut other = DqnAgent::build(agent_config(vec![32, 8]))?;
    let err = other.load_params(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BlobDqnError>(),
        Some(BlobDqnError::CheckpointError(_))
    ));
    Ok(())
}

#[test]
fn test_target_network_tracks_policy_network() -> Result<()> {
    let mut config = agent_config(vec![32, 16]).tau(1.0);
    config = config.min_transitions_warmup(4);
    let mut agent = DqnAgent::build(config)?;
    let mut buffer = filled_buffer(12);
    agent.opt_with_record(&mut buffer)?;

    // With tau = 1 the target network equals the policy network after a step.
    let dir = TempDir::new("dqn_checkpoint")?;
    let path = dir.path().join("network_0.ckpt");
    agent.save_params(&path, Epoch::Index(0))?;
    let named = Tensor::load_multi(&path)?;
    let find = |k: &str| {
        named
            .iter()
            .find(|(name, _)| name == k)
            .map(|(_, t)| t.shallow_clone())
            .unwrap()
    };
    for (name, t) in named.iter().filter(|(n, _)| n.starts_with("policy_net.")) {
        let tgt = find(&name.replacen("policy_net.", "loss_module.", 1));
        assert!(t.allclose(&tgt, 1e-6, 1e-6, false), "{} differs", name);
    }
    Ok(())
}

#[test]
fn test_double_dqn_values_policy_choice_with_target_network() -> Result<()> {
    let mut agent = DqnAgent::build(agent_config(vec![32, 16]).double_dqn(true).tau(0.5))?;
    let mut buffer = filled_buffer(20);
    for _ in 0..3 {
        let record = agent.opt_with_record(&mut buffer)?.unwrap();
        assert!(record.get_scalar("loss")?.is_finite());
    }
    assert_eq!(agent.n_opts(), 3);

    let obs = (0..8).map(|_| FrameObs::random()).collect::<Vec<_>>();
    let online = agent.action_values(&obs);
    let target = agent.target_action_values(&obs);

    let choice = online.argmax(-1, false).unsqueeze(-1);
    let expected = target.gather(-1, &choice, false).squeeze_dim(-1);
    assert!(agent.next_action_values(&obs).allclose(&expected, 1e-6, 1e-6, false));
    Ok(())
}

#[test]
fn test_dqn_bootstraps_with_target_maximum() -> Result<()> {
    let mut agent = DqnAgent::build(agent_config(vec![32, 16]).tau(0.5))?;
    let mut buffer = filled_buffer(20);
    agent.opt_with_record(&mut buffer)?;

    let obs = (0..8).map(|_| FrameObs::random()).collect::<Vec<_>>();
    let expected = agent.target_action_values(&obs).max_dim(-1, false).0;
    assert!(agent.next_action_values(&obs).allclose(&expected, 1e-6, 1e-6, false));
    Ok(())
}

#[test]
fn test_non_finite_loss_aborts_optimization() -> Result<()> {
    let mut agent = DqnAgent::build(agent_config(vec![32, 16]))?;
    let mut buffer = Buffer::build(&ReplayBufferConfig::default().capacity(100));
    for _ in 0..10 {
        let step = Step::<RandomFrameEnv>::new(
            FrameObs::random(),
            DiscreteAct(0),
            f32::NAN,
            false,
            false,
            (),
        );
        buffer.push(Transition::from_step(FrameObs::random(), step))?;
    }

    let err = agent.opt_with_record(&mut buffer).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BlobDqnError>(),
        Some(BlobDqnError::NonFiniteLoss { opt_steps: 0, .. })
    ));
    assert_eq!(agent.n_opts(), 0);
    Ok(())
}
