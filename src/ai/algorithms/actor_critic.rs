use std::path::Path;

use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder};
use burn::tensor::activation::log_softmax;
use burn::tensor::TensorData;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::ai::agent::{Agent, UpdateMetrics};
use crate::ai::move_codec::{decode, encode, ACTION_SPACE};
use crate::ai::networks::{PolicyValueNetwork, PolicyValueNetworkConfig};
use crate::ai::state_encoding::{EncodedState, STATE_SIZE};
use crate::checkpoint::{read_model_file, write_model_file, ModelMetadata, MODEL_FORMAT_VERSION};
use crate::error::{AgentError, ModelError};
use crate::game::Move;

type InferBackend = NdArray<f32>;
type TrainBackend = Autodiff<InferBackend>;

/// Added to the legal-move mask before taking its log.
pub const MASK_EPSILON: f32 = 1e-10;
/// Added to the return standard deviation during normalisation.
pub const RETURN_EPSILON: f32 = 1e-8;
/// Huber threshold for the value loss (smooth L1 with beta = 1).
pub const HUBER_DELTA: f32 = 1.0;

/// Actor-critic hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub learning_rate: f64,
    pub gamma: f32,
    pub hidden_size: usize,
    /// Seeds action sampling; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            learning_rate: 1e-3,
            gamma: 0.99,
            hidden_size: 128,
            seed: None,
        }
    }
}

/// Per-episode transitions. The three sequences grow together and are
/// only ever emptied all at once.
struct EpisodeBuffer<B: Backend> {
    log_probs: Vec<Tensor<B, 1>>,
    values: Vec<Tensor<B, 1>>,
    rewards: Vec<f32>,
}

impl<B: Backend> EpisodeBuffer<B> {
    fn new() -> Self {
        EpisodeBuffer {
            log_probs: Vec::new(),
            values: Vec::new(),
            rewards: Vec::new(),
        }
    }

    fn push_action(&mut self, log_prob: Tensor<B, 1>, value: Tensor<B, 1>) {
        self.log_probs.push(log_prob);
        self.values.push(value);
    }

    fn push_reward(&mut self, reward: f32) {
        self.rewards.push(reward);
    }

    fn lengths(&self) -> (usize, usize, usize) {
        (self.log_probs.len(), self.values.len(), self.rewards.len())
    }

    /// Move the contents out, leaving the buffer empty.
    fn take(&mut self) -> Self {
        std::mem::replace(self, Self::new())
    }
}

/// Self-play chess agent trained with a one-step-per-episode actor-critic update.
pub struct ActorCriticAgent {
    network: PolicyValueNetwork<TrainBackend>,
    optimizer: OptimizerAdaptor<Adam, PolicyValueNetwork<TrainBackend>, TrainBackend>,
    net_config: PolicyValueNetworkConfig,
    config: AgentConfig,
    device: <TrainBackend as Backend>::Device,
    buffer: EpisodeBuffer<TrainBackend>,
    episode_count: usize,
    rng: StdRng,
}

impl ActorCriticAgent {
    pub fn new(config: AgentConfig) -> Self {
        let device = Default::default();
        let net_config = PolicyValueNetworkConfig::new()
            .with_input_size(STATE_SIZE)
            .with_hidden_size(config.hidden_size)
            .with_action_space(ACTION_SPACE);
        let network: PolicyValueNetwork<TrainBackend> = net_config.init(&device);
        let optimizer = AdamConfig::new().init();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        ActorCriticAgent {
            network,
            optimizer,
            net_config,
            config,
            device,
            buffer: EpisodeBuffer::new(),
            episode_count: 0,
            rng,
        }
    }

    /// Build an agent and restore its parameters from a model file.
    pub fn from_model_file(path: &Path, config: AgentConfig) -> Result<Self, ModelError> {
        let mut agent = Self::new(config);
        agent.load_model(path)?;
        Ok(agent)
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    /// Lengths of the (log-prob, value, reward) sequences of the open episode.
    pub fn buffer_len(&self) -> (usize, usize, usize) {
        self.buffer.lengths()
    }

    /// Post-mask action probabilities for a position, without touching the buffer.
    pub fn policy(&self, state: &EncodedState, legal_moves: &[Move]) -> Vec<f32> {
        let net = self.network.valid();
        let (logits, _value) = net.forward(state.to_input::<InferBackend>(&self.device));
        let mask = legal_action_mask::<InferBackend>(legal_moves, &self.device);
        masked_log_softmax(logits, mask)
            .exp()
            .into_data()
            .iter::<f32>()
            .collect()
    }

    /// Raw network output (logits, value) for a position.
    pub fn evaluate(&self, state: &EncodedState) -> (Vec<f32>, f32) {
        let net = self.network.valid();
        let (logits, value) = net.forward(state.to_input::<InferBackend>(&self.device));
        let logits: Vec<f32> = logits.into_data().iter::<f32>().collect();
        (logits, scalar(value.reshape([1])))
    }

    /// Policy-gradient update from one complete episode.
    fn update(&mut self, episode: EpisodeBuffer<TrainBackend>) -> Result<UpdateMetrics, AgentError> {
        let (n_log_probs, n_values, n_rewards) = episode.lengths();
        if n_log_probs != n_values || n_values != n_rewards {
            return Err(AgentError::BufferMismatch {
                log_probs: n_log_probs,
                values: n_values,
                rewards: n_rewards,
            });
        }
        let n = n_rewards;
        if n == 0 {
            return Ok(UpdateMetrics::default());
        }

        let returns = normalize_returns(&discounted_returns(&episode.rewards, self.config.gamma));
        let returns =
            Tensor::<TrainBackend, 1>::from_data(TensorData::from(returns.as_slice()), &self.device);
        let log_probs = Tensor::cat(episode.log_probs, 0);
        let values = Tensor::cat(episode.values, 0);

        let (policy_loss, value_loss) = actor_critic_loss(log_probs, values.clone(), returns);
        let loss = policy_loss.clone() + value_loss.clone();

        let loss_value = scalar(loss.clone());
        if !loss_value.is_finite() {
            return Err(AgentError::NonFiniteLoss(loss_value));
        }

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.network);
        self.network = self
            .optimizer
            .step(self.config.learning_rate, self.network.clone(), grads);

        let value_sum: f32 = values.into_data().iter::<f32>().sum();
        Ok(UpdateMetrics {
            loss: loss_value,
            policy_loss: scalar(policy_loss),
            value_loss: scalar(value_loss),
            steps: n,
            mean_value_estimate: Some(value_sum / n as f32),
        })
    }

    /// Write the network parameters (no optimizer state, no buffer) to `path`.
    pub fn save_model(&self, path: &Path) -> Result<(), ModelError> {
        let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
        let weights = Recorder::<InferBackend>::record(
            &recorder,
            self.network.valid().into_record(),
            (),
        )
        .map_err(|e| ModelError::Encode(e.to_string()))?;

        let saved_at = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        let metadata = ModelMetadata {
            format_version: MODEL_FORMAT_VERSION,
            input_size: self.net_config.input_size,
            hidden_size: self.net_config.hidden_size,
            action_space: self.net_config.action_space,
            episodes_trained: self.episode_count,
            saved_at,
        };
        write_model_file(path, &metadata, &weights)?;
        log::info!("saved model to {}", path.display());
        Ok(())
    }

    /// Restore network parameters from `path`.
    ///
    /// The current parameters are replaced only once the whole file has
    /// been decoded and every tensor shape matches this agent's network.
    pub fn load_model(&mut self, path: &Path) -> Result<(), ModelError> {
        let (metadata, weights) = read_model_file(path)?;

        let dims = [
            ("input_size", self.net_config.input_size, metadata.input_size),
            ("hidden_size", self.net_config.hidden_size, metadata.hidden_size),
            ("action_space", self.net_config.action_space, metadata.action_space),
        ];
        for (name, expected, found) in dims {
            if expected != found {
                return Err(ModelError::ShapeMismatch {
                    name: name.to_string(),
                    expected: vec![expected],
                    found: vec![found],
                });
            }
        }

        let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
        let record = Recorder::<TrainBackend>::load(&recorder, weights, &self.device)
            .map_err(|e| ModelError::Decode(e.to_string()))?;
        let candidate = self
            .net_config
            .init::<TrainBackend>(&self.device)
            .load_record(record);

        let expected = self.network.parameter_shapes();
        let found = candidate.parameter_shapes();
        for ((name, want), (_, got)) in expected.into_iter().zip(found) {
            if want != got {
                return Err(ModelError::ShapeMismatch {
                    name,
                    expected: want,
                    found: got,
                });
            }
        }

        self.network = candidate;
        self.optimizer = AdamConfig::new().init();
        self.episode_count = metadata.episodes_trained;
        log::info!(
            "loaded model from {} ({} episodes trained)",
            path.display(),
            metadata.episodes_trained
        );
        Ok(())
    }
}

impl Agent for ActorCriticAgent {
    fn select_action(&mut self, state: &EncodedState, legal_moves: &[Move]) -> Move {
        let (logits, value) = self
            .network
            .forward(state.to_input::<TrainBackend>(&self.device));
        let mask = legal_action_mask::<TrainBackend>(legal_moves, &self.device);
        let log_probs = masked_log_softmax(logits, mask);

        let probs: Vec<f32> = log_probs
            .clone()
            .detach()
            .exp()
            .into_data()
            .iter::<f32>()
            .collect();
        let action = sample_categorical(&probs, &mut self.rng);

        let log_prob = log_probs.slice([0..1, action..action + 1]).reshape([1]);
        self.buffer.push_action(log_prob, value.reshape([1]));

        decode(action).expect("sampled index lies inside the action space")
    }

    fn name(&self) -> &str {
        "ActorCritic"
    }

    fn record_reward(&mut self, reward: f32) {
        self.buffer.push_reward(reward);
    }

    fn finish_episode(&mut self) -> Result<UpdateMetrics, AgentError> {
        // Taken up front so a failed update never leaks into the next episode.
        let episode = self.buffer.take();
        self.episode_count += 1;
        let metrics = self.update(episode)?;
        log::debug!(
            "episode {} update: loss {:.4} (policy {:.4}, value {:.4}) over {} steps",
            self.episode_count,
            metrics.loss,
            metrics.policy_loss,
            metrics.value_loss,
            metrics.steps
        );
        Ok(metrics)
    }
}

/// 1.0 at the action index of every encodable legal move, 0.0 elsewhere. Shape [1, 20480].
pub fn legal_action_mask<B: Backend>(legal_moves: &[Move], device: &B::Device) -> Tensor<B, 2> {
    let mut mask = vec![0.0f32; ACTION_SPACE];
    for mv in legal_moves {
        match encode(mv) {
            Ok(index) => mask[index] = 1.0,
            Err(e) => log::debug!("skipping legal move {mv}: {e}"),
        }
    }
    Tensor::<B, 1>::from_data(TensorData::from(mask.as_slice()), device).reshape([1, ACTION_SPACE])
}

/// Log-probabilities after masking: `log_softmax(logits + log(mask + 1e-10))`.
///
/// Illegal actions keep a tiny, nonzero probability.
pub fn masked_log_softmax<B: Backend>(logits: Tensor<B, 2>, mask: Tensor<B, 2>) -> Tensor<B, 2> {
    log_softmax(logits + (mask + MASK_EPSILON).log(), 1)
}

/// Discounted returns, computed backward: `R_t = r_t + gamma * R_{t+1}`.
pub fn discounted_returns(rewards: &[f32], gamma: f32) -> Vec<f32> {
    let mut returns = vec![0.0f32; rewards.len()];
    let mut running = 0.0f32;
    for (i, &r) in rewards.iter().enumerate().rev() {
        running = r + gamma * running;
        returns[i] = running;
    }
    returns
}

/// `(R - mean) / (std + 1e-8)` with the sample standard deviation.
///
/// A single return has zero spread and normalises to exactly 0.0.
pub fn normalize_returns(returns: &[f32]) -> Vec<f32> {
    let n = returns.len();
    if n == 0 {
        return Vec::new();
    }
    let mean = returns.iter().sum::<f32>() / n as f32;
    let std = if n > 1 {
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f32>() / (n - 1) as f32;
        var.sqrt()
    } else {
        0.0
    };
    returns
        .iter()
        .map(|r| (r - mean) / (std + RETURN_EPSILON))
        .collect()
}

/// Element-wise Huber loss: quadratic below `delta`, linear above.
pub fn huber_loss<B: Backend>(pred: Tensor<B, 1>, target: Tensor<B, 1>, delta: f32) -> Tensor<B, 1> {
    let abs_diff = (pred - target).abs();
    let quadratic = abs_diff.clone().clamp_max(delta);
    let linear = abs_diff - quadratic.clone();
    quadratic.clone() * quadratic * 0.5 + linear * delta
}

/// Policy and value terms of the episode loss, each summed over steps.
///
/// The critic is a constant baseline in the policy term and learns only
/// through the value term.
pub fn actor_critic_loss<B: Backend>(
    log_probs: Tensor<B, 1>,
    values: Tensor<B, 1>,
    returns: Tensor<B, 1>,
) -> (Tensor<B, 1>, Tensor<B, 1>) {
    let advantages = returns.clone() - values.clone().detach();
    let policy_loss = (-log_probs * advantages).sum();
    let value_loss = huber_loss(values, returns, HUBER_DELTA).sum();
    (policy_loss, value_loss)
}

/// Sample an index from a categorical distribution defined by probs.
fn sample_categorical(probs: &[f32], rng: &mut StdRng) -> usize {
    let total: f64 = probs.iter().map(|&p| p as f64).sum();
    let r = rng.random_range(0.0..1.0) * total;
    let mut cumulative = 0.0f64;
    for (i, &p) in probs.iter().enumerate() {
        cumulative += p as f64;
        if r < cumulative {
            return i;
        }
    }
    // Fallback to last non-zero probability action
    probs.iter().rposition(|&p| p > 0.0).unwrap_or(0)
}

fn scalar<B: Backend>(tensor: Tensor<B, 1>) -> f32 {
    tensor.into_data().iter::<f32>().next().unwrap_or(f32::NAN)
}
