use crate::ai::state_encoding::EncodedState;
use crate::error::AgentError;
use crate::game::Move;

/// Metrics returned from an end-of-episode update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateMetrics {
    pub loss: f32,
    pub policy_loss: f32,
    pub value_loss: f32,
    pub steps: usize,
    pub mean_value_estimate: Option<f32>,
}

/// Universal interface for anything that can play a side.
pub trait Agent {
    /// Choose a move for the encoded position.
    ///
    /// A learned agent may return a move outside `legal_moves`; the caller is
    /// expected to check and substitute a legal one.
    fn select_action(&mut self, state: &EncodedState, legal_moves: &[Move]) -> Move;

    /// Return the agent's display name.
    fn name(&self) -> &str;

    /// Credit the most recent action with a reward.
    fn record_reward(&mut self, _reward: f32) {}

    /// Close the current episode, learning from it if the agent learns.
    fn finish_episode(&mut self) -> Result<UpdateMetrics, AgentError> {
        Ok(UpdateMetrics::default())
    }
}
