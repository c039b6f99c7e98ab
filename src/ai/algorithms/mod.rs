mod actor_critic;

pub use actor_critic::{
    actor_critic_loss, discounted_returns, huber_loss, legal_action_mask, masked_log_softmax, normalize_returns,
    ActorCriticAgent, AgentConfig, HUBER_DELTA, MASK_EPSILON, RETURN_EPSILON,
};
