mod agent;
pub mod algorithms;
pub mod move_codec;
pub mod networks;
mod random;
pub mod state_encoding;

pub use agent::{Agent, UpdateMetrics};
pub use algorithms::{ActorCriticAgent, AgentConfig};
pub use networks::{PolicyValueNetwork, PolicyValueNetworkConfig};
pub use random::RandomAgent;
