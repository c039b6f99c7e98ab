use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use super::agent::Agent;
use crate::ai::state_encoding::EncodedState;
use crate::game::Move;

/// An agent that selects uniformly at random from legal moves.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn select_action(&mut self, _state: &EncodedState, legal_moves: &[Move]) -> Move {
        assert!(!legal_moves.is_empty(), "No legal moves available");
        let idx = self.rng.random_range(0..legal_moves.len());
        legal_moves[idx]
    }

    fn name(&self) -> &str {
        "Random"
    }
}
