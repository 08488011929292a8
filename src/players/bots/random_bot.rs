//! Uniform random mover.
//!
//! Picks any legal move on its fogged board. Mostly useful as a sparring
//! partner and for exercising the orchestrator.

use rand::prelude::IndexedRandom;
use rand::{rngs::StdRng, SeedableRng};

use crate::move_generation::legal_move_generator::StandardMoveGenerator;
use crate::move_generation::move_generator::MoveGenerator;
use crate::moves::chess_move::ChessMove;
use crate::players::bot::{Bot, BotTimer, BotView};

pub struct RandomBot {
    move_generator: StandardMoveGenerator,
    rng: StdRng,
}

impl RandomBot {
    pub fn new() -> Self {
        Self {
            move_generator: StandardMoveGenerator,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            move_generator: StandardMoveGenerator,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomBot {
    fn default() -> Self {
        Self::new()
    }
}

impl Bot for RandomBot {
    fn name(&self) -> &str {
        "Random"
    }

    fn compute_move(&mut self, view: &BotView, _timer: &BotTimer) -> Result<ChessMove, String> {
        let legal_moves = self
            .move_generator
            .legal_moves(&view.board)
            .map_err(|e| e.to_string())?;

        legal_moves
            .as_slice()
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| "no legal move on the visible board".to_owned())
    }
}
