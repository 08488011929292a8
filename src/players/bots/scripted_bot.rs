//! Plays a fixed list of UCI moves in order, then reports an error.
//!
//! Each move is resolved against the bot's own view of the board, so special
//! move tags are inferred the same way a human entry would be.

use std::collections::VecDeque;

use crate::moves::chess_move::ChessMove;
use crate::players::bot::{Bot, BotTimer, BotView};

pub struct ScriptedBot {
    name: String,
    script: VecDeque<String>,
}

impl ScriptedBot {
    pub fn new<I, S>(name: &str, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_owned(),
            script: moves.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Bot for ScriptedBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute_move(&mut self, view: &BotView, _timer: &BotTimer) -> Result<ChessMove, String> {
        let next = self
            .script
            .pop_front()
            .ok_or_else(|| format!("{} ran out of scripted moves", self.name))?;
        ChessMove::from_uci(&next, &view.board).map_err(|e| e.to_string())
    }
}
