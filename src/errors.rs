//! Crate-wide error type.
//!
//! Parsing, notation and move-application failures surface as `ArenaError`.
//! Automated-player faults have their own `BotFault` payload because the
//! orchestrator stores them and re-raises them later from `update()`.

use thiserror::Error;

use crate::move_generation::move_generator::MoveGenerationError;

pub type ArenaResult<T> = Result<T, ArenaError>;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("invalid FEN '{fen}': {reason}")]
    FenSyntax { fen: String, reason: String },

    #[error("invalid notation: {0}")]
    Notation(String),

    #[error("cannot apply move: {0}")]
    MoveApplication(String),

    #[error(transparent)]
    MoveGeneration(#[from] MoveGenerationError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("failed to serialize statistics: {0}")]
    Export(#[from] serde_json::Error),

    #[error(transparent)]
    BotFault(#[from] BotFault),

    #[error("PGN error: {0}")]
    Pgn(String),
}

impl ArenaError {
    pub fn fen(fen: &str, reason: impl Into<String>) -> Self {
        ArenaError::FenSyntax {
            fen: fen.to_owned(),
            reason: reason.into(),
        }
    }
}

/// A failure raised by an automated player while it was computing a move.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("automated player '{player}' faulted while thinking: {message}")]
pub struct BotFault {
    pub player: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::{ArenaError, BotFault};

    #[test]
    fn bot_fault_message_names_the_player() {
        let err: ArenaError = BotFault {
            player: "Greedy".to_owned(),
            message: "boom".to_owned(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "automated player 'Greedy' faulted while thinking: boom"
        );
    }
}
