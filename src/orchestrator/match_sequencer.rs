//! Bot-vs-bot matches over a list of start positions.
//!
//! Every opening is played twice with colours swapped, bot A taking White on
//! even game indices. Statistics are kept from each bot's perspective. After a
//! game ends on its own, the next one is scheduled `next_game_delay_ms` later
//! and is only started if no other game has begun in the meantime.

use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::arbiter::game_result::GameResult;
use crate::config::ArenaSettings;
use crate::errors::{ArenaError, ArenaResult};
use crate::orchestrator::turn_orchestrator::{EndOptions, FinishedGame, TurnOrchestrator};
use crate::players::player::{PlayerKind, SharedBot};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMatchStats {
    pub bot_name: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub timeouts: u32,
    pub illegal_moves: u32,
}

impl BotMatchStats {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// Fold one result in, seen from the side this bot played.
    pub fn record(&mut self, result: GameResult, played_white: bool) {
        if result.is_draw() {
            self.draws += 1;
        } else if result.is_white_win() == played_white {
            self.wins += 1;
        } else {
            self.losses += 1;
            if result.is_timeout() {
                self.timeouts += 1;
            }
            if result.is_illegal_move() {
                self.illegal_moves += 1;
            }
        }
    }
}

/// One line of the match log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub game_number: usize,
    pub start_fen: String,
    pub white: String,
    pub black: String,
    pub bot_a_played_white: bool,
    pub result: GameResult,
    pub plies: usize,
}

/// Everything `export_json` writes.
#[derive(Debug, Serialize)]
struct MatchExport<'a> {
    total_games: usize,
    games_played: usize,
    bot_a: &'a BotMatchStats,
    bot_b: &'a BotMatchStats,
    games: &'a [MatchRecord],
}

/// Deferred start of the next game in a match.
struct ScheduledGame {
    remaining: Duration,
    epoch: u64,
    white: SharedBot,
    black: SharedBot,
}

pub struct MatchSequencer {
    orchestrator: TurnOrchestrator,
    start_fens: Vec<String>,
    stats_a: BotMatchStats,
    stats_b: BotMatchStats,
    bot_a_plays_white: bool,
    game_index: usize,
    game_limit: Option<usize>,
    records: Vec<MatchRecord>,
    continuation: Option<ScheduledGame>,
}

impl MatchSequencer {
    pub fn new(settings: ArenaSettings) -> ArenaResult<Self> {
        settings.validate()?;
        let start_fens = settings.start_fens.clone();
        Ok(Self::with_orchestrator(TurnOrchestrator::new(settings), start_fens))
    }

    pub fn with_orchestrator(orchestrator: TurnOrchestrator, start_fens: Vec<String>) -> Self {
        Self {
            orchestrator,
            start_fens,
            stats_a: BotMatchStats::default(),
            stats_b: BotMatchStats::default(),
            bot_a_plays_white: true,
            game_index: 0,
            game_limit: None,
            records: Vec::new(),
            continuation: None,
        }
    }

    /// Cap the match below the full two-games-per-opening schedule.
    pub fn with_game_limit(mut self, limit: usize) -> Self {
        self.game_limit = Some(limit);
        self
    }

    pub fn start_new_bot_match(&mut self, bot_a: SharedBot, bot_b: SharedBot) -> ArenaResult<()> {
        self.orchestrator
            .end_game(GameResult::DrawByArbiter, EndOptions::silent());
        self.continuation = None;
        self.process_finished_games();

        self.game_index = 0;
        self.records.clear();

        let mut name_a = bot_a.name().to_owned();
        let mut name_b = bot_b.name().to_owned();
        if name_a == name_b {
            name_a.push_str(" (A)");
            name_b.push_str(" (B)");
        }
        info!("Starting new match: {name_a} vs {name_b}");

        self.stats_a = BotMatchStats::new(name_a);
        self.stats_b = BotMatchStats::new(name_b);
        self.bot_a_plays_white = true;

        let fen = self.fen_for_game(0)?;
        self.orchestrator.start_new_game(
            PlayerKind::Automated(bot_a),
            PlayerKind::Automated(bot_b),
            &fen,
        )
    }

    /// Start a single game outside of match scheduling. Games with a human
    /// always use the first start position.
    pub fn start_new_game(&mut self, white: PlayerKind, black: PlayerKind) -> ArenaResult<()> {
        let involves_human =
            matches!(white, PlayerKind::Human(_)) || matches!(black, PlayerKind::Human(_));
        let fen = if involves_human {
            self.fen_at(0)?
        } else {
            // Past the end of a finished match the openings start over.
            self.fen_at((self.game_index / 2) % self.start_fens.len().max(1))?
        };
        self.orchestrator.start_new_game(white, black, &fen)
    }

    pub fn update(&mut self, elapsed: Duration) -> ArenaResult<()> {
        let outcome = self.orchestrator.update(elapsed);
        self.advance_continuation(elapsed)?;
        self.process_finished_games();
        outcome
    }

    /// End the current game without scheduling another one.
    pub fn halt_match(&mut self) {
        self.continuation = None;
        self.orchestrator
            .end_game(GameResult::DrawByArbiter, EndOptions::silent());
        self.process_finished_games();
    }

    pub fn total_game_count(&self) -> usize {
        let full = self.start_fens.len() * 2;
        self.game_limit.map_or(full, |limit| limit.min(full))
    }

    /// One-based number of the game being played, or the last one once the
    /// match is over.
    pub fn current_game_number(&self) -> usize {
        self.total_game_count().min(self.game_index + 1)
    }

    pub fn is_match_complete(&self) -> bool {
        self.game_index >= self.total_game_count()
            && self.continuation.is_none()
            && !self.orchestrator.is_playing()
    }

    #[inline]
    pub fn orchestrator(&self) -> &TurnOrchestrator {
        &self.orchestrator
    }

    #[inline]
    pub fn orchestrator_mut(&mut self) -> &mut TurnOrchestrator {
        &mut self.orchestrator
    }

    #[inline]
    pub fn all_pgns(&self) -> &str {
        self.orchestrator.all_pgns()
    }

    #[inline]
    pub fn stats_a(&self) -> &BotMatchStats {
        &self.stats_a
    }

    #[inline]
    pub fn stats_b(&self) -> &BotMatchStats {
        &self.stats_b
    }

    #[inline]
    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn export_json(&self) -> ArenaResult<String> {
        let export = MatchExport {
            total_games: self.total_game_count(),
            games_played: self.records.len(),
            bot_a: &self.stats_a,
            bot_b: &self.stats_b,
            games: &self.records,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    fn fen_at(&self, idx: usize) -> ArenaResult<String> {
        self.start_fens
            .get(idx)
            .cloned()
            .ok_or_else(|| ArenaError::Config(format!("no start position for index {idx}")))
    }

    #[inline]
    fn fen_for_game(&self, game_index: usize) -> ArenaResult<String> {
        self.fen_at(game_index / 2)
    }

    fn advance_continuation(&mut self, elapsed: Duration) -> ArenaResult<()> {
        let Some(mut scheduled) = self.continuation.take() else {
            return Ok(());
        };

        if scheduled.epoch != self.orchestrator.epoch() {
            debug!("scheduled match game dropped: another game started first");
            return Ok(());
        }

        scheduled.remaining = scheduled.remaining.saturating_sub(elapsed);
        if !scheduled.remaining.is_zero() {
            self.continuation = Some(scheduled);
            return Ok(());
        }

        let fen = self.fen_for_game(self.game_index)?;
        self.orchestrator.start_new_game(
            PlayerKind::Automated(scheduled.white),
            PlayerKind::Automated(scheduled.black),
            &fen,
        )
    }

    fn process_finished_games(&mut self) {
        for game in self.orchestrator.take_finished() {
            if game.is_bot_vs_bot() {
                self.record_bot_game(game);
            }
        }
    }

    fn record_bot_game(&mut self, game: FinishedGame) {
        let a_white = self.bot_a_plays_white;
        self.stats_a.record(game.result, a_white);
        self.stats_b.record(game.result, !a_white);

        self.records.push(MatchRecord {
            game_number: self.game_index + 1,
            start_fen: game.start_fen.clone(),
            white: game.white_name.clone(),
            black: game.black_name.clone(),
            bot_a_played_white: a_white,
            result: game.result,
            plies: game.ply_count,
        });
        self.game_index += 1;

        if !game.auto_continue {
            return;
        }

        if self.game_index < self.total_game_count() {
            self.bot_a_plays_white = !self.bot_a_plays_white;
            if let (Some(white), Some(black)) = (game.white_bot, game.black_bot) {
                // Same two bots, colours swapped.
                self.continuation = Some(ScheduledGame {
                    remaining: Duration::from_millis(self.orchestrator.settings().next_game_delay_ms),
                    epoch: game.epoch_after,
                    white: black,
                    black: white,
                });
            }
        } else {
            info!("Match finished");
        }
    }
}
