//! Turn sequencing for one game at a time.
//!
//! `Idle -> AwaitingMove` on `start_new_game`. A chosen move goes through the
//! legality gate; an illegal one ends the game against its proposer. A legal
//! human move is applied at once, a legal automated move waits for the
//! minimum move delay and is applied by a later `update()`. After every
//! applied move both fog maps are refreshed, the mover gets the increment and
//! the result evaluator decides between the next turn and `Ended`.
//!
//! The caller drives time through `update(elapsed)`. It charges the side to
//! move, ends the game on a flag fall, plays due moves, and re-raises a stored
//! automated-player fault.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::arbiter::game_result::{GameResult, ResultEvaluator, StandardArbiter};
use crate::arbiter::legality_gate::is_legal;
use crate::codec::fen_generator::{encode_fen, encode_fogged_fen};
use crate::codec::long_algebraic::move_to_long_algebraic;
use crate::codec::pgn::{write_pgn, PgnTags};
use crate::config::ArenaSettings;
use crate::errors::ArenaResult;
use crate::fog::visibility::{refresh_both_sides, FogMaps};
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_generator::StandardMoveGenerator;
use crate::move_generation::move_generator::MoveGenerator;
use crate::moves::chess_move::ChessMove;
use crate::orchestrator::session::{EpochCounter, GameSession};
use crate::orchestrator::thinking::{compute_move, ThinkRequest, ThinkingController, ThoughtMove};
use crate::players::bot::{BotTimer, BotView};
use crate::players::player::{Player, PlayerKind, SharedBot};

const PGN_EVENT: &str = "Fog Arena Game";

/// Ended games kept until `take_finished` collects them; older ones are
/// dropped first.
const MAX_UNCOLLECTED_GAMES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingMove,
    ApplyingMove,
    Ended,
}

/// How a game end is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOptions {
    pub log: bool,
    /// Whether a bot match may schedule its next game from this end.
    pub auto_continue: bool,
}

impl Default for EndOptions {
    fn default() -> Self {
        Self {
            log: true,
            auto_continue: true,
        }
    }
}

impl EndOptions {
    pub fn silent() -> Self {
        Self {
            log: false,
            auto_continue: false,
        }
    }
}

/// Summary of a game that just ended, collected by the match sequencer.
#[derive(Clone)]
pub struct FinishedGame {
    pub result: GameResult,
    pub white_name: String,
    pub black_name: String,
    pub white_bot: Option<SharedBot>,
    pub black_bot: Option<SharedBot>,
    pub start_fen: String,
    pub ply_count: usize,
    pub auto_continue: bool,
    /// Epoch value right after the end; a continuation is only valid while
    /// it is still current.
    pub epoch_after: u64,
}

impl FinishedGame {
    #[inline]
    pub fn is_bot_vs_bot(&self) -> bool {
        self.white_bot.is_some() && self.black_bot.is_some()
    }
}

pub struct TurnOrchestrator {
    settings: ArenaSettings,
    generator: Box<dyn MoveGenerator>,
    evaluator: Box<dyn ResultEvaluator>,
    epoch: EpochCounter,
    thinking: ThinkingController,
    session: Option<GameSession>,
    state: TurnState,
    pending_move: Option<ChessMove>,
    since_last_move: Duration,
    pgns: String,
    games_finished: u32,
    finished: VecDeque<FinishedGame>,
}

impl TurnOrchestrator {
    pub fn new(settings: ArenaSettings) -> Self {
        Self::with_collaborators(
            settings,
            Box::new(StandardMoveGenerator),
            Box::new(StandardArbiter::new(StandardMoveGenerator)),
        )
    }

    pub fn with_collaborators(
        settings: ArenaSettings,
        generator: Box<dyn MoveGenerator>,
        evaluator: Box<dyn ResultEvaluator>,
    ) -> Self {
        let epoch = EpochCounter::new();
        Self {
            settings,
            generator,
            evaluator,
            thinking: ThinkingController::new(epoch.clone()),
            epoch,
            session: None,
            state: TurnState::Idle,
            pending_move: None,
            since_last_move: Duration::ZERO,
            pgns: String::new(),
            games_finished: 0,
            finished: VecDeque::new(),
        }
    }

    pub fn start_new_game(
        &mut self,
        white: PlayerKind,
        black: PlayerKind,
        start_fen: &str,
    ) -> ArenaResult<()> {
        let mut board = GameState::from_fen(start_fen)?;

        self.end_game(GameResult::DrawByArbiter, EndOptions::silent());
        let epoch = self.epoch.advance();

        if self.settings.run_bots_on_separate_thread {
            self.thinking.respawn(epoch);
        } else {
            self.thinking.retire();
        }

        if let Some(previous) = self.session.take() {
            previous.white.stop();
            previous.black.stop();
        }

        let fog = refresh_both_sides(self.generator.as_ref(), &mut board)?;
        let duration = self.settings.game_duration_ms;
        let session = GameSession {
            epoch,
            board,
            white: Player::bind(white, duration),
            black: Player::bind(black, duration),
            playing: true,
            start_fen: start_fen.trim().to_owned(),
            moves: Vec::new(),
            fog,
        };
        debug!(
            "game {epoch} started: {} vs {} from '{}'",
            session.white.name(),
            session.black.name(),
            session.start_fen
        );

        self.session = Some(session);
        self.state = TurnState::AwaitingMove;
        self.pending_move = None;
        self.since_last_move = Duration::ZERO;

        self.notify_turn_to_move()
    }

    /// Entry point for moves from a human seat.
    pub fn submit_human_move(&mut self, mv: ChessMove) -> ArenaResult<()> {
        let human_to_move = self
            .session
            .as_ref()
            .is_some_and(|s| s.playing && s.player_to_move().is_human());
        if !human_to_move {
            warn!(
                "human move {} ignored: not a human's turn",
                move_to_long_algebraic(mv)
            );
            return Ok(());
        }
        self.on_move_chosen(mv)
    }

    pub fn update(&mut self, elapsed: Duration) -> ArenaResult<()> {
        for thought in self.thinking.drain_results() {
            self.on_thought(thought)?;
        }

        if self.is_playing() {
            self.since_last_move = self.since_last_move.saturating_add(elapsed);

            let flagged = self.session.as_mut().and_then(|session| {
                let side = session.board.side_to_move;
                let clock = session.player_mut(side).clock_mut();
                clock.tick(elapsed);
                clock.is_flagged().then_some(side)
            });

            if let Some(side) = flagged {
                self.end_game(GameResult::timeout_for(side), EndOptions::default());
            } else if self.pending_move.is_some() && self.since_last_move >= self.min_move_delay() {
                if let Some(mv) = self.pending_move.take() {
                    self.play_move(mv)?;
                }
            }
        }

        if let Some(fault) = self.thinking.take_fault() {
            return Err(fault.into());
        }
        Ok(())
    }

    /// End the current game. Returns `false` when no game was being played.
    pub fn end_game(&mut self, result: GameResult, options: EndOptions) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.playing {
            return false;
        }

        session.playing = false;
        self.pending_move = None;
        self.state = TurnState::Ended;
        let epoch_after = self.epoch.advance();

        if options.log {
            info!("Game over: {result:?}");
        }

        self.games_finished += 1;
        let tags = PgnTags {
            event: PGN_EVENT.to_owned(),
            round: self.games_finished,
            white: session.white.name().to_owned(),
            black: session.black.name().to_owned(),
            result: result.pgn_result_string().to_owned(),
        };
        match write_pgn(&session.start_fen, &session.moves, &tags) {
            Ok(pgn) => {
                self.pgns.push_str(&pgn);
                self.pgns.push('\n');
            }
            Err(e) => warn!("could not record PGN for game {}: {e}", session.epoch),
        }

        if self.finished.len() == MAX_UNCOLLECTED_GAMES {
            if let Some(dropped) = self.finished.pop_front() {
                debug!("uncollected result {:?} dropped", dropped.result);
            }
        }
        self.finished.push_back(FinishedGame {
            result,
            white_name: tags.white,
            black_name: tags.black,
            white_bot: session.white.shared_bot(),
            black_bot: session.black.shared_bot(),
            start_fen: session.start_fen.clone(),
            ply_count: session.moves.len(),
            auto_continue: options.auto_continue,
            epoch_after,
        });
        true
    }

    #[inline]
    pub fn state(&self) -> TurnState {
        self.state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.playing)
    }

    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch.current()
    }

    #[inline]
    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    #[inline]
    pub fn board(&self) -> Option<&GameState> {
        self.session.as_ref().map(|s| &s.board)
    }

    #[inline]
    pub fn fog_maps(&self) -> Option<FogMaps> {
        self.session.as_ref().map(|s| s.fog)
    }

    #[inline]
    pub fn pending_move(&self) -> Option<ChessMove> {
        self.pending_move
    }

    #[inline]
    pub fn settings(&self) -> &ArenaSettings {
        &self.settings
    }

    /// Every recorded game so far, as one PGN text.
    #[inline]
    pub fn all_pgns(&self) -> &str {
        &self.pgns
    }

    /// Games ended since the last call, oldest first.
    pub fn take_finished(&mut self) -> Vec<FinishedGame> {
        self.finished.drain(..).collect()
    }

    #[inline]
    fn min_move_delay(&self) -> Duration {
        Duration::from_millis(self.settings.min_move_delay_ms)
    }

    fn notify_turn_to_move(&mut self) -> ArenaResult<()> {
        let fog_of_war = self.settings.fog_of_war;
        let en_passant_policy = self.settings.en_passant_policy;
        let game_duration_ms = self.settings.game_duration_ms;
        let increment_ms = self.settings.increment_ms;

        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if !session.playing {
            return Ok(());
        }

        let side = session.board.side_to_move;
        let visibility = session.fog.for_color(side);
        let (seat, opponent) = match side {
            Color::White => (&mut session.white, &session.black),
            Color::Black => (&mut session.black, &session.white),
        };

        let request = match seat {
            Player::Human(human) => {
                let fen = if fog_of_war {
                    encode_fogged_fen(&session.board, visibility.bits())
                } else {
                    encode_fen(&session.board, en_passant_policy)
                };
                human.interface.set_position(&fen);
                human.interface.notify_turn_to_move();
                return Ok(());
            }
            Player::Automated(player) => ThinkRequest {
                epoch: session.epoch,
                color: side,
                player_name: player.name.clone(),
                bot: player.bot.clone(),
                view: if fog_of_war {
                    BotView::new(&session.board, side, visibility)
                } else {
                    BotView::unfogged(&session.board, side)
                },
                timer: BotTimer {
                    own_remaining_ms: player.clock.remaining_ms_clamped(),
                    opponent_remaining_ms: opponent.clock().remaining_ms_clamped(),
                    game_duration_ms,
                    increment_ms,
                },
            },
        };

        if !self.thinking.has_worker() {
            return self.think_synchronously(request);
        }
        match self.thinking.request(request) {
            Ok(()) => Ok(()),
            Err(request) => {
                warn!("thinking worker unavailable; computing on the calling thread");
                self.think_synchronously(request)
            }
        }
    }

    /// Run the bot here and charge its thinking time to its clock.
    fn think_synchronously(&mut self, request: ThinkRequest) -> ArenaResult<()> {
        let started = Instant::now();
        let outcome = compute_move(&request);
        let think_time = started.elapsed();

        if let Some(session) = self.session.as_mut() {
            session.player_mut(request.color).clock_mut().tick(think_time);
        }

        match outcome {
            Ok(mv) => self.on_move_chosen(mv),
            Err(fault) => {
                error!("{fault}");
                self.thinking.faults().store(fault);
                Ok(())
            }
        }
    }

    fn on_thought(&mut self, thought: ThoughtMove) -> ArenaResult<()> {
        let awaited = self.session.as_ref().is_some_and(|s| {
            s.playing
                && s.epoch == thought.epoch
                && s.board.side_to_move == thought.color
                && s.player_to_move().is_automated()
        });

        if awaited && self.epoch.is_current(thought.epoch) {
            debug!(
                "{:?} thought for {} ms",
                thought.color,
                thought.think_time.as_millis()
            );
            self.on_move_chosen(thought.mv)
        } else {
            debug!(
                "stale move {} from epoch {} discarded",
                move_to_long_algebraic(thought.mv),
                thought.epoch
            );
            Ok(())
        }
    }

    fn on_move_chosen(&mut self, mv: ChessMove) -> ArenaResult<()> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        if !session.playing || self.state != TurnState::AwaitingMove {
            debug!("move {} ignored: no move awaited", move_to_long_algebraic(mv));
            return Ok(());
        }

        let side = session.board.side_to_move;
        if !is_legal(self.generator.as_ref(), &session.board, mv)? {
            error!(
                "Illegal move: {} in position: {}",
                move_to_long_algebraic(mv),
                session.board.get_fen()
            );
            self.end_game(GameResult::illegal_move_by(side), EndOptions::default());
            return Ok(());
        }

        self.state = TurnState::ApplyingMove;
        if session.player(side).is_automated() {
            self.pending_move = Some(mv);
            Ok(())
        } else {
            self.play_move(mv)
        }
    }

    fn play_move(&mut self, mv: ChessMove) -> ArenaResult<()> {
        let increment_ms = self.settings.increment_ms;
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if !session.playing {
            return Ok(());
        }

        let mover = session.board.side_to_move;
        self.since_last_move = Duration::ZERO;

        session.board.make_move(mv)?;
        session.moves.push(mv);
        session.fog = refresh_both_sides(self.generator.as_ref(), &mut session.board)?;
        session.player_mut(mover).clock_mut().add_increment(increment_ms);

        let result = self.evaluator.evaluate(&session.board)?;
        if result.is_finished() {
            self.end_game(result, EndOptions::default());
            Ok(())
        } else {
            self.state = TurnState::AwaitingMove;
            self.notify_turn_to_move()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EndOptions, TurnOrchestrator, TurnState};
    use crate::arbiter::game_result::GameResult;
    use crate::config::ArenaSettings;
    use crate::errors::ArenaError;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::Color;
    use crate::moves::chess_move::ChessMove;
    use crate::players::bot::{Bot, BotTimer, BotView};
    use crate::players::bots::scripted_bot::ScriptedBot;
    use crate::players::player::{share_bot, HumanInterface, PlayerKind};
    use std::sync::{mpsc, Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};

    const TICK: Duration = Duration::from_millis(10);

    fn sync_settings() -> ArenaSettings {
        ArenaSettings {
            run_bots_on_separate_thread: false,
            ..ArenaSettings::default()
        }
    }

    fn scripted(name: &str, moves: &[&str]) -> PlayerKind {
        PlayerKind::Automated(share_bot(ScriptedBot::new(name, moves.iter().copied())))
    }

    #[derive(Clone, Default)]
    struct RecordingHuman {
        positions: Arc<Mutex<Vec<String>>>,
        turns: Arc<Mutex<usize>>,
    }

    impl HumanInterface for RecordingHuman {
        fn set_position(&mut self, fen: &str) {
            self.positions.lock().expect("lock").push(fen.to_owned());
        }

        fn notify_turn_to_move(&mut self) {
            *self.turns.lock().expect("lock") += 1;
        }
    }

    struct PanickingBot;

    impl Bot for PanickingBot {
        fn name(&self) -> &str {
            "Panicky"
        }

        fn compute_move(&mut self, _view: &BotView, _timer: &BotTimer) -> Result<ChessMove, String> {
            panic!("bot exploded");
        }
    }

    struct GatedBot {
        gate: mpsc::Receiver<()>,
        started: mpsc::Sender<()>,
    }

    impl Bot for GatedBot {
        fn name(&self) -> &str {
            "Gated"
        }

        fn compute_move(&mut self, view: &BotView, _timer: &BotTimer) -> Result<ChessMove, String> {
            let _ = self.started.send(());
            self.gate.recv().map_err(|e| e.to_string())?;
            ChessMove::from_uci("e2e4", &view.board).map_err(|e| e.to_string())
        }
    }

    fn pump_until_over(orchestrator: &mut TurnOrchestrator, max_ticks: usize) {
        for _ in 0..max_ticks {
            if !orchestrator.is_playing() {
                return;
            }
            orchestrator.update(TICK).expect("update should succeed");
        }
    }

    #[test]
    fn scripted_fools_mate_ends_with_black_win_and_pgn() {
        let mut orchestrator = TurnOrchestrator::new(sync_settings());
        orchestrator
            .start_new_game(
                scripted("White", &["f2f3", "g2g4"]),
                scripted("Black", &["e7e5", "d8h4"]),
                STARTING_POSITION_FEN,
            )
            .expect("game should start");
        assert_eq!(orchestrator.state(), TurnState::ApplyingMove);

        pump_until_over(&mut orchestrator, 20);

        assert_eq!(orchestrator.state(), TurnState::Ended);
        let finished = orchestrator.take_finished();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].result, GameResult::BlackWins);
        assert_eq!(finished[0].ply_count, 4);
        assert!(finished[0].is_bot_vs_bot());
        assert!(orchestrator
            .all_pgns()
            .contains("1. f2f3 e7e5 2. g2g4 d8h4 0-1"));
    }

    #[test]
    fn illegal_proposal_forfeits_without_touching_the_board() {
        let mut orchestrator = TurnOrchestrator::new(sync_settings());
        orchestrator
            .start_new_game(
                scripted("Cheater", &["e2e5"]),
                scripted("Black", &[]),
                STARTING_POSITION_FEN,
            )
            .expect("game should start");

        assert!(!orchestrator.is_playing());
        let finished = orchestrator.take_finished();
        assert_eq!(finished[0].result, GameResult::WhiteIllegalMove);
        assert_eq!(
            orchestrator.board().expect("board").get_fen(),
            STARTING_POSITION_FEN
        );
    }

    #[test]
    fn human_sees_fogged_board_and_moves_apply_immediately() {
        let human = RecordingHuman::default();
        let mut orchestrator = TurnOrchestrator::new(sync_settings());
        orchestrator
            .start_new_game(
                PlayerKind::Human(Box::new(human.clone())),
                scripted("Black", &["e7e5"]),
                STARTING_POSITION_FEN,
            )
            .expect("game should start");

        assert_eq!(
            human.positions.lock().expect("lock")[0],
            "????????/????????/????????/????????/8/8/PPPPPPPP/RNBQKBNR"
        );
        assert_eq!(*human.turns.lock().expect("lock"), 1);

        let board = orchestrator.board().expect("board").clone();
        let e2e4 = ChessMove::from_uci("e2e4", &board).expect("LAN");
        orchestrator.submit_human_move(e2e4).expect("human move");
        assert_eq!(orchestrator.session().expect("session").moves, vec![e2e4]);

        // Black answers synchronously; its move waits for the next tick.
        assert!(orchestrator.pending_move().is_some());
        orchestrator.update(TICK).expect("update");
        assert_eq!(orchestrator.session().expect("session").moves.len(), 2);
        assert_eq!(*human.turns.lock().expect("lock"), 2);
    }

    #[test]
    fn human_moves_are_ignored_on_a_bot_turn() {
        let mut orchestrator = TurnOrchestrator::new(ArenaSettings {
            min_move_delay_ms: 1_000,
            ..sync_settings()
        });
        orchestrator
            .start_new_game(
                scripted("White", &["e2e4"]),
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                STARTING_POSITION_FEN,
            )
            .expect("game should start");

        let board = orchestrator.board().expect("board").clone();
        let d2d4 = ChessMove::from_uci("d2d4", &board).expect("LAN");
        orchestrator.submit_human_move(d2d4).expect("ignored");
        assert!(orchestrator.session().expect("session").moves.is_empty());
        assert!(orchestrator.is_playing());
    }

    #[test]
    fn unmoved_human_loses_on_time() {
        let mut orchestrator = TurnOrchestrator::new(ArenaSettings {
            game_duration_ms: 1_000,
            ..sync_settings()
        });
        orchestrator
            .start_new_game(
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                STARTING_POSITION_FEN,
            )
            .expect("game should start");

        orchestrator.update(Duration::from_millis(600)).expect("update");
        assert!(orchestrator.is_playing());
        orchestrator.update(Duration::from_millis(400)).expect("update");
        assert!(!orchestrator.is_playing());
        assert_eq!(
            orchestrator.take_finished()[0].result,
            GameResult::WhiteTimeout
        );
    }

    #[test]
    fn automated_move_waits_for_min_delay_and_earns_increment() {
        let mut orchestrator = TurnOrchestrator::new(ArenaSettings {
            min_move_delay_ms: 500,
            increment_ms: 2_000,
            ..sync_settings()
        });
        orchestrator
            .start_new_game(
                scripted("White", &["e2e4"]),
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                STARTING_POSITION_FEN,
            )
            .expect("game should start");

        orchestrator.update(Duration::from_millis(300)).expect("update");
        assert_eq!(orchestrator.state(), TurnState::ApplyingMove);
        assert!(orchestrator.session().expect("session").moves.is_empty());

        orchestrator.update(Duration::from_millis(200)).expect("update");
        let session = orchestrator.session().expect("session");
        assert_eq!(session.moves.len(), 1);
        assert_eq!(orchestrator.state(), TurnState::AwaitingMove);

        let white_ms = session.player(Color::White).clock().remaining_ms();
        assert!(white_ms > 60_000 && white_ms <= 61_500, "{white_ms}");
        assert_eq!(session.player(Color::Black).clock().remaining_ms(), 60_000);
    }

    #[test]
    fn end_game_is_idempotent() {
        let mut orchestrator = TurnOrchestrator::new(sync_settings());
        assert!(!orchestrator.end_game(GameResult::DrawByArbiter, EndOptions::default()));

        orchestrator
            .start_new_game(
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                STARTING_POSITION_FEN,
            )
            .expect("game should start");
        let epoch_during = orchestrator.epoch();

        assert!(orchestrator.end_game(GameResult::DrawByArbiter, EndOptions::default()));
        assert!(!orchestrator.end_game(GameResult::WhiteWins, EndOptions::default()));
        assert!(orchestrator.epoch() > epoch_during);
        assert_eq!(orchestrator.take_finished().len(), 1);
    }

    #[test]
    fn bad_start_fen_leaves_current_game_running() {
        let mut orchestrator = TurnOrchestrator::new(sync_settings());
        orchestrator
            .start_new_game(
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                STARTING_POSITION_FEN,
            )
            .expect("game should start");

        let restart = orchestrator.start_new_game(
            PlayerKind::Human(Box::new(RecordingHuman::default())),
            PlayerKind::Human(Box::new(RecordingHuman::default())),
            "not a fen",
        );
        assert!(matches!(restart, Err(ArenaError::FenSyntax { .. })));
        assert!(orchestrator.is_playing());
    }

    #[test]
    fn threaded_bots_play_to_completion() {
        let mut orchestrator = TurnOrchestrator::new(ArenaSettings::default());
        orchestrator
            .start_new_game(
                scripted("White", &["f2f3", "g2g4"]),
                scripted("Black", &["e7e5", "d8h4"]),
                STARTING_POSITION_FEN,
            )
            .expect("game should start");

        let deadline = Instant::now() + Duration::from_secs(5);
        while orchestrator.is_playing() && Instant::now() < deadline {
            orchestrator.update(Duration::from_millis(1)).expect("update");
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(orchestrator.take_finished()[0].result, GameResult::BlackWins);
    }

    #[test]
    fn fault_is_raised_once_from_update() {
        let mut orchestrator = TurnOrchestrator::new(ArenaSettings::default());
        orchestrator
            .start_new_game(
                PlayerKind::Automated(share_bot(PanickingBot)),
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                STARTING_POSITION_FEN,
            )
            .expect("game should start");

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut raised = None;
        while raised.is_none() && Instant::now() < deadline {
            match orchestrator.update(Duration::from_millis(1)) {
                Err(ArenaError::BotFault(fault)) => raised = Some(fault),
                Err(other) => panic!("unexpected error: {other}"),
                Ok(()) => thread::sleep(Duration::from_millis(2)),
            }
        }

        let fault = raised.expect("fault should surface");
        assert_eq!(fault.player, "Panicky");
        assert!(fault.message.contains("bot exploded"));
        assert!(orchestrator.update(Duration::from_millis(1)).is_ok());
        assert!(orchestrator.session().expect("session").moves.is_empty());
    }

    #[test]
    fn synchronous_fault_is_deferred_to_update() {
        let mut orchestrator = TurnOrchestrator::new(sync_settings());
        orchestrator
            .start_new_game(
                scripted("Empty", &[]),
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                STARTING_POSITION_FEN,
            )
            .expect("start itself does not raise the fault");

        assert!(matches!(
            orchestrator.update(TICK),
            Err(ArenaError::BotFault(_))
        ));
        assert!(orchestrator.update(TICK).is_ok());
    }

    #[test]
    fn move_from_superseded_game_never_reaches_the_board() {
        let (release, gate) = mpsc::channel();
        let (started_tx, started_rx) = mpsc::channel();
        let mut orchestrator = TurnOrchestrator::new(ArenaSettings::default());
        orchestrator
            .start_new_game(
                PlayerKind::Automated(share_bot(GatedBot {
                    gate,
                    started: started_tx,
                })),
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                STARTING_POSITION_FEN,
            )
            .expect("first game should start");
        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("bot should start thinking");

        orchestrator
            .start_new_game(
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                STARTING_POSITION_FEN,
            )
            .expect("second game should start");
        release.send(()).expect("bot should be waiting");

        for _ in 0..50 {
            orchestrator.update(Duration::from_millis(1)).expect("update");
            thread::sleep(Duration::from_millis(2));
        }
        let session = orchestrator.session().expect("session");
        assert!(session.moves.is_empty());
        assert_eq!(session.board.get_fen(), STARTING_POSITION_FEN);
        assert!(orchestrator.is_playing());
    }

    #[test]
    fn restarting_with_a_bot_still_thinking_does_not_block() {
        let (release, gate) = mpsc::channel();
        let (started_tx, started_rx) = mpsc::channel();
        let bot = share_bot(GatedBot {
            gate,
            started: started_tx,
        });

        let mut orchestrator = TurnOrchestrator::new(ArenaSettings::default());
        orchestrator
            .start_new_game(
                PlayerKind::Automated(bot.clone()),
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                STARTING_POSITION_FEN,
            )
            .expect("first game should start");
        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("bot should start thinking");

        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            let _ = release.send(());
        });

        let started = Instant::now();
        orchestrator
            .start_new_game(
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                PlayerKind::Automated(bot),
                STARTING_POSITION_FEN,
            )
            .expect("second game should start");
        let blocked_for = started.elapsed();

        assert!(blocked_for < Duration::from_millis(250), "{blocked_for:?}");
        assert_eq!(
            orchestrator.session().expect("session").black.name(),
            "Gated"
        );
        releaser.join().expect("releaser should finish");
    }

    #[test]
    fn sub_millisecond_updates_still_run_the_clock_down() {
        let mut orchestrator = TurnOrchestrator::new(ArenaSettings {
            game_duration_ms: 1_000,
            ..sync_settings()
        });
        orchestrator
            .start_new_game(
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                PlayerKind::Human(Box::new(RecordingHuman::default())),
                STARTING_POSITION_FEN,
            )
            .expect("game should start");

        for _ in 0..1_111 {
            orchestrator.update(Duration::from_micros(900)).expect("update");
        }
        assert!(orchestrator.is_playing());

        orchestrator.update(Duration::from_micros(900)).expect("update");
        assert!(!orchestrator.is_playing());
        assert_eq!(
            orchestrator.take_finished()[0].result,
            GameResult::WhiteTimeout
        );
    }

    #[test]
    fn uncollected_results_are_capped_oldest_first() {
        let mut orchestrator = TurnOrchestrator::new(sync_settings());
        for _ in 0..20 {
            orchestrator
                .start_new_game(
                    PlayerKind::Human(Box::new(RecordingHuman::default())),
                    PlayerKind::Human(Box::new(RecordingHuman::default())),
                    STARTING_POSITION_FEN,
                )
                .expect("game should start");
            orchestrator.end_game(GameResult::DrawByArbiter, EndOptions::default());
        }

        let finished = orchestrator.take_finished();
        assert_eq!(finished.len(), super::MAX_UNCOLLECTED_GAMES);
        assert_eq!(
            finished.last().map(|g| g.epoch_after),
            Some(orchestrator.epoch())
        );
        assert!(orchestrator.take_finished().is_empty());
        assert_eq!(orchestrator.all_pgns().matches("[Event ").count(), 20);
    }
}
