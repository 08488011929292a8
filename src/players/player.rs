//! Player bindings: a tagged union over human and automated players, each
//! carrying its own clock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use log::debug;

use crate::players::bot::Bot;
use crate::players::clock::Clock;

/// A bot shared between its session and the thinking worker.
///
/// The name is read once at construction so it can be asked for while a
/// worker holds the bot for a whole computation.
#[derive(Clone)]
pub struct SharedBot {
    name: Arc<str>,
    bot: Arc<Mutex<Box<dyn Bot>>>,
}

impl SharedBot {
    pub fn new(bot: Box<dyn Bot>) -> Self {
        Self {
            name: Arc::from(bot.name()),
            bot: Arc::new(Mutex::new(bot)),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block until the bot is free. Only worker threads and the synchronous
    /// path call this.
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn Bot>> {
        self.bot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The bot, unless a computation currently holds it.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, Box<dyn Bot>>> {
        match self.bot.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

pub fn share_bot(bot: impl Bot + 'static) -> SharedBot {
    SharedBot::new(Box::new(bot))
}

/// Front end for a human seat. Moves come back through the orchestrator's
/// `submit_human_move`.
pub trait HumanInterface: Send {
    /// Position as this player may see it: the fogged board field when fog of
    /// war is on, otherwise the full FEN.
    fn set_position(&mut self, fen: &str);

    fn notify_turn_to_move(&mut self);
}

/// Who sits at a colour when a game starts.
pub enum PlayerKind {
    Human(Box<dyn HumanInterface>),
    Automated(SharedBot),
}

pub struct HumanPlayer {
    pub interface: Box<dyn HumanInterface>,
    pub clock: Clock,
}

pub struct AutomatedPlayer {
    pub name: String,
    pub bot: SharedBot,
    pub clock: Clock,
}

pub enum Player {
    Human(HumanPlayer),
    Automated(AutomatedPlayer),
}

impl Player {
    pub fn bind(kind: PlayerKind, game_duration_ms: u64) -> Self {
        let clock = Clock::new(game_duration_ms);
        match kind {
            PlayerKind::Human(interface) => Player::Human(HumanPlayer { interface, clock }),
            PlayerKind::Automated(bot) => Player::Automated(AutomatedPlayer {
                name: bot.name().to_owned(),
                bot,
                clock,
            }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Player::Human(_) => "Human",
            Player::Automated(player) => &player.name,
        }
    }

    #[inline]
    pub fn is_human(&self) -> bool {
        matches!(self, Player::Human(_))
    }

    #[inline]
    pub fn is_automated(&self) -> bool {
        matches!(self, Player::Automated(_))
    }

    pub fn clock(&self) -> &Clock {
        match self {
            Player::Human(player) => &player.clock,
            Player::Automated(player) => &player.clock,
        }
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        match self {
            Player::Human(player) => &mut player.clock,
            Player::Automated(player) => &mut player.clock,
        }
    }

    pub fn shared_bot(&self) -> Option<SharedBot> {
        match self {
            Player::Human(_) => None,
            Player::Automated(player) => Some(player.bot.clone()),
        }
    }

    /// Run the bot's stop hook unless it is still busy on a worker; a busy
    /// bot finishes its computation and the result is discarded as stale.
    pub fn stop(&self) {
        let Player::Automated(player) = self else {
            return;
        };
        match player.bot.try_lock() {
            Some(mut bot) => bot.stop(),
            None => debug!("'{}' is still thinking; skipping stop hook", player.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{share_bot, HumanInterface, Player, PlayerKind};
    use crate::moves::chess_move::ChessMove;
    use crate::players::bot::{Bot, BotTimer, BotView};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingBot {
        stops: Arc<AtomicUsize>,
    }

    impl Bot for CountingBot {
        fn name(&self) -> &str {
            "Counter"
        }

        fn compute_move(&mut self, _view: &BotView, _timer: &BotTimer) -> Result<ChessMove, String> {
            Err("not used".to_owned())
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct SilentHuman;

    impl HumanInterface for SilentHuman {
        fn set_position(&mut self, _fen: &str) {}
        fn notify_turn_to_move(&mut self) {}
    }

    #[test]
    fn bindings_carry_names_and_fresh_clocks() {
        let stops = Arc::new(AtomicUsize::new(0));
        let bot = Player::bind(
            PlayerKind::Automated(share_bot(CountingBot { stops: stops.clone() })),
            5_000,
        );
        let human = Player::bind(PlayerKind::Human(Box::new(SilentHuman)), 5_000);

        assert_eq!(bot.name(), "Counter");
        assert_eq!(human.name(), "Human");
        assert!(bot.is_automated() && human.is_human());
        assert_eq!(bot.clock().remaining_ms(), 5_000);
        assert!(human.shared_bot().is_none());

        bot.stop();
        human.stop();
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn busy_bot_skips_stop_hook() {
        let stops = Arc::new(AtomicUsize::new(0));
        let shared = share_bot(CountingBot { stops: stops.clone() });
        let player = Player::bind(PlayerKind::Automated(shared.clone()), 1_000);

        let guard = shared.lock();
        player.stop();
        drop(guard);
        assert_eq!(stops.load(Ordering::SeqCst), 0);
    }
}
