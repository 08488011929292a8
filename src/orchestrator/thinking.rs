//! Off-thread move computation for automated players.
//!
//! Each game gets one worker thread bound to the epoch it was spawned under.
//! The worker parks on its request channel, checks the epoch before and after
//! asking the bot, and sends epoch-tagged results back. The orchestrator drains
//! those on its own thread and drops anything from an older epoch, so the
//! board is only ever touched there.
//!
//! Faults (an `Err` from the bot or a panic) go into a single slot that the
//! orchestrator empties during `update()`. A newer fault overwrites an older
//! one that has not been collected yet.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::errors::BotFault;
use crate::game_state::chess_types::Color;
use crate::moves::chess_move::ChessMove;
use crate::orchestrator::session::EpochCounter;
use crate::players::bot::{BotTimer, BotView};
use crate::players::player::SharedBot;

/// One request to think, for the side to move of the session in `epoch`.
pub struct ThinkRequest {
    pub epoch: u64,
    pub color: Color,
    pub player_name: String,
    pub bot: SharedBot,
    pub view: BotView,
    pub timer: BotTimer,
}

/// A computed move, tagged with the epoch it was computed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThoughtMove {
    pub epoch: u64,
    pub color: Color,
    pub mv: ChessMove,
    pub think_time: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct FaultSlot(Arc<Mutex<Option<BotFault>>>);

impl FaultSlot {
    pub fn store(&self, fault: BotFault) {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(fault) {
            warn!("uncollected fault replaced: {previous}");
        }
    }

    pub fn take(&self) -> Option<BotFault> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

pub struct ThinkingController {
    epoch: EpochCounter,
    requests: Option<Sender<ThinkRequest>>,
    results_tx: Sender<ThoughtMove>,
    results_rx: Receiver<ThoughtMove>,
    faults: FaultSlot,
}

impl ThinkingController {
    pub fn new(epoch: EpochCounter) -> Self {
        let (results_tx, results_rx) = mpsc::channel();
        Self {
            epoch,
            requests: None,
            results_tx,
            results_rx,
            faults: FaultSlot::default(),
        }
    }

    /// Retire the current worker and spawn one bound to `epoch`.
    ///
    /// Dropping the old request sender wakes a parked worker, which then
    /// exits. A worker that is mid-computation finishes and discards its
    /// result on the post-computation epoch check.
    pub fn respawn(&mut self, epoch: u64) {
        self.retire();

        let (request_tx, request_rx) = mpsc::channel();
        let shared_epoch = self.epoch.clone();
        let results = self.results_tx.clone();
        let faults = self.faults.clone();

        let spawned = thread::Builder::new()
            .name(format!("bot-thinker-{epoch}"))
            .spawn(move || worker_loop(epoch, shared_epoch, request_rx, results, faults));

        match spawned {
            Ok(_) => self.requests = Some(request_tx),
            Err(e) => error!("failed to spawn thinking worker: {e}"),
        }
    }

    pub fn retire(&mut self) {
        self.requests = None;
    }

    #[inline]
    pub fn has_worker(&self) -> bool {
        self.requests.is_some()
    }

    /// Wake the worker with a request. Returns the request back if there is no
    /// live worker to take it.
    pub fn request(&self, request: ThinkRequest) -> Result<(), ThinkRequest> {
        match &self.requests {
            Some(sender) => sender.send(request).map_err(|e| e.0),
            None => Err(request),
        }
    }

    /// Everything the workers delivered since the last call, in arrival order.
    pub fn drain_results(&self) -> Vec<ThoughtMove> {
        self.results_rx.try_iter().collect()
    }

    #[inline]
    pub fn faults(&self) -> &FaultSlot {
        &self.faults
    }

    #[inline]
    pub fn take_fault(&self) -> Option<BotFault> {
        self.faults.take()
    }
}

fn worker_loop(
    captured_epoch: u64,
    epoch: EpochCounter,
    requests: Receiver<ThinkRequest>,
    results: Sender<ThoughtMove>,
    faults: FaultSlot,
) {
    debug!("thinking worker for epoch {captured_epoch} started");

    while let Ok(request) = requests.recv() {
        if !epoch.is_current(captured_epoch) || request.epoch != captured_epoch {
            debug!("stale think request for epoch {} ignored", request.epoch);
            continue;
        }

        let started = Instant::now();
        let outcome = compute_move(&request);
        let think_time = started.elapsed();

        let mv = match outcome {
            Ok(mv) => mv,
            Err(fault) => {
                // Stored even when the game has moved on.
                error!("{fault}");
                faults.store(fault);
                if !epoch.is_current(captured_epoch) {
                    break;
                }
                continue;
            }
        };

        if !epoch.is_current(captured_epoch) {
            debug!(
                "'{}' finished after epoch {captured_epoch} ended; result discarded",
                request.player_name
            );
            break;
        }

        let delivered = results.send(ThoughtMove {
            epoch: captured_epoch,
            color: request.color,
            mv,
            think_time,
        });
        if delivered.is_err() {
            break;
        }
    }

    debug!("thinking worker for epoch {captured_epoch} exiting");
}

/// Ask the bot for a move, turning an `Err` or a panic into a `BotFault`.
pub fn compute_move(request: &ThinkRequest) -> Result<ChessMove, BotFault> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut bot = request.bot.lock();
        bot.compute_move(&request.view, &request.timer)
    }));

    let message = match outcome {
        Ok(Ok(mv)) => return Ok(mv),
        Ok(Err(message)) => message,
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };

    Err(BotFault {
        player: request.player_name.clone(),
        message,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
