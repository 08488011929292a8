use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};

use fog_arena::codec::fen_generator::{encode_fen, encode_fogged_fen, EnPassantPolicy};
use fog_arena::config::ArenaSettings;
use fog_arena::errors::{ArenaError, ArenaResult};
use fog_arena::fog::visibility::visibility_for;
use fog_arena::game_state::chess_types::{Color, GameState};
use fog_arena::logging::init_logging;
use fog_arena::move_generation::legal_move_generator::StandardMoveGenerator;
use fog_arena::orchestrator::match_sequencer::MatchSequencer;
use fog_arena::players::bots::greedy_bot::GreedyBot;
use fog_arena::players::bots::random_bot::RandomBot;
use fog_arena::players::player::{share_bot, SharedBot};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML); defaults apply to missing keys
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Play a bot-vs-bot match over the configured start positions
    Match {
        #[arg(long, default_value = "random")]
        bot_a: BotType,
        #[arg(long, default_value = "greedy")]
        bot_b: BotType,
        /// File with one start FEN per line
        #[arg(long)]
        fens: Option<PathBuf>,
        /// Stop after this many games
        #[arg(long)]
        games: Option<usize>,
        /// Simulation step in milliseconds
        #[arg(long, default_value_t = 10)]
        step_ms: u64,
        #[arg(long)]
        pgn_out: Option<PathBuf>,
        #[arg(long)]
        stats_out: Option<PathBuf>,
    },
    /// Re-encode a FEN, optionally as one side sees it under fog of war
    Fen {
        #[arg(long)]
        fen: String,
        #[arg(long)]
        fog_for: Option<Side>,
        #[arg(long)]
        ep: Option<EpMode>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BotType {
    Random,
    Greedy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Side {
    White,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EpMode {
    Always,
    Capturable,
}

impl BotType {
    fn build(self) -> SharedBot {
        match self {
            BotType::Random => share_bot(RandomBot::new()),
            BotType::Greedy => share_bot(GreedyBot::new()),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let settings = match cli.config.as_deref().map(ArenaSettings::load).transpose() {
        Ok(settings) => settings.unwrap_or_default(),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    init_logging(settings.log_level);
    info!("fog_arena {} starting", env!("CARGO_PKG_VERSION"));

    let outcome = match cli.mode {
        Mode::Match {
            bot_a,
            bot_b,
            fens,
            games,
            step_ms,
            pgn_out,
            stats_out,
        } => run_match(
            settings,
            MatchArgs {
                bot_a,
                bot_b,
                fens,
                games,
                step: Duration::from_millis(step_ms.max(1)),
                pgn_out,
                stats_out,
            },
        ),
        Mode::Fen { fen, fog_for, ep } => run_fen(&settings, &fen, fog_for, ep),
    };

    if let Err(e) = outcome {
        error!("{e}");
        std::process::exit(1);
    }
}

struct MatchArgs {
    bot_a: BotType,
    bot_b: BotType,
    fens: Option<PathBuf>,
    games: Option<usize>,
    step: Duration,
    pgn_out: Option<PathBuf>,
    stats_out: Option<PathBuf>,
}

fn run_match(mut settings: ArenaSettings, args: MatchArgs) -> ArenaResult<()> {
    if let Some(path) = &args.fens {
        settings = settings.with_start_fens_file(path)?;
    }

    let mut sequencer = MatchSequencer::new(settings)?;
    if let Some(limit) = args.games {
        sequencer = sequencer.with_game_limit(limit);
    }
    sequencer.start_new_bot_match(args.bot_a.build(), args.bot_b.build())?;

    let started = Instant::now();
    let mut last = started;
    while !sequencer.is_match_complete() {
        thread::sleep(args.step);
        let now = Instant::now();
        if let Err(e) = sequencer.update(now - last) {
            // A faulted bot stays in its game and loses on time.
            error!("{e}");
        }
        last = now;
    }
    info!(
        "{} games in {:.1}s",
        sequencer.records().len(),
        started.elapsed().as_secs_f64()
    );

    for stats in [sequencer.stats_a(), sequencer.stats_b()] {
        println!(
            "{:<16} W {:>3}  L {:>3}  D {:>3}  (timeouts {}, illegal {})",
            stats.bot_name, stats.wins, stats.losses, stats.draws, stats.timeouts, stats.illegal_moves
        );
    }

    if let Some(path) = &args.pgn_out {
        write_file(path, sequencer.all_pgns())?;
    }
    if let Some(path) = &args.stats_out {
        write_file(path, &sequencer.export_json()?)?;
    }
    Ok(())
}

fn run_fen(
    settings: &ArenaSettings,
    fen: &str,
    fog_for: Option<Side>,
    ep: Option<EpMode>,
) -> ArenaResult<()> {
    let mut board = GameState::from_fen(fen)?;

    let text = match fog_for {
        Some(side) => {
            let color = match side {
                Side::White => Color::White,
                Side::Black => Color::Black,
            };
            let visible = visibility_for(&StandardMoveGenerator, &mut board, color)?;
            encode_fogged_fen(&board, visible.bits())
        }
        None => {
            let policy = match ep {
                Some(EpMode::Always) => EnPassantPolicy::AlwaysInclude,
                Some(EpMode::Capturable) => EnPassantPolicy::OnlyIfCapturable,
                None => settings.en_passant_policy,
            };
            encode_fen(&board, policy)
        }
    };

    println!("{text}");
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> ArenaResult<()> {
    fs::write(path, contents).map_err(|source| ArenaError::Io {
        path: path.display().to_string(),
        source,
    })
}
