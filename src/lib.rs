//! Crate root module declarations for the fog-of-war chess arena.
//!
//! The arena runs games between human front ends and automated players under
//! fog of war: board state and move generation, the FEN and PGN codecs, the
//! visibility maps, the legality gate and result arbiter, player seats with
//! their clocks, and the orchestration layer that sequences turns, thinks off
//! the main thread and strings games together into matches.

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_state;
    pub mod position;
    pub mod position_key;
}

pub mod moves {
    pub mod attack_tables;
    pub mod chess_move;
}

pub mod move_generation {
    pub mod legal_move_generator;
    pub mod move_apply;
    pub mod move_generator;
    pub mod pseudo_legal;
    pub mod square_attacks;
}

pub mod codec {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod pgn;
}

pub mod fog {
    pub mod visibility;
}

pub mod arbiter {
    pub mod game_result;
    pub mod legality_gate;
}

pub mod players {
    pub mod bot;
    pub mod clock;
    pub mod player;

    pub mod bots {
        pub mod greedy_bot;
        pub mod random_bot;
        pub mod scripted_bot;
    }
}

pub mod orchestrator {
    pub mod match_sequencer;
    pub mod session;
    pub mod thinking;
    pub mod turn_orchestrator;
}

pub mod config;
pub mod errors;
pub mod logging;
