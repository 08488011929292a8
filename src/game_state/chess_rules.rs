//! Canonical chess-rule constants.
//!
//! Holds the standard starting FEN, the rule thresholds used by the result
//! evaluator, and the default opening list for automated-player matches.

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Half-move clock value at which the fifty-move rule draws the game.
pub const FIFTY_MOVE_RULE_PLIES: u32 = 100;

/// Number of occurrences of one position that draws by repetition.
pub const REPETITION_DRAW_COUNT: usize = 3;

/// File letters in board order, used for square names and en-passant files.
pub const FILE_NAMES: &str = "abcdefgh";

/// Opening positions for bot matches; each is played twice with colors swapped.
pub const DEFAULT_MATCH_FENS: &[&str] = &[
    STARTING_POSITION_FEN,
    "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
    "rnbqkb1r/pppppppp/5n2/8/3P4/8/PPP1PPPP/RNBQKBNR w KQkq - 1 2",
    "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2",
    "rnbqkbnr/ppp1pppp/8/3p4/2PP4/8/PP2PPPP/RNBQKBNR b KQkq c3 0 2",
    "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
];
