//! Pseudo-legal move enumeration, one routine per piece family.
//!
//! Moves obey piece movement rules but may leave the mover's king attacked.
//! Castling is only emitted when the king's start and transit squares are
//! safe, so that rule never needs to be re-checked by callers.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::square_attacks::is_square_attacked;
use crate::moves::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};
use crate::moves::chess_move::{ChessMove, MoveFlag};

const PROMOTION_FLAGS: [MoveFlag; 4] = [
    MoveFlag::PromoteToQueen,
    MoveFlag::PromoteToKnight,
    MoveFlag::PromoteToRook,
    MoveFlag::PromoteToBishop,
];

pub fn generate_pseudo_legal_moves(board: &GameState) -> Vec<ChessMove> {
    let mut out = Vec::with_capacity(64);
    generate_pawn_moves(board, &mut out);
    generate_piece_moves(board, PieceKind::Knight, &mut out);
    generate_piece_moves(board, PieceKind::Bishop, &mut out);
    generate_piece_moves(board, PieceKind::Rook, &mut out);
    generate_piece_moves(board, PieceKind::Queen, &mut out);
    generate_piece_moves(board, PieceKind::King, &mut out);
    generate_castling_moves(board, &mut out);
    out
}

fn generate_piece_moves(board: &GameState, kind: PieceKind, out: &mut Vec<ChessMove>) {
    let side = board.side_to_move;
    let own_occ = board.occupancy_by_color[side.index()];

    let mut pieces = board.pieces[side.index()][kind.index()];
    while pieces != 0 {
        let from = pieces.trailing_zeros() as Square;
        let reach = match kind {
            PieceKind::Knight => knight_attacks(from),
            PieceKind::Bishop => bishop_attacks(from, board.occupancy_all),
            PieceKind::Rook => rook_attacks(from, board.occupancy_all),
            PieceKind::Queen => queen_attacks(from, board.occupancy_all),
            PieceKind::King => king_attacks(from),
            PieceKind::Pawn => 0,
        };

        let mut targets = reach & !own_occ;
        while targets != 0 {
            let to = targets.trailing_zeros() as Square;
            out.push(ChessMove::new(from, to, MoveFlag::None));
            targets &= targets - 1;
        }

        pieces &= pieces - 1;
    }
}

fn generate_pawn_moves(board: &GameState, out: &mut Vec<ChessMove>) {
    let side = board.side_to_move;
    let enemy_occ = board.occupancy_by_color[side.opposite().index()];
    let empty = !board.occupancy_all;
    let (start_rank, promotion_rank) = match side {
        Color::White => (1, 7),
        Color::Black => (6, 0),
    };

    let mut pawns = board.pieces[side.index()][PieceKind::Pawn.index()];
    while pawns != 0 {
        let from = pawns.trailing_zeros() as Square;

        let one_step = match side {
            Color::White => from.checked_add(8).filter(|sq| *sq < 64),
            Color::Black => from.checked_sub(8),
        };

        if let Some(to) = one_step {
            if empty & (1u64 << to) != 0 {
                push_pawn_move(from, to, promotion_rank, out);

                if rank_of(from) == start_rank {
                    let two_step = match side {
                        Color::White => from + 16,
                        Color::Black => from - 16,
                    };
                    if empty & (1u64 << two_step) != 0 {
                        out.push(ChessMove::new(from, two_step, MoveFlag::PawnTwoUp));
                    }
                }
            }
        }

        let mut captures = pawn_attacks(side, from) & enemy_occ;
        while captures != 0 {
            let to = captures.trailing_zeros() as Square;
            push_pawn_move(from, to, promotion_rank, out);
            captures &= captures - 1;
        }

        if let Some(ep) = board.en_passant_square {
            if pawn_attacks(side, from) & (1u64 << ep) != 0 {
                out.push(ChessMove::new(from, ep, MoveFlag::EnPassantCapture));
            }
        }

        pawns &= pawns - 1;
    }
}

fn push_pawn_move(from: Square, to: Square, promotion_rank: u8, out: &mut Vec<ChessMove>) {
    if rank_of(to) == promotion_rank {
        out.extend(PROMOTION_FLAGS.iter().map(|flag| ChessMove::new(from, to, *flag)));
    } else {
        out.push(ChessMove::new(from, to, MoveFlag::None));
    }
}

struct CastleRoute {
    right: CastlingRights,
    king_from: Square,
    king_to: Square,
    must_be_empty: Bitboard,
    must_be_safe: [Square; 2],
}

const WHITE_ROUTES: [CastleRoute; 2] = [
    CastleRoute {
        right: CASTLE_WHITE_KINGSIDE,
        king_from: 4,
        king_to: 6,
        must_be_empty: (1 << 5) | (1 << 6),
        must_be_safe: [5, 6],
    },
    CastleRoute {
        right: CASTLE_WHITE_QUEENSIDE,
        king_from: 4,
        king_to: 2,
        must_be_empty: (1 << 1) | (1 << 2) | (1 << 3),
        must_be_safe: [3, 2],
    },
];

const BLACK_ROUTES: [CastleRoute; 2] = [
    CastleRoute {
        right: CASTLE_BLACK_KINGSIDE,
        king_from: 60,
        king_to: 62,
        must_be_empty: (1 << 61) | (1 << 62),
        must_be_safe: [61, 62],
    },
    CastleRoute {
        right: CASTLE_BLACK_QUEENSIDE,
        king_from: 60,
        king_to: 58,
        must_be_empty: (1 << 57) | (1 << 58) | (1 << 59),
        must_be_safe: [59, 58],
    },
];

fn generate_castling_moves(board: &GameState, out: &mut Vec<ChessMove>) {
    let side = board.side_to_move;
    let enemy = side.opposite();
    let routes = match side {
        Color::White => &WHITE_ROUTES,
        Color::Black => &BLACK_ROUTES,
    };
    let king_bb = board.pieces[side.index()][PieceKind::King.index()];
    let rook_bb = board.pieces[side.index()][PieceKind::Rook.index()];

    for route in routes {
        if board.castling_rights & route.right == 0 || king_bb & (1u64 << route.king_from) == 0 {
            continue;
        }
        let rook_from = if route.king_to > route.king_from {
            route.king_from + 3
        } else {
            route.king_from - 4
        };
        if rook_bb & (1u64 << rook_from) == 0 || board.occupancy_all & route.must_be_empty != 0 {
            continue;
        }
        if is_square_attacked(board, route.king_from, enemy)
            || route
                .must_be_safe
                .iter()
                .any(|sq| is_square_attacked(board, *sq, enemy))
        {
            continue;
        }
        out.push(ChessMove::new(route.king_from, route.king_to, MoveFlag::Castle));
    }
}
