//! Perft: exhaustive legal-move path counting, the standard correctness
//! check for move generation.
//!
//! Reference counts: <https://www.chessprogramming.org/Perft_Results>

use rayon::prelude::*;

use crate::board::Board;
use crate::types::Move;

/// Number of leaf nodes reachable in exactly `depth` plies.
pub fn perft(board: &Board, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = board.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for m in moves {
        let mut next = board.clone();
        next.do_move(m, false);
        nodes += perft(&next, depth - 1);
    }
    nodes
}

/// Perft with the root moves counted in parallel.
pub fn perft_parallel(board: &Board, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    board
        .legal_moves()
        .into_par_iter()
        .map(|m| {
            let mut next = board.clone();
            next.do_move(m, false);
            perft(&next, depth - 1)
        })
        .sum()
}

/// Node count under each root move, for drilling into a disagreement.
pub fn divide(board: &Board, depth: u8) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    board
        .legal_moves()
        .into_iter()
        .map(|m| {
            let mut next = board.clone();
            next.do_move(m, false);
            (m, perft(&next, depth - 1))
        })
        .collect()
}
