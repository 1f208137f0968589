//! A full game on top of the board: move log with undo, SAN history,
//! outcome detection and PGN export.

use chrono::prelude::*;

use crate::board::{Board, MoveLogEntry, STARTING_POSITION_FEN};
use crate::errors::{FenError, NotationError};
use crate::san;
use crate::types::{Move, Side};
use crate::zobrist;

/// How a finished game ended. Checkmate names the side that was mated.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Status {
    Checkmate(Side),
    Stalemate,
    ThreefoldRepetition,
    FiftyMoveRule,
    InsufficientMaterial,
}

pub struct Game {
    board: Board,
    log: Vec<MoveLogEntry>,
    /// Position hashes since the start, current position last
    hashes: Vec<u64>,
    start_fen: String,
    started_at: DateTime<Local>,
}

impl Game {
    pub fn new() -> Game {
        Game::from_fen(STARTING_POSITION_FEN).expect("the starting position FEN is well formed")
    }

    pub fn from_fen(fen: &str) -> Result<Game, FenError> {
        let board = Board::from_fen(fen)?;
        Ok(Game {
            hashes: vec![zobrist::hash(&board)],
            board,
            log: Vec::new(),
            start_fen: fen.to_string(),
            started_at: Local::now(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &[MoveLogEntry] {
        &self.log
    }

    /// Apply a move with full validation. Returns `false` (and changes
    /// nothing) when the move is illegal.
    pub fn play(&mut self, mv: Move) -> bool {
        match self.board.do_move_logged(mv, true) {
            Some(entry) => {
                self.log.push(entry);
                self.hashes.push(zobrist::hash(&self.board));
                true
            }
            None => false,
        }
    }

    /// Decode one SAN token against the current position and apply it.
    /// This is the calling convention of a PGN importer: one token at a
    /// time, each interpreted after the previous one was applied.
    pub fn play_san(&mut self, token: &str) -> Result<Move, NotationError> {
        let mv = san::parse_san(&self.board, token)?;
        let applied = self.play(mv);
        debug_assert!(applied, "the decoder only returns legal moves");
        Ok(mv)
    }

    /// Take back the last move, restoring the recorded snapshot.
    pub fn undo(&mut self) -> Option<Move> {
        let entry = self.log.pop()?;
        self.board = entry.board;
        self.hashes.pop();
        Some(entry.mv)
    }

    /// The moves played so far, re-encoded as SAN.
    pub fn san_history(&self) -> Vec<String> {
        self.log.iter().map(san::to_san).collect()
    }

    /// Whether the game is over, and how. `None` while play continues.
    pub fn status(&self) -> Option<Status> {
        if self.board.legal_moves().is_empty() {
            return Some(if self.board.is_king_attacked() {
                Status::Checkmate(self.board.side_to_move())
            } else {
                Status::Stalemate
            });
        }
        if self.board.halfmove_clock() >= 100 {
            return Some(Status::FiftyMoveRule);
        }
        if self.board.insufficient_material() {
            return Some(Status::InsufficientMaterial);
        }
        if let Some(&current) = self.hashes.last() {
            if self.hashes.iter().filter(|&&h| h == current).count() >= 3 {
                return Some(Status::ThreefoldRepetition);
            }
        }
        None
    }

    /// The PGN termination marker for the current state.
    pub fn result_marker(&self) -> &'static str {
        match self.status() {
            Some(Status::Checkmate(Side::White)) => "0-1",
            Some(Status::Checkmate(Side::Black)) => "1-0",
            Some(_) => "1/2-1/2",
            None => "*",
        }
    }

    pub fn to_pgn(&self) -> String {
        let mut pgn = String::new();
        pgn.push_str("[Event \"Casual game\"]\n");
        pgn.push_str("[Site \"chesskit\"]\n");
        pgn.push_str(&format!("[Date \"{}\"]\n", self.started_at.format("%Y.%m.%d")));
        pgn.push_str("[Round \"1\"]\n");
        pgn.push_str("[White \"?\"]\n");
        pgn.push_str("[Black \"?\"]\n");
        pgn.push_str(&format!("[Result \"{}\"]\n", self.result_marker()));
        if self.start_fen != STARTING_POSITION_FEN {
            pgn.push_str(&format!("[FEN \"{}\"]\n", self.start_fen));
        }
        pgn.push('\n');

        for (i, entry) in self.log.iter().enumerate() {
            if i % 2 == 0 {
                pgn.push_str(&format!("{}. ", i / 2 + 1));
            }
            pgn.push_str(&san::to_san(entry));
            pgn.push(' ');
        }
        pgn.push_str(self.result_marker());
        pgn
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_and_undo_restore_the_position() {
        let mut game = Game::new();
        let start_fen = game.board().fen();
        assert!(game.play(Move::from_coordinate("e2e4").unwrap()));
        assert!(game.play(Move::from_coordinate("e7e5").unwrap()));
        assert_eq!(game.undo(), Some(Move::from_coordinate("e7e5").unwrap()));
        assert_eq!(game.undo(), Some(Move::from_coordinate("e2e4").unwrap()));
        assert_eq!(game.undo(), None);
        assert_eq!(game.board().fen(), start_fen);
    }

    #[test]
    fn rejected_moves_change_nothing() {
        let mut game = Game::new();
        assert!(!game.play(Move::from_coordinate("e2e5").unwrap()));
        assert!(game.play_san("Qd5").is_err());
        assert!(game.history().is_empty());
        assert_eq!(game.board().fen(), STARTING_POSITION_FEN);
    }

    #[test]
    fn scholars_mate_ends_the_game() {
        let mut game = Game::new();
        for token in ["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#"] {
            game.play_san(token).unwrap();
        }
        assert_eq!(
            game.board().fen(),
            "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4"
        );
        assert_eq!(game.status(), Some(Status::Checkmate(Side::Black)));
        assert_eq!(game.result_marker(), "1-0");
        assert_eq!(
            game.san_history(),
            vec!["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#"]
        );
    }

    #[test]
    fn threefold_repetition_is_detected() {
        let mut game = Game::new();
        let shuffle = ["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1", "Ng8"];
        for (i, token) in shuffle.iter().enumerate() {
            assert_eq!(game.status(), None, "premature end before ply {i}");
            game.play_san(token).unwrap();
        }
        // the starting position has now occurred three times
        assert_eq!(game.status(), Some(Status::ThreefoldRepetition));
        assert_eq!(game.result_marker(), "1/2-1/2");
    }

    #[test]
    fn fifty_move_rule_from_the_clock() {
        let game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 100 80").unwrap();
        assert_eq!(game.status(), Some(Status::FiftyMoveRule));
    }

    #[test]
    fn bare_kings_are_a_draw() {
        let game = Game::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(game.status(), Some(Status::InsufficientMaterial));
    }

    #[test]
    fn stalemate_is_detected() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(game.status(), Some(Status::Stalemate));
        assert_eq!(game.result_marker(), "1/2-1/2");
    }

    #[test]
    fn pgn_export_shape() {
        let mut game = Game::new();
        for token in ["e4", "e5", "Nf3"] {
            game.play_san(token).unwrap();
        }
        let pgn = game.to_pgn();
        assert!(pgn.starts_with("[Event "));
        assert!(pgn.contains("[Result \"*\"]"));
        assert!(pgn.contains("1. e4 e5 2. Nf3 *"));
        // games from the standard start carry no FEN tag
        assert!(!pgn.contains("[FEN "));

        let mut custom = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        custom.play_san("Ra8+").unwrap();
        assert!(custom.to_pgn().contains("[FEN \"4k3/8/8/8/8/8/8/R3K3 w - - 0 1\"]"));
    }
}
