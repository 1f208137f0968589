//! Static castling tables: for each (side, castling) pair, the king and
//! rook relocations, the squares that must not be attacked, and the squares
//! that must be empty.

use crate::types::{Move, Side, Square};

const W_KING_SIDE_PATH: [Square; 2] = [Square::new(5), Square::new(6)]; // f1 g1
const W_QUEEN_SIDE_PATH: [Square; 3] = [Square::new(3), Square::new(2), Square::new(1)]; // d1 c1 b1
const B_KING_SIDE_PATH: [Square; 2] = [Square::new(61), Square::new(62)]; // f8 g8
const B_QUEEN_SIDE_PATH: [Square; 3] = [Square::new(59), Square::new(58), Square::new(57)]; // d8 c8 b8

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Castling {
    KingSide,
    QueenSide,
}

impl Castling {
    pub const ALL: [Castling; 2] = [Castling::KingSide, Castling::QueenSide];

    /// The king's relocation for this castling.
    pub const fn king_move(self, side: Side) -> Move {
        let (from, to) = match (side, self) {
            (Side::White, Castling::KingSide) => (4, 6),    // e1 g1
            (Side::White, Castling::QueenSide) => (4, 2),   // e1 c1
            (Side::Black, Castling::KingSide) => (60, 62),  // e8 g8
            (Side::Black, Castling::QueenSide) => (60, 58), // e8 c8
        };
        Move::new(Square::new(from), Square::new(to))
    }

    /// The rook's relocation for this castling.
    pub const fn rook_move(self, side: Side) -> Move {
        let (from, to) = match (side, self) {
            (Side::White, Castling::KingSide) => (7, 5),    // h1 f1
            (Side::White, Castling::QueenSide) => (0, 3),   // a1 d1
            (Side::Black, Castling::KingSide) => (63, 61),  // h8 f8
            (Side::Black, Castling::QueenSide) => (56, 59), // a8 d8
        };
        Move::new(Square::new(from), Square::new(to))
    }

    /// The two squares the king crosses or lands on. Together with the
    /// king's start square, none of these may be attacked.
    pub const fn king_transit(self, side: Side) -> [Square; 2] {
        match (side, self) {
            (Side::White, Castling::KingSide) => [Square::new(5), Square::new(6)], // f1 g1
            (Side::White, Castling::QueenSide) => [Square::new(3), Square::new(2)], // d1 c1
            (Side::Black, Castling::KingSide) => [Square::new(61), Square::new(62)], // f8 g8
            (Side::Black, Castling::QueenSide) => [Square::new(59), Square::new(58)], // d8 c8
        }
    }

    /// Every square between king and rook; all must be empty. On the queen
    /// side this includes the b-file square the king never touches.
    pub const fn empty_path(self, side: Side) -> &'static [Square] {
        match (side, self) {
            (Side::White, Castling::KingSide) => &W_KING_SIDE_PATH,
            (Side::White, Castling::QueenSide) => &W_QUEEN_SIDE_PATH,
            (Side::Black, Castling::KingSide) => &B_KING_SIDE_PATH,
            (Side::Black, Castling::QueenSide) => &B_QUEEN_SIDE_PATH,
        }
    }

    /// Recognize a king relocation as a castling of this side.
    pub fn from_king_move(side: Side, from: Square, to: Square) -> Option<Castling> {
        for castling in Castling::ALL {
            let king = castling.king_move(side);
            if king.from == from && king.to == to {
                return Some(castling);
            }
        }
        None
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Castling::KingSide => "O-O",
            Castling::QueenSide => "O-O-O",
        }
    }

    /// FEN letter for this castling, cased for the given side.
    pub fn fen_char(self, side: Side) -> char {
        let c = match self {
            Castling::KingSide => 'K',
            Castling::QueenSide => 'Q',
        };
        match side {
            Side::White => c,
            Side::Black => c.to_ascii_lowercase(),
        }
    }
}
