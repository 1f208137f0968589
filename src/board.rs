//! The mutable position: occupancy in three redundant views (per side, per
//! piece, per square), side to move, castling rights, en-passant target and
//! move clocks, together with the FEN codec and the single state transition
//! `do_move`.

use std::fmt;

use itertools::Itertools;

use crate::bitboard::{self, Bitboard, BitboardIter, ATTACK_TABLES};
use crate::castling::Castling;
use crate::errors::FenError;
use crate::movegen::MoveGenerator;
use crate::types::{CastlingRight, Move, Piece, PieceType, Side, Square};

pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Occupancy of each side
    by_side: [Bitboard; 2],
    /// Occupancy of each of the twelve pieces
    by_piece: [Bitboard; 12],
    /// What stands on each square
    mailbox: [Option<Piece>; 64],
    side_to_move: Side,
    castling: [CastlingRight; 2],
    /// Square a pawn may move to to capture en passant
    en_passant: Option<Square>,
    /// Half moves since the last capture or pawn move
    halfmove_clock: u32,
    /// Starts at 1, incremented after every Black move
    fullmove_number: u32,
}

/// Everything needed to undo a move or encode it as SAN afterwards: the
/// position it was played in, who played it, what moved and what fell.
#[derive(Debug, Clone)]
pub struct MoveLogEntry {
    /// The position before the move
    pub board: Board,
    /// The side that moved
    pub side: Side,
    pub mv: Move,
    /// The piece that moved (pre-promotion)
    pub piece: Piece,
    /// The captured piece and its square; the square differs from `mv.to`
    /// only for en-passant captures
    pub captured: Option<(Piece, Square)>,
    /// Whether the move was an en-passant capture
    pub en_passant: bool,
}

impl Board {
    pub(crate) fn empty() -> Board {
        Board {
            by_side: [0; 2],
            by_piece: [0; 12],
            mailbox: [None; 64],
            side_to_move: Side::White,
            castling: [CastlingRight::None; 2],
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// The standard starting position.
    pub fn new() -> Board {
        Board::from_fen(STARTING_POSITION_FEN).expect("the starting position FEN is well formed")
    }

    /// Parse the six space-separated FEN fields. The result satisfies every
    /// board invariant or the load fails.
    pub fn from_fen(fen: &str) -> Result<Board, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::FieldCount(fields.len()));
        }

        let mut board = Board::empty();
        let placement_error = || FenError::Placement(fields[0].to_string());

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(placement_error());
        }
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_text.chars() {
                if let Some(run) = c.to_digit(10) {
                    if !(1..=8).contains(&run) {
                        return Err(placement_error());
                    }
                    file += run as u8;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    if file >= 8 {
                        return Err(placement_error());
                    }
                    board.put_piece(piece, Square::from_coords(file, rank));
                    file += 1;
                } else {
                    return Err(placement_error());
                }
                if file > 8 {
                    return Err(placement_error());
                }
            }
            if file != 8 {
                return Err(placement_error());
            }
        }

        board.side_to_move = match fields[1] {
            "w" => Side::White,
            "b" => Side::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        if fields[2] != "-" {
            for c in fields[2].chars() {
                let (side, castling) = match c {
                    'K' => (Side::White, Castling::KingSide),
                    'Q' => (Side::White, Castling::QueenSide),
                    'k' => (Side::Black, Castling::KingSide),
                    'q' => (Side::Black, Castling::QueenSide),
                    _ => return Err(FenError::Castling(fields[2].to_string())),
                };
                board.castling[side.index()] = board.castling[side.index()].with(castling);
            }
        }

        if fields[3] != "-" {
            let sq = Square::from_algebraic(fields[3])
                .ok_or_else(|| FenError::EnPassant(fields[3].to_string()))?;
            board.en_passant = Some(sq);
        }

        board.halfmove_clock = fields[4]
            .parse()
            .map_err(|_| FenError::HalfMoveClock(fields[4].to_string()))?;
        board.fullmove_number = fields[5]
            .parse()
            .map_err(|_| FenError::FullMoveNumber(fields[5].to_string()))?;
        if board.fullmove_number == 0 {
            return Err(FenError::FullMoveNumber(fields[5].to_string()));
        }

        for side in [Side::White, Side::Black] {
            let kings = board.piece_bb(side, PieceType::King).count_ones();
            if kings != 1 {
                return Err(FenError::KingCount(side, kings));
            }
        }

        debug_assert!(board.is_consistent());
        Ok(board)
    }

    /// Write the position back out as FEN. Exact inverse of [`Board::from_fen`].
    pub fn fen(&self) -> String {
        let placement = (0..8u8)
            .rev()
            .map(|rank| {
                let mut line = String::new();
                let mut empty = 0;
                for file in 0..8u8 {
                    match self.mailbox[Square::from_coords(file, rank).index()] {
                        Some(piece) => {
                            if empty > 0 {
                                line.push_str(&empty.to_string());
                                empty = 0;
                            }
                            line.push(piece.fen_char());
                        }
                        None => empty += 1,
                    }
                }
                if empty > 0 {
                    line.push_str(&empty.to_string());
                }
                line
            })
            .join("/");

        let mut castling = String::new();
        for side in [Side::White, Side::Black] {
            for kind in Castling::ALL {
                if self.castling[side.index()].allows(kind) {
                    castling.push(kind.fen_char(side));
                }
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = match self.en_passant {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            placement,
            self.side_to_move.to_char(),
            castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    #[inline(always)]
    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    #[inline(always)]
    pub fn castling_right(&self, side: Side) -> CastlingRight {
        self.castling[side.index()]
    }

    #[inline(always)]
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline(always)]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline(always)]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline(always)]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.mailbox[sq.index()]
    }

    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.by_side[0] | self.by_side[1]
    }

    #[inline(always)]
    pub fn side_bb(&self, side: Side) -> Bitboard {
        self.by_side[side.index()]
    }

    #[inline(always)]
    pub fn piece_bb(&self, side: Side, kind: PieceType) -> Bitboard {
        self.by_piece[Piece::new(side, kind).index()]
    }

    /// The king's square. Every board built through `from_fen` has exactly
    /// one king per side.
    #[inline]
    pub fn king_square(&self, side: Side) -> Square {
        let kings = self.piece_bb(side, PieceType::King);
        Square::new(bitboard::bit_scan_forward(kings))
    }

    /// Is `sq` attacked by any piece of `by` on the current occupancy?
    pub fn is_square_attacked(&self, sq: Square, by: Side) -> bool {
        self.attacked_with(sq, by, self.occupied(), 0)
    }

    /// Is the side to move's king currently attacked?
    pub fn is_king_attacked(&self) -> bool {
        let us = self.side_to_move;
        self.is_square_attacked(self.king_square(us), us.flip())
    }

    /// Attack test under a hypothetical occupancy. `removed` masks pieces of
    /// `by` that should be ignored (a capture being simulated).
    pub(crate) fn attacked_with(
        &self,
        sq: Square,
        by: Side,
        occupied: Bitboard,
        removed: Bitboard,
    ) -> bool {
        let i = sq.index();
        if ATTACK_TABLES.knight[i] & self.piece_bb(by, PieceType::Knight) & !removed != 0 {
            return true;
        }
        if ATTACK_TABLES.king[i] & self.piece_bb(by, PieceType::King) & !removed != 0 {
            return true;
        }
        // a pawn of `by` attacks sq iff it stands where a pawn of the other
        // side on sq would capture
        let pawns = self.piece_bb(by, PieceType::Pawn) & !removed;
        if ATTACK_TABLES.pawn[by.flip().index()][i] & pawns != 0 {
            return true;
        }
        let straight =
            (self.piece_bb(by, PieceType::Rook) | self.piece_bb(by, PieceType::Queen)) & !removed;
        if straight != 0 && ATTACK_TABLES.rook_attacks(i as u8, occupied) & straight != 0 {
            return true;
        }
        let diagonal =
            (self.piece_bb(by, PieceType::Bishop) | self.piece_bb(by, PieceType::Queen)) & !removed;
        if diagonal != 0 && ATTACK_TABLES.bishop_attacks(i as u8, occupied) & diagonal != 0 {
            return true;
        }
        false
    }

    /// Move legality. With `full_validation` the move may come from anywhere
    /// (a UI, a decoded SAN token) and every structural condition is
    /// checked; without it the move must be pseudo-legal already and only
    /// king safety is verified, on edited attack sets rather than a board
    /// copy.
    pub fn is_move_legal(&self, mv: Move, full_validation: bool) -> bool {
        if full_validation {
            self.is_move_fully_legal(mv)
        } else {
            !self.leaves_king_attacked(mv)
        }
    }

    /// Would the mover's king be attacked once `mv` is played? Simulates
    /// only the occupancy edits the move causes.
    fn leaves_king_attacked(&self, mv: Move) -> bool {
        let us = self.side_to_move;
        let them = us.flip();
        let piece = match self.piece_at(mv.from) {
            Some(p) => p,
            None => return true,
        };
        let from_bb = mv.from.bb();
        let to_bb = mv.to.bb();

        let mut removed = 0u64;
        match self.piece_at(mv.to) {
            Some(target) if target.side == them => removed = to_bb,
            _ => {
                if piece.kind == PieceType::Pawn && self.en_passant == Some(mv.to) {
                    removed = Square::from_coords(mv.to.file(), mv.from.rank()).bb();
                }
            }
        }

        let occupied = (self.occupied() & !from_bb & !removed) | to_bb;
        let king_sq = if piece.kind == PieceType::King {
            mv.to
        } else {
            self.king_square(us)
        };
        self.attacked_with(king_sq, them, occupied, removed)
    }

    fn is_move_fully_legal(&self, mv: Move) -> bool {
        let us = self.side_to_move;
        let them = us.flip();
        let piece = match self.piece_at(mv.from) {
            Some(p) if p.side == us => p,
            _ => return false,
        };

        // only enemy pieces can be captured
        if let Some(target) = self.piece_at(mv.to) {
            if target.side == us {
                return false;
            }
        }

        // a promotion piece is supplied iff a pawn reaches the last rank
        let promotes = piece.kind == PieceType::Pawn && mv.to.rank() == us.promotion_rank();
        match mv.promotion {
            Some(kind) => {
                if !promotes || kind == PieceType::Pawn || kind == PieceType::King {
                    return false;
                }
            }
            None => {
                if promotes {
                    return false;
                }
            }
        }

        // a king relocation matching a castling pattern is validated as one
        if piece.kind == PieceType::King {
            if let Some(castling) = Castling::from_king_move(us, mv.from, mv.to) {
                return self.can_castle(us, castling);
            }
        }

        // the piece must be able to reach the destination at all
        let occupied = self.occupied();
        let from = mv.from.index();
        let reachable = match piece.kind {
            PieceType::Pawn => {
                let ep_bb = self.en_passant.map_or(0, Square::bb);
                let captures = ATTACK_TABLES.pawn[us.index()][from] & (self.side_bb(them) | ep_bb);
                captures | ATTACK_TABLES.pawn_pushes(us, from as u8, occupied)
            }
            PieceType::Knight => ATTACK_TABLES.knight[from],
            PieceType::Bishop => bitboard::bishop_attacks(from as u8, occupied),
            PieceType::Rook => bitboard::rook_attacks(from as u8, occupied),
            PieceType::Queen => bitboard::queen_attacks(from as u8, occupied),
            PieceType::King => ATTACK_TABLES.king[from],
        };
        if reachable & mv.to.bb() == 0 {
            return false;
        }

        !self.leaves_king_attacked(mv)
    }

    /// All castling conditions: right held, rook in place, path empty, and
    /// neither the king's start nor its transit squares attacked.
    pub(crate) fn can_castle(&self, side: Side, castling: Castling) -> bool {
        if !self.castling[side.index()].allows(castling) {
            return false;
        }
        let rook = castling.rook_move(side);
        if self.piece_at(rook.from) != Some(Piece::new(side, PieceType::Rook)) {
            return false;
        }
        let occupied = self.occupied();
        for sq in castling.empty_path(side) {
            if occupied & sq.bb() != 0 {
                return false;
            }
        }
        let them = side.flip();
        if self.is_square_attacked(castling.king_move(side).from, them) {
            return false;
        }
        for sq in castling.king_transit(side) {
            if self.is_square_attacked(sq, them) {
                return false;
            }
        }
        true
    }

    /// Apply a move. Returns `false` and leaves the board untouched when the
    /// move is illegal; this is the expected path for speculative moves.
    pub fn do_move(&mut self, mv: Move, full_validation: bool) -> bool {
        self.do_move_logged(mv, full_validation).is_some()
    }

    /// Apply a move and return the log entry a caller needs for undo or SAN
    /// encoding. `None` means the move was illegal and nothing changed.
    pub fn do_move_logged(&mut self, mv: Move, full_validation: bool) -> Option<MoveLogEntry> {
        let us = self.side_to_move;
        let them = us.flip();
        let piece = match self.piece_at(mv.from) {
            Some(p) if p.side == us => p,
            _ => return None,
        };
        let legal = if full_validation {
            self.is_move_fully_legal(mv)
        } else {
            !self.leaves_king_attacked(mv)
        };
        if !legal {
            return None;
        }

        let snapshot = self.clone();

        // locate the captured piece; its square differs from `to` only for
        // en-passant captures
        let mut is_en_passant = false;
        let captured = match self.piece_at(mv.to) {
            Some(target) => Some((target, mv.to)),
            None if piece.kind == PieceType::Pawn
                && self.en_passant == Some(mv.to)
                && mv.from.file() != mv.to.file() =>
            {
                is_en_passant = true;
                let sq = Square::from_coords(mv.to.file(), mv.from.rank());
                self.piece_at(sq).map(|p| (p, sq))
            }
            None => None,
        };

        self.remove_piece(mv.from);
        if let Some((_, sq)) = captured {
            self.remove_piece(sq);
        }
        let placed = match mv.promotion {
            Some(kind) => Piece::new(us, kind),
            None => piece,
        };
        self.put_piece(placed, mv.to);

        // castling relocates the rook as well
        if piece.kind == PieceType::King {
            if let Some(castling) = Castling::from_king_move(us, mv.from, mv.to) {
                let rook = castling.rook_move(us);
                self.remove_piece(rook.from);
                self.put_piece(Piece::new(us, PieceType::Rook), rook.to);
            }
        }

        // castling rights: a king move clears both, a rook leaving its home
        // square clears one, capturing a rook on its home square clears one
        // of the opponent's
        if piece.kind == PieceType::King {
            self.castling[us.index()] = CastlingRight::None;
        }
        for castling in Castling::ALL {
            if piece.kind == PieceType::Rook && mv.from == castling.rook_move(us).from {
                self.castling[us.index()] = self.castling[us.index()].without(castling);
            }
            if let Some((target, sq)) = captured {
                if target.kind == PieceType::Rook && sq == castling.rook_move(them).from {
                    self.castling[them.index()] = self.castling[them.index()].without(castling);
                }
            }
        }

        // the en-passant target is cleared on every move and re-armed only
        // when an enemy pawn could actually answer the double push
        self.en_passant = None;
        if piece.kind == PieceType::Pawn {
            let diff = mv.to.index() as i32 - mv.from.index() as i32;
            if diff == 16 || diff == -16 {
                let target = Square::new(((mv.from.index() + mv.to.index()) / 2) as u8);
                if self.en_passant_capture_exists(target, mv.to, them) {
                    self.en_passant = Some(target);
                }
            }
        }

        if captured.is_some() || piece.kind == PieceType::Pawn {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Side::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = them;

        debug_assert!(self.is_consistent());

        Some(MoveLogEntry {
            board: snapshot,
            side: us,
            mv,
            piece,
            captured,
            en_passant: is_en_passant,
        })
    }

    /// Could some pawn of `capturer` legally take en passant on `target`?
    /// Called mid-update, after the double-pushed pawn reached `pushed_to`.
    fn en_passant_capture_exists(&self, target: Square, pushed_to: Square, capturer: Side) -> bool {
        let us = capturer.flip();
        let candidates =
            ATTACK_TABLES.pawn[us.index()][target.index()] & self.piece_bb(capturer, PieceType::Pawn);
        if candidates == 0 {
            return false;
        }
        let king_sq = self.king_square(capturer);
        for from in BitboardIter(candidates) {
            let from_bb = 1u64 << from;
            let occupied = (self.occupied() & !from_bb & !pushed_to.bb()) | target.bb();
            if !self.attacked_with(king_sq, us, occupied, pushed_to.bb()) {
                return true;
            }
        }
        false
    }

    /// All legal moves for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        MoveGenerator::legal_moves(self)
    }

    /// All pseudo-legal moves for the side to move (king safety unchecked).
    pub fn pseudo_legal_moves(&self) -> Vec<Move> {
        MoveGenerator::pseudo_legal_moves(self)
    }

    /// The side to move is attacked and has no reply.
    pub fn is_checkmate(&self) -> bool {
        self.is_king_attacked() && self.legal_moves().is_empty()
    }

    /// The side to move is not attacked but has no legal move.
    pub fn is_stalemate(&self) -> bool {
        !self.is_king_attacked() && self.legal_moves().is_empty()
    }

    /// Neither side can mate: both are down to a bare king or king plus one
    /// minor piece.
    pub fn insufficient_material(&self) -> bool {
        for side in [Side::White, Side::Black] {
            let count = self.side_bb(side).count_ones();
            let minors = (self.piece_bb(side, PieceType::Knight)
                | self.piece_bb(side, PieceType::Bishop))
            .count_ones();
            let bare = count == 1 || (count == 2 && minors == 1);
            if !bare {
                return false;
            }
        }
        true
    }

    /// Verify the three occupancy views agree: piece masks pairwise
    /// disjoint, side unions match, mailbox consistent, one king each.
    pub fn is_consistent(&self) -> bool {
        let mut union = [0u64; 2];
        let mut all = 0u64;
        for side in [Side::White, Side::Black] {
            for kind in PieceType::ALL {
                let bb = self.piece_bb(side, kind);
                if bb & all != 0 {
                    return false;
                }
                all |= bb;
                union[side.index()] |= bb;
            }
        }
        if union != self.by_side || union[0] & union[1] != 0 {
            return false;
        }
        for sq in Square::all() {
            match self.mailbox[sq.index()] {
                Some(piece) => {
                    if self.by_piece[piece.index()] & sq.bb() == 0 {
                        return false;
                    }
                }
                None => {
                    if all & sq.bb() != 0 {
                        return false;
                    }
                }
            }
        }
        self.piece_bb(Side::White, PieceType::King).count_ones() == 1
            && self.piece_bb(Side::Black, PieceType::King).count_ones() == 1
    }

    fn put_piece(&mut self, piece: Piece, sq: Square) {
        debug_assert!(self.mailbox[sq.index()].is_none());
        let bb = sq.bb();
        self.by_side[piece.side.index()] |= bb;
        self.by_piece[piece.index()] |= bb;
        self.mailbox[sq.index()] = Some(piece);
    }

    fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.mailbox[sq.index()].take()?;
        let bb = sq.bb();
        self.by_side[piece.side.index()] &= !bb;
        self.by_piece[piece.index()] &= !bb;
        Some(piece)
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            for file in 0..8u8 {
                let text = match self.piece_at(Square::from_coords(file, rank)) {
                    Some(piece) => piece.symbol(),
                    None => ".",
                };
                write!(f, " {}", text)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
