//! Standard Algebraic Notation: encoding played moves and decoding tokens
//! against the position they are to be played in.
//!
//! Encoding works from a [`MoveLogEntry`] because SAN needs facts the
//! post-move board no longer carries (what moved, what was captured, and the
//! position the move was chosen in, for disambiguation).

use crate::bitboard::{self, BitboardIter, ATTACK_TABLES};
use crate::board::{Board, MoveLogEntry};
use crate::castling::Castling;
use crate::errors::NotationError;
use crate::types::{Move, PieceType, Side, Square};

/// Encode one played move as SAN, e.g. `Nf3`, `exd5`, `Rad1`, `e8=Q+`,
/// `O-O-O`.
pub fn to_san(entry: &MoveLogEntry) -> String {
    let board = &entry.board;

    if entry.piece.kind == PieceType::King {
        if let Some(castling) = Castling::from_king_move(entry.side, entry.mv.from, entry.mv.to) {
            return castling.symbol().to_string();
        }
    }

    let mut san = String::new();
    if entry.piece.kind != PieceType::Pawn {
        san.push(entry.piece.kind.notation());
    }

    if entry.piece.kind == PieceType::Pawn {
        // pawn captures always name the source file
        if entry.captured.is_some() {
            san.push((b'a' + entry.mv.from.file()) as char);
        }
    } else {
        // other same-kind pieces that could also legally reach the square
        let rivals = rival_sources(board, entry);
        if !rivals.is_empty() {
            let from = entry.mv.from;
            if rivals.iter().all(|sq| sq.file() != from.file()) {
                san.push((b'a' + from.file()) as char);
            } else if rivals.iter().all(|sq| sq.rank() != from.rank()) {
                san.push((b'1' + from.rank()) as char);
            } else {
                san.push_str(&from.to_string());
            }
        }
    }

    if entry.captured.is_some() {
        san.push('x');
    }
    san.push_str(&entry.mv.to.to_string());
    if let Some(kind) = entry.mv.promotion {
        san.push('=');
        san.push(kind.notation());
    }

    // check and mate read off the resulting position
    let mut after = board.clone();
    if after.do_move(entry.mv, false) && after.is_king_attacked() {
        san.push(if after.legal_moves().is_empty() { '#' } else { '+' });
    }
    san
}

/// Same-kind, same-side squares other than the actual source that could
/// legally make the same move.
fn rival_sources(board: &Board, entry: &MoveLogEntry) -> Vec<Square> {
    let same = board.piece_bb(entry.side, entry.piece.kind) & !entry.mv.from.bb();
    let mut rivals = Vec::new();
    for sq in BitboardIter(same) {
        let from = Square::new(sq);
        let candidate = Move {
            from,
            to: entry.mv.to,
            promotion: entry.mv.promotion,
        };
        if board.is_move_legal(candidate, true) {
            rivals.push(from);
        }
    }
    rivals
}

/// Decode one SAN token against the position it is to be played in. The
/// returned move has passed full validation. Errors always explain why.
pub fn parse_san(board: &Board, token: &str) -> Result<Move, NotationError> {
    let us = board.side_to_move();
    let stripped = strip_annotations(token);
    if stripped.is_empty() {
        return Err(NotationError::new(token, "empty move text"));
    }

    for castling in Castling::ALL {
        if stripped == castling.symbol() || stripped == castling.symbol().replace('O', "0") {
            let mv = castling.king_move(us);
            if board.is_move_legal(mv, true) {
                return Ok(mv);
            }
            return Err(NotationError::new(
                token,
                format!("{} is not legal in this position", castling.symbol()),
            ));
        }
    }

    if !stripped.is_ascii() {
        return Err(NotationError::new(token, "move text is not ASCII"));
    }
    let (body, promotion) = split_promotion(stripped, token)?;
    if body.len() < 2 {
        return Err(NotationError::new(token, "move text is too short"));
    }
    let (prefix, dest_text) = body.split_at(body.len() - 2);
    let to = Square::from_algebraic(dest_text).ok_or_else(|| {
        NotationError::new(token, format!("`{dest_text}` is not a destination square"))
    })?;

    let mut rest = prefix.chars().peekable();
    let kind = match rest.peek() {
        Some(&c) if c.is_ascii_uppercase() => {
            rest.next();
            PieceType::from_notation(c)
                .ok_or_else(|| NotationError::new(token, format!("unknown piece letter `{c}`")))?
        }
        _ => PieceType::Pawn,
    };

    let mut file_hint = None;
    let mut rank_hint = None;
    let mut is_capture = false;
    for c in rest {
        match c {
            'a'..='h' => file_hint = Some(c as u8 - b'a'),
            '1'..='8' => rank_hint = Some(c as u8 - b'1'),
            'x' => is_capture = true,
            _ => {
                return Err(NotationError::new(
                    token,
                    format!("unexpected character `{c}`"),
                ))
            }
        }
    }

    if kind == PieceType::Pawn {
        resolve_pawn(board, token, us, to, file_hint, is_capture, promotion)
    } else {
        if promotion.is_some() {
            return Err(NotationError::new(token, "only pawn moves can promote"));
        }
        resolve_piece(board, token, us, kind, to, file_hint, rank_hint)
    }
}

fn resolve_pawn(
    board: &Board,
    token: &str,
    us: Side,
    to: Square,
    file_hint: Option<u8>,
    is_capture: bool,
    promotion: Option<PieceType>,
) -> Result<Move, NotationError> {
    if to.rank() == us.promotion_rank() && promotion.is_none() {
        return Err(NotationError::new(token, "missing promotion piece"));
    }

    let step = us.forward() / 8; // +1 or -1 ranks
    let from = match file_hint {
        Some(file) if file != to.file() || is_capture => {
            // capture: the source is one step behind on the named file
            if (file as i32 - to.file() as i32).abs() != 1 {
                return Err(NotationError::new(
                    token,
                    "a pawn capture must come from an adjacent file",
                ));
            }
            let rank = to.rank() as i32 - step;
            if !(0..8).contains(&rank) {
                return Err(NotationError::new(token, "the capture has no source rank"));
            }
            Square::from_coords(file, rank as u8)
        }
        _ => {
            // push: scan from the destination back toward the mover
            let one = to.rank() as i32 - step;
            if !(0..8).contains(&one) {
                return Err(NotationError::new(
                    token,
                    format!("no pawn can reach {to}"),
                ));
            }
            let one = Square::from_coords(to.file(), one as u8);
            match board.piece_at(one) {
                Some(p) if p.side == us && p.kind == PieceType::Pawn => one,
                None if to.rank() == us.double_push_rank() => {
                    let two = Square::from_coords(to.file(), (one.rank() as i32 - step) as u8);
                    match board.piece_at(two) {
                        Some(p) if p.side == us && p.kind == PieceType::Pawn => two,
                        _ => {
                            return Err(NotationError::new(
                                token,
                                format!("no pawn can reach {to}"),
                            ))
                        }
                    }
                }
                _ => {
                    return Err(NotationError::new(
                        token,
                        format!("no pawn can reach {to}"),
                    ))
                }
            }
        }
    };

    match board.piece_at(from) {
        Some(p) if p.side == us && p.kind == PieceType::Pawn => {}
        _ => {
            return Err(NotationError::new(
                token,
                format!("there is no {} pawn on {from}", us.to_human()),
            ))
        }
    }

    let mv = Move {
        from,
        to,
        promotion,
    };
    if board.is_move_legal(mv, true) {
        Ok(mv)
    } else {
        Err(NotationError::new(
            token,
            format!("the pawn move {from}{to} is not legal"),
        ))
    }
}

fn resolve_piece(
    board: &Board,
    token: &str,
    us: Side,
    kind: PieceType,
    to: Square,
    file_hint: Option<u8>,
    rank_hint: Option<u8>,
) -> Result<Move, NotationError> {
    let occupied = board.occupied();
    // pieces of ours that attack the destination, read backwards from it
    let reach = match kind {
        PieceType::Knight => ATTACK_TABLES.knight[to.index()],
        PieceType::King => ATTACK_TABLES.king[to.index()],
        PieceType::Bishop => bitboard::bishop_attacks(to.index() as u8, occupied),
        PieceType::Rook => bitboard::rook_attacks(to.index() as u8, occupied),
        PieceType::Queen => bitboard::queen_attacks(to.index() as u8, occupied),
        PieceType::Pawn => unreachable!("pawn tokens are resolved separately"),
    };
    let candidates = reach & board.piece_bb(us, kind);

    let mut resolved = Vec::new();
    for sq in BitboardIter(candidates) {
        let from = Square::new(sq);
        if file_hint.is_some_and(|f| from.file() != f) {
            continue;
        }
        if rank_hint.is_some_and(|r| from.rank() != r) {
            continue;
        }
        let mv = Move::new(from, to);
        if board.is_move_legal(mv, true) {
            resolved.push(mv);
        }
    }

    match resolved.as_slice() {
        [] => Err(NotationError::new(
            token,
            format!("no {} can move to {to}", kind.to_human()),
        )),
        [only] => Ok(*only),
        _ => Err(NotationError::new(
            token,
            format!("more than one {} can move to {to}", kind.to_human()),
        )),
    }
}

/// Drop check marks, annotation glyphs and en-passant suffixes.
fn strip_annotations(token: &str) -> &str {
    let mut s = token.trim();
    loop {
        let mut t = s.trim_end_matches(&['+', '#', '!', '?'][..]).trim_end();
        if let Some(rest) = t.strip_suffix("e.p.") {
            t = rest.trim_end();
        } else if let Some(rest) = t.strip_suffix("ep") {
            t = rest.trim_end();
        }
        if t == s {
            return s;
        }
        s = t;
    }
}

/// Split a trailing promotion out of the token body. Accepts `e8=Q` (any
/// case after the `=`) and the bare `e8Q` form.
fn split_promotion<'a>(
    body: &'a str,
    token: &str,
) -> Result<(&'a str, Option<PieceType>), NotationError> {
    let promotion_kind = |c: char| -> Result<PieceType, NotationError> {
        match PieceType::from_notation(c) {
            Some(PieceType::Pawn) | Some(PieceType::King) | None => Err(NotationError::new(
                token,
                format!("unknown promotion letter `{c}`"),
            )),
            Some(kind) => Ok(kind),
        }
    };

    if let Some(pos) = body.find('=') {
        let target = &body[pos + 1..];
        let mut chars = target.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Ok((&body[..pos], Some(promotion_kind(c)?))),
            _ => Err(NotationError::new(
                token,
                format!("malformed promotion `{target}`"),
            )),
        };
    }

    // bare form: an uppercase piece letter right after the rank digit
    let mut chars = body.chars().rev();
    if let (Some(last), Some(before)) = (chars.next(), chars.next()) {
        if matches!(last, 'Q' | 'R' | 'B' | 'N') && before.is_ascii_digit() {
            return Ok((&body[..body.len() - 1], Some(promotion_kind(last)?)));
        }
    }
    Ok((body, None))
}
