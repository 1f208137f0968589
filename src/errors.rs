//! Error types for the fallible boundaries of the engine: position loading
//! and move notation. Illegal moves are not errors — `Board::do_move`
//! reports them by returning `false`.

use std::error::Error;
use std::fmt;

use crate::types::Side;

/// A structurally invalid FEN string. Each variant carries the offending
/// input so the caller can show it back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// The string does not split into the six mandatory fields.
    FieldCount(usize),
    /// The piece placement field is malformed.
    Placement(String),
    /// The side-to-move field is not `w` or `b`.
    SideToMove(String),
    /// The castling field is not `-` or a combination of `KQkq`.
    Castling(String),
    /// The en-passant field is not `-` or a square.
    EnPassant(String),
    /// The half-move clock is not a non-negative integer.
    HalfMoveClock(String),
    /// The full-move number is not a positive integer.
    FullMoveNumber(String),
    /// A side does not have exactly one king.
    KingCount(Side, u32),
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::FieldCount(n) => {
                write!(f, "FEN must have 6 space-separated fields, found {n}")
            }
            FenError::Placement(s) => write!(f, "invalid piece placement: `{s}`"),
            FenError::SideToMove(s) => write!(f, "side to move must be `w` or `b`, found `{s}`"),
            FenError::Castling(s) => write!(f, "invalid castling availability: `{s}`"),
            FenError::EnPassant(s) => write!(f, "invalid en-passant square: `{s}`"),
            FenError::HalfMoveClock(s) => write!(f, "invalid half-move clock: `{s}`"),
            FenError::FullMoveNumber(s) => write!(f, "invalid full-move number: `{s}`"),
            FenError::KingCount(side, n) => {
                write!(f, "{} must have exactly one king, found {n}", side.to_human())
            }
        }
    }
}

impl Error for FenError {}

/// A SAN token that could not be resolved to an unambiguous legal move.
/// The reason is a complete sentence fragment fit for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotationError {
    pub token: String,
    pub reason: String,
}

impl NotationError {
    pub(crate) fn new(token: &str, reason: impl Into<String>) -> NotationError {
        NotationError {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for NotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot interpret `{}`: {}", self.token, self.reason)
    }
}

impl Error for NotationError {}
