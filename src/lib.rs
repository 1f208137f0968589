pub mod bitboard;
pub mod board;
pub mod castling;
pub mod errors;
pub mod game;
pub mod movegen;
pub mod perft;
pub mod san;
pub mod types;
pub mod zobrist;
