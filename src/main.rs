//! Command-line front end: render positions, list legal moves, replay SAN,
//! run perft counts and random playouts.
//!
//! Usage examples:
//!   chesskit show --fen "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1"
//!   chesskit moves
//!   chesskit perft --depth 5 --parallel
//!   chesskit play e4 e5 Nf3 Nc6
//!   chesskit random --moves 30

use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use itertools::Itertools;
use rand::prelude::*;

use chesskit::board::{Board, STARTING_POSITION_FEN};
use chesskit::game::Game;
use chesskit::perft::{divide, perft, perft_parallel};
use chesskit::san;

#[derive(Parser, Debug)]
#[command(name = "chesskit")]
#[command(about = "Inspect chess positions, legal moves and notation")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a position
    Show {
        #[arg(long, default_value = STARTING_POSITION_FEN)]
        fen: String,
    },
    /// List the legal moves in SAN
    Moves {
        #[arg(long, default_value = STARTING_POSITION_FEN)]
        fen: String,
    },
    /// Count legal move paths to a fixed depth
    Perft {
        #[arg(long, default_value = STARTING_POSITION_FEN)]
        fen: String,

        #[arg(short, long, default_value_t = 5)]
        depth: u8,

        /// Split the root moves across threads
        #[arg(long)]
        parallel: bool,

        /// Print the node count under each root move
        #[arg(long)]
        divide: bool,
    },
    /// Apply SAN moves and print the resulting position and PGN
    Play {
        #[arg(long, default_value = STARTING_POSITION_FEN)]
        fen: String,

        /// Moves in SAN, e.g. e4 e5 Nf3
        moves: Vec<String>,
    },
    /// Play random legal moves until the game ends
    Random {
        #[arg(long, default_value = STARTING_POSITION_FEN)]
        fen: String,

        /// Maximum number of full moves
        #[arg(short, long, default_value_t = 40)]
        moves: u32,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    match args.command {
        Command::Show { fen } => {
            let board = Board::from_fen(&fen)?;
            print!("{board}");
            println!();
            println!("{} to move", board.side_to_move().to_human());
            println!("fen: {}", board.fen());
        }
        Command::Moves { fen } => {
            let board = Board::from_fen(&fen)?;
            let tokens = san_tokens(&board);
            println!("{} legal moves: {}", tokens.len(), tokens.iter().join(" "));
        }
        Command::Perft {
            fen,
            depth,
            parallel,
            divide: show_divide,
        } => {
            let board = Board::from_fen(&fen)?;
            if show_divide {
                for (m, nodes) in divide(&board, depth) {
                    println!("{m}: {nodes}");
                }
            }
            let now = Instant::now();
            let nodes = if parallel {
                perft_parallel(&board, depth)
            } else {
                perft(&board, depth)
            };
            let elapsed = now.elapsed().as_secs_f64();
            println!(
                "perft({depth}) = {nodes} ({elapsed:.3}s, {:.0} nodes/s)",
                nodes as f64 / elapsed
            );
        }
        Command::Play { fen, moves } => {
            let mut game = Game::from_fen(&fen)?;
            for token in &moves {
                game.play_san(token)
                    .map_err(|e| eyre!("after {}: {e}", game.san_history().iter().join(" ")))?;
            }
            print!("{}", game.board());
            println!();
            println!("fen: {}", game.board().fen());
            if let Some(status) = game.status() {
                println!("game over: {status:?}");
            }
            println!("{}", game.to_pgn());
        }
        Command::Random { fen, moves } => {
            let mut game = Game::from_fen(&fen)?;
            let mut rng = rand::thread_rng();
            for _ in 0..2 * moves {
                if game.status().is_some() {
                    break;
                }
                let legal = game.board().legal_moves();
                let Some(choice) = legal.choose(&mut rng) else {
                    break;
                };
                game.play(*choice);
            }
            print!("{}", game.board());
            println!();
            println!("fen: {}", game.board().fen());
            println!("{}", game.to_pgn());
        }
    }
    Ok(())
}

/// Encode every legal move of the position as SAN.
fn san_tokens(board: &Board) -> Vec<String> {
    board
        .legal_moves()
        .into_iter()
        .filter_map(|m| {
            let mut copy = board.clone();
            copy.do_move_logged(m, false).map(|entry| san::to_san(&entry))
        })
        .collect()
}
