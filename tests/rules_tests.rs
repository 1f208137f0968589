//! End-to-end fixtures for the rules engine: FEN round trips, known legal
//! move sets, castling and en-passant sequences, and full-game SAN replays.

use pretty_assertions::assert_eq;

use chesskit::board::{Board, STARTING_POSITION_FEN};
use chesskit::game::{Game, Status};
use chesskit::san;
use chesskit::types::{Move, Side};

fn mv(s: &str) -> Move {
    Move::from_coordinate(s).unwrap()
}

#[test]
fn fen_round_trips_bit_for_bit() {
    let fens = [
        STARTING_POSITION_FEN,
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/5Q2/PPPBBPpP/RN2K2R w KQkq - 0 2",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "7k/8/7P/6K1/pr2q3/6p1/8/8 w - - 1 49",
        "8/8/4k3/8/8/4K3/8/8 w - - 42 99",
    ];
    for fen in fens {
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(board.fen(), fen);
        // reloading the emitted FEN reproduces the board state exactly
        assert_eq!(Board::from_fen(&board.fen()).unwrap(), board);
        assert!(board.is_consistent());
    }
}

#[test]
fn forty_seven_legal_moves() {
    let board =
        Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/5Q2/PPPBBPpP/RN2K2R w KQkq - 0 2")
            .unwrap();
    let moves = board.legal_moves();
    assert_eq!(moves.len(), 47);

    for expected in ["b1a3", "e1d1", "h1g1", "d5e6", "e5f7", "f3f6", "d2b4"] {
        assert!(moves.contains(&mv(expected)), "missing {expected}");
    }
    // the g2 pawn covers f1, so king-side castling is out, and the b1
    // knight blocks the queen side
    assert!(!moves.contains(&mv("e1g1")));
    assert!(!moves.contains(&mv("e1c1")));
    assert!(!moves.contains(&mv("e1f1")));
}

#[test]
fn castling_end_to_end() {
    let mut board =
        Board::from_fen("r1bqk1nr/pppp1ppp/2n5/2b1p3/4P3/5N2/PPPPBPPP/RNBQK2R w KQkq - 0 1")
            .unwrap();
    assert!(board.do_move(mv("e1g1"), true));
    assert_eq!(
        board.fen(),
        "r1bqk1nr/pppp1ppp/2n5/2b1p3/4P3/5N2/PPPPBPPP/RNBQ1RK1 b kq - 1 1"
    );
}

#[test]
fn en_passant_sequence_step_by_step() {
    let mut board =
        Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();

    let steps = [
        // no white pawn can answer d5, so no target is armed
        ("d7d5", "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"),
        ("e4e5", "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2"),
        // the e5 pawn can capture f6 en passant, so f6 is armed
        ("f7f5", "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3"),
        // the en-passant capture removes the f5 pawn
        ("e5f6", "rnbqkbnr/ppp1p1pp/5P2/3p4/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3"),
        ("e7f6", "rnbqkbnr/ppp3pp/5p2/3p4/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 4"),
    ];
    for (m, fen) in steps {
        assert!(board.do_move(mv(m), true), "move {m} rejected");
        assert_eq!(board.fen(), fen, "after {m}");
        assert!(board.is_consistent());
    }
}

/// Morphy's opera game: 33 tokens covering captures, pins, a file
/// disambiguation, queen-side castling, checks and a mate.
const OPERA_GAME: [&str; 33] = [
    "e4", "e5", "Nf3", "d6", "d4", "Bg4", "dxe5", "Bxf3", "Qxf3", "dxe5", "Bc4", "Nf6", "Qb3",
    "Qe7", "Nc3", "c6", "Bg5", "b5", "Nxb5", "cxb5", "Bxb5+", "Nbd7", "O-O-O", "Rd8", "Rxd7",
    "Rxd7", "Rd1", "Qe6", "Bxd7+", "Nxd7", "Qb8+", "Nxb8", "Rd8#",
];

#[test]
fn san_replay_of_a_full_game() {
    let mut game = Game::new();
    for token in OPERA_GAME {
        game.play_san(token).unwrap();
        // every reached position keeps the occupancy views in agreement
        // and round-trips through FEN exactly
        assert!(game.board().is_consistent());
        assert_eq!(
            &Board::from_fen(&game.board().fen()).unwrap(),
            game.board()
        );
    }

    assert_eq!(
        game.board().fen(),
        "1n1Rkb1r/p4ppp/4q3/4p1B1/4P3/8/PPP2PPP/2K5 b k - 1 17"
    );
    assert_eq!(game.status(), Some(Status::Checkmate(Side::Black)));
    assert_eq!(game.result_marker(), "1-0");
}

#[test]
fn san_encoding_reproduces_the_game_record() {
    let mut game = Game::new();
    for token in OPERA_GAME {
        game.play_san(token).unwrap();
    }
    let encoded: Vec<String> = game.san_history();
    let expected: Vec<String> = OPERA_GAME.iter().map(|t| t.to_string()).collect();
    assert_eq!(encoded, expected);
}

#[test]
fn fixed_positions_along_the_game() {
    let mut game = Game::new();
    let checkpoints = [
        (21, "rn2kb1r/p3qppp/5n2/1B2p1B1/4P3/1Q6/PPP2PPP/R3K2R b KQkq - 0 11"),
        (22, "r3kb1r/p2nqppp/5n2/1B2p1B1/4P3/1Q6/PPP2PPP/R3K2R w KQkq - 1 12"),
        (23, "r3kb1r/p2nqppp/5n2/1B2p1B1/4P3/1Q6/PPP2PPP/2KR3R b kq - 2 12"),
    ];
    for (ply, token) in OPERA_GAME.iter().enumerate() {
        game.play_san(token).unwrap();
        for (at, fen) in checkpoints {
            if ply + 1 == at {
                assert_eq!(game.board().fen(), fen, "after ply {at}");
            }
        }
    }
}

#[test]
fn undo_rewinds_to_the_start() {
    let mut game = Game::new();
    for token in OPERA_GAME {
        game.play_san(token).unwrap();
    }
    while game.undo().is_some() {}
    assert_eq!(game.board().fen(), STARTING_POSITION_FEN);
    assert_eq!(game.status(), None);
}

#[test]
fn unresolvable_tokens_are_rejected_not_guessed() {
    let board = Board::new();
    // unparsable
    for token in ["", "??", "Md4", "e9", "Qh4e9", "a8=X"] {
        let err = san::parse_san(&board, token).unwrap_err();
        assert_eq!(err.token, token);
        assert!(!err.reason.is_empty());
    }
    // well-formed but impossible
    for token in ["Qd4", "Nc6", "exd5", "O-O"] {
        assert!(san::parse_san(&board, token).is_err(), "{token} should fail");
    }
    // ambiguous without a hint
    let two_rooks = Board::from_fen("8/1k6/8/8/8/8/4K3/R6R w - - 0 1").unwrap();
    let err = san::parse_san(&two_rooks, "Rd1").unwrap_err();
    assert!(err.reason.contains("more than one rook"));
}

#[test]
fn decoded_moves_match_generated_moves() {
    // every generated legal move survives an encode-decode cycle on the
    // position it came from
    let fens = [
        STARTING_POSITION_FEN,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/5Q2/PPPBBPpP/RN2K2R w KQkq - 0 2",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
    ];
    for fen in fens {
        let board = Board::from_fen(fen).unwrap();
        for m in board.legal_moves() {
            let mut copy = board.clone();
            let entry = copy.do_move_logged(m, false).unwrap();
            let token = san::to_san(&entry);
            let decoded = san::parse_san(&board, &token)
                .unwrap_or_else(|e| panic!("{fen}: {token} failed to decode: {e}"));
            assert_eq!(decoded, m, "{fen}: {token}");
        }
    }
}
