use chess_core::engine::config::EngineConfig;
use chess_core::engine::search::AlphaBetaEngine;
use chess_core::engine::Move;
use chess_core::logic::game::{GameStatus, Position};
use std::sync::Arc;

fn engine() -> AlphaBetaEngine {
    AlphaBetaEngine::new(Arc::new(EngineConfig {
        use_opening_book: false,
        ..EngineConfig::default()
    }))
}

fn play(position: &Position, uci: &str) -> Position {
    let mv = Move::from_uci(uci).expect("valid move text");
    position.apply(&mv).expect("legal move")
}

#[test]
fn test_engine_delivers_mate_in_one() {
    let position = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
    let result = engine().find_best_move(&position, 3, 0).unwrap();
    let next = position.apply(&result.best_move).unwrap();

    assert!(next.is_checkmate);
    assert_eq!(next.status, GameStatus::Checkmate);
    assert_eq!(next.winner, Some(chess_core::logic::board::Color::White));
    assert!(next.notation().ends_with("Ra8"));
}

#[test]
fn test_mate_in_two_is_forced() {
    let start = Position::from_fen("7k/8/8/8/8/8/R7/1R4K1 w - - 0 1").unwrap();
    let mut e = engine();
    let first = e.find_best_move(&start, 4, 0).unwrap();
    assert_eq!(first.evaluation, 10_000 - 3);

    let after = start.apply(&first.best_move).unwrap();
    let replies = after.all_legal_moves(None);
    assert!(!replies.is_empty());

    // Whatever black does, white mates on the next move
    for reply in replies {
        let defended = play(&after, &format!("{}{}", reply.from, reply.to));
        let finish = e.find_best_move(&defended, 2, 0).unwrap();
        let mated = defended.apply(&finish.best_move).unwrap();
        assert!(mated.is_checkmate, "no mate after {}", reply.notation);
    }
}

#[test]
fn test_defender_avoids_mate_in_one() {
    // Black to move must stop Ra8, e.g. by making luft
    let position = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 b - - 0 1").unwrap();
    let result = engine().find_best_move(&position, 3, 0).unwrap();
    let next = position.apply(&result.best_move).unwrap();
    let reply = engine().find_best_move(&next, 2, 0).unwrap();
    let after = next.apply(&reply.best_move).unwrap();
    assert!(!after.is_checkmate);
}

#[test]
fn test_promotion_wins_material() {
    let position = Position::from_fen("3r3k/4P3/8/8/8/8/8/K7 w - - 0 1").unwrap();
    let result = engine().find_best_move(&position, 2, 0).unwrap();
    assert_eq!(result.best_move.to_string(), "e7d8q");
    assert!(result.evaluation > 500);
}
