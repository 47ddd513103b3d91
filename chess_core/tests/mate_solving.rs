use chess_core::engine::config::EngineConfig;
use chess_core::engine::search::AlphaBetaEngine;
use chess_core::engine::{SearchLimit, Searcher};
use chess_core::logic::game::Position;
use std::sync::Arc;

fn engine() -> AlphaBetaEngine {
    AlphaBetaEngine::new(Arc::new(EngineConfig {
        use_opening_book: false,
        ..EngineConfig::default()
    }))
}

/// Searches deep enough to see the mating move land and checks the score.
pub fn solve_mate(fen: &str, mate_in: u8, expected: Option<&str>, name: &str) {
    let position = Position::from_fen(fen).expect("valid FEN");
    let mut engine = engine();

    // The mating ply needs one more level to see the empty reply list
    let limit = SearchLimit::Depth(mate_in * 2);

    println!("Solving {name}: mate in {mate_in}");
    let start = std::time::Instant::now();
    let result = engine.search(&position, limit).expect("no move found");
    let duration = start.elapsed();

    println!(
        "Found {} (eval {}, depth {}, nodes {}) in {:?}",
        result.best_move, result.evaluation, result.depth, result.nodes, duration
    );

    if let Some(expected) = expected {
        assert_eq!(result.best_move.to_string(), expected, "{name}");
    }
    assert!(position.is_legal_move(result.best_move.from, result.best_move.to));
    let mate_score = i32::from(mate_in) * 2 - 1;
    assert_eq!(result.evaluation.abs(), 10_000 - mate_score, "{name}");
}

#[test]
fn test_back_rank() {
    solve_mate("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 1, Some("a1a8"), "Back rank");
}

#[test]
fn test_black_back_rank() {
    solve_mate("r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1", 1, Some("a8a1"), "Black back rank");
}

#[test]
fn test_smothered() {
    // Knight f7 mates the cornered king boxed in by its own rook and pawns
    solve_mate("6rk/6pp/8/6N1/8/8/8/6K1 w - - 0 1", 1, Some("g5f7"), "Smothered");
}

#[test]
fn test_rook_ladder() {
    // Ra7 and Rb7 both force mate next move
    solve_mate("7k/8/8/8/8/8/R7/1R4K1 w - - 0 1", 2, None, "Rook ladder");
}
