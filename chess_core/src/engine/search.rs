use crate::clock::now_ms;
use crate::engine::config::EngineConfig;
use crate::engine::eval::SimpleEvaluator;
use crate::engine::movegen::EngineMoveGen;
use crate::engine::tt::{TTFlag, TranspositionTable};
use crate::engine::{Evaluator, Move, SearchLimit, SearchResult, Searcher};
use crate::logic::board::{Board, Color};
use crate::logic::game::Position;
use crate::logic::opening::OpeningBook;
use crate::logic::rules::{has_insufficient_material, is_in_check};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use thiserror::Error;

const INFINITY: i32 = 1_000_000;
// Nodes between clock polls
const TIME_CHECK_INTERVAL: u64 = 1024;
/// Hard ceiling for iterative deepening when only a time budget is given.
pub const MAX_SEARCH_DEPTH: u8 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchAbort {
    #[error("search time budget exhausted")]
    Timeout,
    #[error("{0} king missing from a searched position")]
    MissingKing(Color),
}

pub struct AlphaBetaEngine {
    config: Arc<EngineConfig>,
    evaluator: SimpleEvaluator,
    book: OpeningBook,
    tt: TranspositionTable,
    rng: StdRng,
    nodes: u64,
    next_time_check: u64,
    start_time: f64,
    time_limit: Option<f64>,
}

fn make_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// Side-to-move score to a white-relative one.
const fn white_relative(score: i32, side: Color) -> i32 {
    match side {
        Color::White => score,
        Color::Black => -score,
    }
}

impl AlphaBetaEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        let tt = TranspositionTable::new(config.tt_capacity);
        Self::with_table(config, tt)
    }

    /// Uses a caller-supplied table, e.g. one shared between engines on purpose.
    pub fn with_table(config: Arc<EngineConfig>, tt: TranspositionTable) -> Self {
        Self {
            evaluator: SimpleEvaluator::new(config.clone()),
            book: OpeningBook::new(config.book_variety),
            rng: make_rng(config.seed),
            config,
            tt,
            nodes: 0,
            next_time_check: TIME_CHECK_INTERVAL,
            start_time: 0.0,
            time_limit: None,
        }
    }

    pub fn into_table(self) -> TranspositionTable {
        self.tt
    }

    pub const fn table(&self) -> &TranspositionTable {
        &self.tt
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: Arc<EngineConfig>) {
        if config.tt_capacity != self.tt.capacity() {
            self.tt = TranspositionTable::new(config.tt_capacity);
        }
        if config.seed != self.config.seed || config.seed.is_some() {
            self.rng = make_rng(config.seed);
        }
        self.book = OpeningBook::new(config.book_variety);
        self.evaluator = SimpleEvaluator::new(config.clone());
        self.config = config;
    }

    /// Static evaluation of a board, white-relative.
    pub fn evaluate(&self, board: &Board) -> i32 {
        self.evaluator.evaluate(board)
    }

    /// Best move for the side to move, or `None` when there is nothing to play.
    /// A zero `time_limit_ms` searches to `max_depth` without a clock.
    pub fn find_best_move(
        &mut self,
        position: &Position,
        max_depth: u8,
        time_limit_ms: u64,
    ) -> Option<SearchResult> {
        let time_limit = (time_limit_ms > 0).then_some(time_limit_ms);
        self.run(position, max_depth, time_limit)
    }

    /// Searches with the depth and time budget carried by the engine's own config,
    /// e.g. the ones a difficulty preset wrote.
    pub fn find_configured_move(&mut self, position: &Position) -> Option<SearchResult> {
        let limit = SearchLimit::from(self.config.as_ref());
        self.search(position, limit)
    }

    fn run(
        &mut self,
        position: &Position,
        max_depth: u8,
        time_limit_ms: Option<u64>,
    ) -> Option<SearchResult> {
        self.nodes = 0;
        self.next_time_check = TIME_CHECK_INTERVAL;
        self.start_time = now_ms();
        #[allow(clippy::cast_precision_loss)]
        let time_limit = time_limit_ms.map(|t| t as f64);
        self.time_limit = time_limit;

        if position.is_game_over {
            return None;
        }

        let board = position.board;
        let moves = EngineMoveGen::new(&self.config).generate_moves(&board, None);
        let first = *moves.as_slice().first()?;

        if moves.len() == 1 {
            log::debug!("only move {first}");
            let evaluation = self.evaluate(&board.with_move(&first));
            return Some(self.result(first, evaluation, 0, false));
        }

        if self.config.use_opening_book {
            if let Some(book_move) = self.book.get_book_move(position, &mut self.rng) {
                let evaluation = self.evaluate(&board.with_move(&book_move.mv));
                return Some(self.result(book_move.mv, evaluation, 0, true));
            }
        }

        if !self.config.persistent_tt {
            self.tt.clear();
        }
        self.tt.new_search();

        let order: Vec<Move> = moves.iter().copied().collect();
        match self.iterate(&board, order, max_depth.clamp(1, MAX_SEARCH_DEPTH)) {
            Ok(result) => Some(result),
            Err(err) => {
                log::warn!("search failed ({err}), playing a random legal move");
                let mv = *moves.as_slice().choose(&mut self.rng)?;
                Some(self.result(mv, self.evaluate(&board), 0, false))
            }
        }
    }

    fn iterate(
        &mut self,
        board: &Board,
        mut order: Vec<Move>,
        max_depth: u8,
    ) -> Result<SearchResult, SearchAbort> {
        let side = board.side_to_move;
        let mut completed: Option<(Vec<(Move, i32)>, u8)> = None;

        for depth in 1..=max_depth {
            if depth > 1 && self.out_of_time() {
                break;
            }

            let mut scored = Vec::with_capacity(order.len());
            match self.search_root(board, depth, &order, &mut scored) {
                Ok(()) => {
                    // Stable: equal scores keep the previous iteration's order
                    scored.sort_by(|a, b| b.1.cmp(&a.1));
                    order = scored.iter().map(|(mv, _)| *mv).collect();
                    let top = scored.first().map_or(0, |(_, s)| *s);
                    log::debug!(
                        "depth {depth}: best {} score {top} nodes {}",
                        order.first().map_or_else(String::new, ToString::to_string),
                        self.nodes
                    );
                    completed = Some((scored, depth));
                    if top.abs() > self.config.mate_threshold {
                        break;
                    }
                }
                Err(SearchAbort::Timeout) => {
                    log::debug!("timeout during depth {depth} after {} nodes", self.nodes);
                    if completed.is_none() && !scored.is_empty() {
                        scored.sort_by(|a, b| b.1.cmp(&a.1));
                        completed = Some((scored, depth));
                    }
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        let (scored, depth) = match completed {
            Some(done) => done,
            None => {
                // Not even one root move finished: first ordered move
                let mv = *order.first().ok_or(SearchAbort::Timeout)?;
                let score = white_relative(self.evaluate(&board.with_move(&mv)), side);
                (vec![(mv, score)], 0)
            }
        };

        let (mv, score) = self.pick(&scored).ok_or(SearchAbort::Timeout)?;
        Ok(self.result(mv, white_relative(score, side), depth, false))
    }

    /// Best root move, or a random one among the near-best when randomness is on.
    fn pick(&mut self, scored: &[(Move, i32)]) -> Option<(Move, i32)> {
        let &(best_move, best) = scored.first()?;
        if !self.config.is_randomized() || best.abs() > self.config.mate_threshold {
            return Some((best_move, best));
        }
        let candidates: Vec<(Move, i32)> = scored
            .iter()
            .take(self.config.random_top_moves)
            .filter(|(_, s)| best - *s <= self.config.random_margin)
            .copied()
            .collect();
        candidates.choose(&mut self.rng).copied()
    }

    fn search_root(
        &mut self,
        board: &Board,
        depth: u8,
        order: &[Move],
        scored: &mut Vec<(Move, i32)>,
    ) -> Result<(), SearchAbort> {
        let key = self.tt.hash(board);
        // Randomized play needs exact scores for the runner-up moves too
        let full_window = self.config.is_randomized();
        let mut alpha = -INFINITY;
        let mut best: Option<(Move, i32)> = None;

        for mv in order {
            let child = board.with_move(mv);
            let lower = if full_window { -INFINITY } else { alpha };
            let score = -self.alpha_beta(&child, depth - 1, 1, -INFINITY, -lower)?;
            scored.push((*mv, score));
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((*mv, score));
            }
            alpha = alpha.max(score);
        }

        if let Some((mv, score)) = best {
            self.tt.store(key, Some(mv), score, depth, TTFlag::Exact);
        }
        Ok(())
    }

    fn alpha_beta(
        &mut self,
        board: &Board,
        depth: u8,
        ply: u8,
        mut alpha: i32,
        mut beta: i32,
    ) -> Result<i32, SearchAbort> {
        self.nodes += 1;
        self.check_time()?;

        let color = board.side_to_move;
        if board.king_square(color).is_none() {
            return Err(SearchAbort::MissingKing(color));
        }

        if has_insufficient_material(board) {
            return Ok(0);
        }

        let key = self.tt.hash(board);
        let alpha_orig = alpha;
        let mut tt_move = None;

        if let Some(entry) = self.tt.probe(key) {
            tt_move = entry.best_move;
            if entry.depth >= depth {
                let score = self.score_from_table(entry.score, ply);
                match entry.flag {
                    TTFlag::Exact => return Ok(score),
                    TTFlag::LowerBound => alpha = alpha.max(score),
                    TTFlag::UpperBound => beta = beta.min(score),
                }
                if alpha >= beta {
                    return Ok(score);
                }
            }
        }

        if depth == 0 {
            return Ok(self.quiescence(board, alpha, beta, 0));
        }

        let moves = EngineMoveGen::new(&self.config).generate_moves(board, tt_move);
        if moves.is_empty() {
            return Ok(if is_in_check(board, color) {
                -(self.config.mate_score - i32::from(ply))
            } else {
                0
            });
        }

        let mut best_score = -INFINITY;
        let mut best_move = None;

        for mv in moves.iter() {
            let child = board.with_move(mv);
            let score = -self.alpha_beta(&child, depth - 1, ply + 1, -beta, -alpha)?;

            if score > best_score {
                best_score = score;
                best_move = Some(*mv);
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }

        let flag = if best_score <= alpha_orig {
            TTFlag::UpperBound
        } else if best_score >= beta {
            TTFlag::LowerBound
        } else {
            TTFlag::Exact
        };
        let stored = self.score_to_table(best_score, ply);
        self.tt.store(key, best_move, stored, depth, flag);

        Ok(best_score)
    }

    /// Captures and promotions only. Not interrupted by the clock.
    fn quiescence(&mut self, board: &Board, mut alpha: i32, beta: i32, qdepth: u8) -> i32 {
        self.nodes += 1;

        let color = board.side_to_move;
        let mut stand_pat = white_relative(self.evaluator.evaluate(board), color);
        if is_in_check(board, color) {
            stand_pat -= self.config.check_penalty;
        }

        if stand_pat >= beta {
            return beta;
        }
        alpha = alpha.max(stand_pat);

        if qdepth >= self.config.quiescence_depth {
            return alpha;
        }

        let captures = EngineMoveGen::new(&self.config).generate_captures(board);
        for mv in captures.iter() {
            // Delta pruning
            let mut gain = board
                .captured_piece(mv)
                .map_or(0, |p| self.config.piece_value(p.piece_type));
            if let Some(promotion) = mv.promotion {
                gain += self.config.piece_value(promotion) - self.config.val_pawn;
            }
            if stand_pat + gain + self.config.delta_margin < alpha {
                continue;
            }

            let child = board.with_move(mv);
            let score = -self.quiescence(&child, -beta, -alpha, qdepth + 1);
            if score >= beta {
                return beta;
            }
            alpha = alpha.max(score);
        }

        alpha
    }

    /// Mate scores are stored relative to the node, not the root.
    fn score_to_table(&self, score: i32, ply: u8) -> i32 {
        let ply = i32::from(ply);
        if score > self.config.mate_threshold {
            score + ply
        } else if score < -self.config.mate_threshold {
            score - ply
        } else {
            score
        }
    }

    fn score_from_table(&self, score: i32, ply: u8) -> i32 {
        let ply = i32::from(ply);
        if score > self.config.mate_threshold {
            score - ply
        } else if score < -self.config.mate_threshold {
            score + ply
        } else {
            score
        }
    }

    fn elapsed(&self) -> f64 {
        now_ms() - self.start_time
    }

    fn out_of_time(&self) -> bool {
        self.time_limit.is_some_and(|limit| self.elapsed() > limit)
    }

    /// Polls the clock once at least `TIME_CHECK_INTERVAL` nodes have passed,
    /// counting quiescence nodes too.
    fn check_time(&mut self) -> Result<(), SearchAbort> {
        if self.nodes < self.next_time_check {
            return Ok(());
        }
        self.next_time_check = self.nodes + TIME_CHECK_INTERVAL;
        if self.out_of_time() {
            return Err(SearchAbort::Timeout);
        }
        Ok(())
    }

    fn result(&self, best_move: Move, evaluation: i32, depth: u8, book_hit: bool) -> SearchResult {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let time_ms = self.elapsed().max(0.0) as u64;
        SearchResult {
            best_move,
            evaluation,
            nodes: self.nodes,
            depth,
            time_ms,
            book_hit,
        }
    }
}

impl Searcher for AlphaBetaEngine {
    fn search(&mut self, position: &Position, limit: SearchLimit) -> Option<SearchResult> {
        let (depth, time_ms) = match limit {
            SearchLimit::Depth(d) => (d, None),
            SearchLimit::Time(t) => (MAX_SEARCH_DEPTH, Some(t)),
            SearchLimit::DepthAndTime { depth, time_ms } => (depth, Some(time_ms)),
        };
        self.run(position, depth, time_ms)
    }
}
