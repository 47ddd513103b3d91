use crate::engine::config::EngineConfig;
use crate::engine::search::AlphaBetaEngine;
use crate::engine::{SearchLimit, SearchResult, Searcher};
use crate::logic::game::Position;
use gloo_worker::{HandlerId, Worker, WorkerScope};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize, Deserialize)]
pub enum Input {
    /// Without a limit the config's own depth and time budget apply.
    ComputeMove(Position, Option<SearchLimit>, EngineConfig),
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Output {
    MoveFound(SearchResult),
    /// The position is finished or has no legal move.
    NoMove,
}

/// Runs searches off the UI thread. The engine, and with it the
/// transposition table, lives across requests.
pub struct GameWorker {
    engine: Option<AlphaBetaEngine>,
}

impl GameWorker {
    fn compute(
        &mut self,
        position: &Position,
        limit: Option<SearchLimit>,
        config: EngineConfig,
    ) -> Output {
        let config = Arc::new(config);
        let engine = self
            .engine
            .get_or_insert_with(|| AlphaBetaEngine::new(config.clone()));
        engine.update_config(config);

        let found = match limit {
            Some(limit) => engine.search(position, limit),
            None => engine.find_configured_move(position),
        };
        match found {
            Some(result) => Output::MoveFound(result),
            None => {
                log::debug!("no move for game {}", position.id);
                Output::NoMove
            }
        }
    }
}

impl Worker for GameWorker {
    type Input = Input;
    type Message = ();
    type Output = Output;

    fn create(_scope: &WorkerScope<Self>) -> Self {
        Self { engine: None }
    }

    fn update(&mut self, _scope: &WorkerScope<Self>, _msg: Self::Message) {}

    fn received(&mut self, scope: &WorkerScope<Self>, msg: Self::Input, id: HandlerId) {
        match msg {
            Input::ComputeMove(position, limit, config) => {
                let output = self.compute(&position, limit, config);
                scope.respond(id, output);
            }
        }
    }
}
