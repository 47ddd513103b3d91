pub mod board;
pub mod eval_constants;
pub mod game;
pub mod generator;
pub mod lookup;
pub mod notation;
pub mod opening;
pub mod rules;
