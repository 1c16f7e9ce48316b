//! Tic-tac-toe board model, win/draw rules and threat analysis.

mod action;
mod position;
pub mod rules;
mod threats;
mod types;

pub use action::Move;
pub use position::Position;
pub use threats::{Threats, detect_threats};
pub use types::{Board, Player, Square};
