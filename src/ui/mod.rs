//! Terminal UI: a board view that replays a game between two agents.

pub mod board_widget;
mod game_view;
mod viewer;

pub use game_view::GameView;
pub use viewer::{result_text, Viewer};
