use crate::game::{Color as Side, Move, Position};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::board_widget;

/// Everything the viewer draws for one frame.
pub struct GameView<'a> {
    pub white: &'a str,
    pub black: &'a str,
    pub position: &'a Position,
    pub last_move: Option<&'a Move>,
    pub ply: usize,
    pub message: Option<&'a str>,
}

pub fn render(frame: &mut Frame, view: &GameView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(11),    // Board
            Constraint::Length(3),  // Message
            Constraint::Length(3),  // Controls
        ])
        .split(frame.area());

    render_header(frame, view, chunks[0]);
    board_widget::render_board(frame, view.position, view.last_move, chunks[1]);
    render_message(frame, view.message, chunks[2]);
    render_controls(frame, chunks[3]);
}

/// Status line shown in the header.
pub fn status_text(view: &GameView) -> String {
    let players = format!("{} (White) vs {} (Black)", view.white, view.black);
    if view.position.is_game_over() {
        return format!("{players}  |  Game over after {} plies", view.ply);
    }
    let to_move = match view.position.side_to_move() {
        Side::White => "White",
        Side::Black => "Black",
    };
    let check = if view.position.is_check() { "  |  Check" } else { "" };
    format!("{players}  |  Ply {}  |  {to_move} to move{check}", view.ply)
}

fn render_header(frame: &mut Frame, view: &GameView, area: Rect) {
    let header = Paragraph::new(status_text(view))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Robo Knights"));

    frame.render_widget(header, area);
}

fn render_message(frame: &mut Frame, message: Option<&str>, area: Rect) {
    let msg_widget = Paragraph::new(message.unwrap_or(""))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let controls = Paragraph::new(Line::from("Q / Esc: Quit"))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));

    frame.render_widget(controls, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn view<'a>(position: &'a Position, ply: usize) -> GameView<'a> {
        GameView {
            white: "Random",
            black: "ActorCritic",
            position,
            last_move: None,
            ply,
            message: None,
        }
    }

    #[test]
    fn test_status_text_in_progress() {
        let position = Position::initial();
        assert_eq!(
            status_text(&view(&position, 0)),
            "Random (White) vs ActorCritic (Black)  |  Ply 0  |  White to move"
        );
    }

    #[test]
    fn test_status_text_game_over() {
        let mut position = Position::initial();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            position = position.push(&Move::from_uci(uci).unwrap()).unwrap();
        }
        let text = status_text(&view(&position, 4));
        assert!(text.ends_with("Game over after 4 plies"), "{text}");
    }

    #[test]
    fn test_render_draws_into_buffer() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let position = Position::initial();
        terminal
            .draw(|f| render(f, &view(&position, 0)))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(screen.contains("Robo Knights"));
        assert!(screen.contains("White to move"));
        assert!(screen.contains("Q / Esc: Quit"));
    }
}
