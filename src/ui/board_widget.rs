use crate::game::{Color as Side, Move, Position};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const LIGHT_SQUARE: Color = Color::Rgb(240, 217, 181);
const DARK_SQUARE: Color = Color::Rgb(181, 136, 99);
const LAST_MOVE: Color = Color::Rgb(205, 210, 106);
const FILES: &str = "abcdefgh";

/// Board as styled lines, rank 8 at the top, with rank and file labels.
///
/// The origin and destination of `last_move` are highlighted.
pub fn board_lines(position: &Position, last_move: Option<&Move>) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(10);

    for rank in (0..8u8).rev() {
        let mut spans = vec![Span::raw(format!("{} ", rank + 1))];
        for file in 0..8u8 {
            let index = rank * 8 + file;
            let highlighted = last_move.is_some_and(|m| m.from == index || m.to == index);
            let bg = if highlighted {
                LAST_MOVE
            } else if (rank + file) % 2 == 0 {
                DARK_SQUARE
            } else {
                LIGHT_SQUARE
            };

            let (symbol, fg) = match position.piece_at(index) {
                Some((piece, side)) => {
                    let fg = match side {
                        Side::White => Color::White,
                        Side::Black => Color::Black,
                    };
                    (format!(" {} ", piece.to_string(side)), fg)
                }
                None => ("   ".to_string(), bg),
            };
            spans.push(Span::styled(
                symbol,
                Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::from(spans));
    }

    let mut footer = vec![Span::raw("  ")];
    footer.extend(FILES.chars().map(|f| Span::raw(format!(" {f} "))));
    lines.push(Line::from(footer));

    lines
}

/// Render the board, centred, inside a bordered block.
pub fn render_board(frame: &mut Frame, position: &Position, last_move: Option<&Move>, area: Rect) {
    let widget = Paragraph::new(board_lines(position, last_move))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Board"));
    frame.render_widget(widget, area);
}
