use std::io;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use rand::rngs::StdRng;
use ratatui::{backend::Backend, Terminal};

use crate::ai::Agent;
use crate::environment::ChessEnv;
use crate::game::{Color, Move, Position};
use crate::training::{play_episode_observed, EpisodeOptions, EpisodeResult, GameRecorder};

use super::game_view::{self, GameView};

/// Plays one game between two agents and shows it move by move.
pub struct Viewer {
    move_delay: Duration,
    options: EpisodeOptions,
}

impl Viewer {
    pub fn new(move_delay: Duration, max_plies: Option<usize>) -> Self {
        Viewer {
            move_delay,
            options: EpisodeOptions {
                max_plies,
                ..Default::default()
            },
        }
    }

    /// Main viewer loop. Returns when the game ends and the user quits,
    /// or as soon as the user quits mid-game.
    pub fn run<B: Backend>(
        &self,
        terminal: &mut Terminal<B>,
        white: &mut dyn Agent,
        black: &mut dyn Agent,
        rng: &mut StdRng,
        recorder: &mut GameRecorder,
    ) -> io::Result<EpisodeResult> {
        let names = (white.name().to_string(), black.name().to_string());
        let mut env = ChessEnv::new();
        draw(terminal, &view(&names, env.position(), None, 0, None))?;

        let mut ply = 0;
        let mut quit = false;
        let mut failure = None;
        let result = play_episode_observed(
            &mut env,
            white,
            black,
            rng,
            &self.options,
            Some(&mut *recorder),
            |mv, position| {
                ply += 1;
                let step = draw(terminal, &view(&names, position, Some(mv), ply, None))
                    .and_then(|_| quit_requested(self.move_delay));
                match step {
                    Ok(false) => ControlFlow::Continue(()),
                    Ok(true) => {
                        quit = true;
                        ControlFlow::Break(())
                    }
                    Err(e) => {
                        failure = Some(e);
                        ControlFlow::Break(())
                    }
                }
            },
        );
        if let Some(e) = failure {
            return Err(e);
        }

        if !quit {
            let message = format!("{}. Press q to quit.", result_text(&result));
            let last_move = recorder_last_move(recorder);
            draw(
                terminal,
                &view(&names, env.position(), last_move.as_ref(), ply, Some(&message)),
            )?;
            while !quit_requested(Duration::from_millis(250))? {}
        }

        Ok(result)
    }
}

fn view<'a>(
    names: &'a (String, String),
    position: &'a Position,
    last_move: Option<&'a Move>,
    ply: usize,
    message: Option<&'a str>,
) -> GameView<'a> {
    GameView {
        white: &names.0,
        black: &names.1,
        position,
        last_move,
        ply,
        message,
    }
}

/// Human-readable game result.
pub fn result_text(result: &EpisodeResult) -> String {
    match result.winner {
        Some(Color::White) => "White wins".to_string(),
        Some(Color::Black) => "Black wins".to_string(),
        None => "Draw".to_string(),
    }
}

fn recorder_last_move(recorder: &GameRecorder) -> Option<Move> {
    recorder
        .current()
        .moves
        .last()
        .and_then(|m| Move::from_uci(&m.uci).ok())
}

fn draw<B: Backend>(terminal: &mut Terminal<B>, view: &GameView) -> io::Result<()> {
    terminal
        .draw(|f| game_view::render(f, view))
        .map(|_| ())
        .map_err(|e| io::Error::other(e.to_string()))
}

/// Wait up to `timeout` for a quit key.
fn quit_requested(timeout: Duration) -> io::Result<bool> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if !event::poll(remaining)? {
            return Ok(false);
        }
        if let Event::Key(key) = event::read()? {
            if is_quit_key(&key) {
                return Ok(true);
            }
        }
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_quit_keys() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert!(is_quit_key(&press(KeyCode::Char('q'))));
        assert!(is_quit_key(&press(KeyCode::Esc)));
        assert!(!is_quit_key(&press(KeyCode::Char('x'))));
        assert!(!is_quit_key(&press(KeyCode::Enter)));

        let mut release = press(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        assert!(!is_quit_key(&release));
    }

    #[test]
    fn test_result_text() {
        let result = |winner| EpisodeResult {
            winner,
            outcome: None,
            game_length: 10,
            fallbacks: 0,
        };
        assert_eq!(result_text(&result(Some(Color::White))), "White wins");
        assert_eq!(result_text(&result(Some(Color::Black))), "Black wins");
        assert_eq!(result_text(&result(None)), "Draw");
    }

    #[test]
    fn test_last_move_from_recorder() {
        let mut recorder = GameRecorder::new();
        recorder.start_game();
        assert_eq!(recorder_last_move(&recorder), None);

        let mv = Move::from_uci("g1f3").unwrap();
        let position = Position::initial().push(&mv).unwrap();
        recorder.log_move(&mv, &position);
        assert_eq!(recorder_last_move(&recorder), Some(mv));
    }
}
