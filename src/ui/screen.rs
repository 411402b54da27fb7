use crossterm::event::{KeyCode, KeyEvent};
use mathtower::question::{Operation, CHOICE_COUNT};
use ratatui::Frame;

use crate::{
    ui::{render_game, render_game_over, render_menu},
    App, AppState,
};

/// A UI Screen boundary: responsible for rendering and optional key handling
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
    /// Optional per-screen key handling. Returns true if the key was handled.
    fn on_key(&mut self, _key: KeyEvent, _app: &mut App) -> bool {
        false
    }
}

/// Start screen: pick an operation and a speed, Enter starts once both are set
pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_menu(app, f);
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> bool {
        match key.code {
            KeyCode::Char(c) => {
                if let Some(operation) = operation_for_key(c) {
                    app.select_operation(operation);
                    return true;
                }
                match c.to_digit(10) {
                    Some(d) if d >= 1 => app.select_speed(d as usize - 1),
                    _ => false,
                }
            }
            KeyCode::Enter => matches!(app.start(), Ok(true)),
            _ => false,
        }
    }
}

/// Game screen: keys 1-4 pick an answer
pub struct GameScreen;

impl Screen for GameScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_game(app, f);
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> bool {
        let KeyCode::Char(c) = key.code else {
            return false;
        };
        match c.to_digit(10) {
            Some(d) if (1..=CHOICE_COUNT as u32).contains(&d) => {
                app.answer(d as usize - 1);
                true
            }
            _ => false,
        }
    }
}

/// Results screen
pub struct GameOverScreen;

impl Screen for GameOverScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_game_over(app, f);
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> bool {
        match key.code {
            KeyCode::Char('r') | KeyCode::Enter => {
                app.play_again();
                true
            }
            _ => false,
        }
    }
}

pub fn operation_for_key(c: char) -> Option<Operation> {
    match c {
        '+' | 'a' => Some(Operation::Addition),
        '-' | 's' => Some(Operation::Subtraction),
        '*' | 'x' | 'm' => Some(Operation::Multiplication),
        '/' | 'd' => Some(Operation::Division),
        _ => None,
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Menu => Box::new(MenuScreen),
        AppState::Playing => Box::new(GameScreen),
        AppState::GameOver => Box::new(GameOverScreen),
    }
}
