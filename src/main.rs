pub mod ui;

use crate::ui::screen::current_screen;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::warn;
use mathtower::{
    config::{ConfigStore, FileConfigStore, GameConfig},
    game::{Answer, GameSession, SessionError},
    question::Operation,
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, Runner},
    surface::ViewState,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

/// timed arithmetic quiz: every right answer adds a block to your tower
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "A timed multiple-choice arithmetic quiz. Pick an operation and a speed, then answer as many questions as you can before the clock runs out."
)]
pub struct Cli {
    /// operation to practise (pre-selected in the menu)
    #[clap(short = 'o', long, value_enum)]
    operation: Option<Operation>,

    /// speed label from the config, e.g. slow, medium or fast (pre-selected in the menu)
    #[clap(short = 's', long)]
    speed: Option<String>,

    /// path to a config.json with speed modes and the game duration
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match self.config {
            Some(ref path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Menu,
    Playing,
    GameOver,
}

/// Selections made on the start screen. The game may only start once both are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuState {
    pub operation: Option<Operation>,
    pub speed: Option<String>,
}

impl MenuState {
    pub fn is_ready(&self) -> bool {
        self.operation.is_some() && self.speed.is_some()
    }
}

pub struct App {
    pub session: GameSession<ViewState>,
    pub state: AppState,
    pub menu: MenuState,
}

impl App {
    pub fn new(cli: &Cli, config: GameConfig) -> Self {
        let speed = match cli.speed {
            Some(ref s) if config.question_duration(s).is_some() => Some(s.clone()),
            Some(ref s) => {
                warn!("ignoring unknown speed '{}'", s);
                None
            }
            None => None,
        };

        Self {
            session: GameSession::new(config, ViewState::new()),
            state: AppState::Menu,
            menu: MenuState {
                operation: cli.operation,
                speed,
            },
        }
    }

    pub fn speeds(&self) -> Vec<String> {
        self.session
            .config()
            .speeds()
            .into_iter()
            .map(String::from)
            .collect()
    }

    pub fn select_operation(&mut self, operation: Operation) {
        self.menu.operation = Some(operation);
    }

    /// Select the n-th speed (0-based, slowest first)
    pub fn select_speed(&mut self, index: usize) -> bool {
        match self.speeds().into_iter().nth(index) {
            Some(speed) => {
                self.menu.speed = Some(speed);
                true
            }
            None => false,
        }
    }

    /// Start a game if the menu is ready. Returns whether a game started.
    pub fn start(&mut self) -> Result<bool, SessionError> {
        let (Some(operation), Some(speed)) = (self.menu.operation, self.menu.speed.clone()) else {
            return Ok(false);
        };
        self.session.start(operation, &speed)?;
        self.state = AppState::Playing;
        Ok(true)
    }

    pub fn answer(&mut self, index: usize) {
        if self.state == AppState::Playing && !self.session.surface().choices_locked {
            // a round can close between the draw and the key press
            let _ = self.session.submit_answer(Answer::Choice(index));
        }
    }

    pub fn tick(&mut self, now: Duration) {
        self.session.advance_to(now);
        if self.state == AppState::Playing && self.session.surface().final_report.is_some() {
            self.state = AppState::GameOver;
        }
    }

    pub fn play_again(&mut self) {
        if self.session.reset().is_ok() {
            self.menu = MenuState::default();
            self.state = AppState::Menu;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config = cli.config_store().load();
    let mut app = App::new(&cli, config);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Some(report) = app.session.final_report() {
        println!("score {}: {}", report.score, report);
    }

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| ui(app, f))?;

        let event = runner.step();
        if !on_event(app, event, runner.elapsed()) {
            break;
        }
    }

    Ok(())
}

/// Bring the session up to `now`, then apply the event. Returns false once the user quits.
fn on_event(app: &mut App, event: QuizEvent, now: Duration) -> bool {
    // timers due before the key press fire first
    app.tick(now);

    match event {
        QuizEvent::Tick | QuizEvent::Resize => true,
        QuizEvent::Key(key) => {
            let ctrl_c =
                key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
            if key.code == KeyCode::Esc || ctrl_c {
                app.session.end_game();
                return false;
            }
            let mut screen = current_screen(&app.state);
            screen.on_key(key, app);
            true
        }
    }
}

fn ui(app: &App, f: &mut Frame) {
    current_screen(&app.state).render(app, f);
}
