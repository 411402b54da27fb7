use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mathtower::config::GameConfig;
use mathtower::game::{Answer, GameSession};
use mathtower::question::Operation;
use mathtower::runtime::{FixedTicker, QuizEvent, Runner, TestEventSource};
use mathtower::session::Phase;
use mathtower::surface::ViewState;
use rand::{rngs::StdRng, SeedableRng};

// Each tick moves the game clock by this much, independent of wall time
const VIRTUAL_STEP: Duration = Duration::from_millis(250);

fn key(c: char) -> QuizEvent {
    QuizEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Headless integration using the internal runtime + GameSession without a TTY
#[test]
fn headless_game_runs_to_completion() {
    let mut session = GameSession::with_rng(
        GameConfig::default(),
        ViewState::new(),
        StdRng::seed_from_u64(42),
    );
    session.start(Operation::Addition, "fast").unwrap();

    let (tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(1));
    let runner = Runner::new(es, ticker);

    // Producer: a few answers up front, the rest of the game times out
    for c in ['1', '2', '3', '4'] {
        tx.send(key(c)).unwrap();
    }

    let mut now = Duration::ZERO;
    for _ in 0..1_000u32 {
        match runner.step() {
            QuizEvent::Tick => {
                now += VIRTUAL_STEP;
                session.advance_to(now);
            }
            QuizEvent::Resize => {}
            QuizEvent::Key(key) => {
                if let KeyCode::Char(c) = key.code {
                    let index = c.to_digit(10).unwrap() as usize - 1;
                    if !session.surface().choices_locked {
                        session.submit_answer(Answer::Choice(index)).unwrap();
                    }
                }
            }
        }
        if session.surface().final_report.is_some() {
            break;
        }
    }

    assert_eq!(session.phase(), Phase::Ended);
    let report = session.surface().final_report.unwrap();
    assert_eq!(Some(report), session.final_report());
    assert!(report.total_questions >= 4);
    assert!(report.correct_answers <= report.total_questions);
    assert_eq!(session.pending_timers(), 0);
    assert_eq!(session.surface().seconds_remaining, Some(0));
}

#[test]
fn headless_perfect_game_builds_full_tower() {
    let mut session = GameSession::with_rng(
        GameConfig::default(),
        ViewState::new(),
        StdRng::seed_from_u64(7),
    );
    session.start(Operation::Multiplication, "medium").unwrap();

    let mut now = Duration::ZERO;
    while session.phase() == Phase::Running {
        if let Some(round) = session.current_round().filter(|r| r.is_open()) {
            let index = round.correct_index().unwrap();
            session.submit_answer(Answer::Choice(index)).unwrap();
        }
        now += VIRTUAL_STEP;
        session.advance_to(now);
    }
    session.advance_to(now + Duration::from_secs(1));

    let report = session.final_report().unwrap();
    assert_eq!(report.correct_answers, report.total_questions);
    assert_eq!(report.accuracy, 100);
    assert_eq!(session.surface().tower_height as u32, report.correct_answers);
    // instant answers outrun the informational question estimate
    assert_eq!(session.state().max_possible_questions, 30);
    assert!(report.total_questions > 30);
    assert!(report.total_questions <= 60);
}

#[test]
fn headless_replay_after_reset() {
    let mut session = GameSession::with_rng(
        GameConfig::default(),
        ViewState::new(),
        StdRng::seed_from_u64(3),
    );
    session.start(Operation::Subtraction, "slow").unwrap();
    session.advance_to(Duration::from_secs(61));
    assert_eq!(session.phase(), Phase::Ended);

    session.reset().unwrap();
    assert_eq!(session.surface(), &ViewState::new());

    session.start(Operation::Division, "fast").unwrap();
    assert_eq!(session.phase(), Phase::Running);
    assert_eq!(session.state().total_questions, 0);
    assert_eq!(session.state().seconds_remaining, 60);
    assert!(session.surface().question.is_some());
}
