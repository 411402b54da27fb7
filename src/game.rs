use crate::config::GameConfig;
use crate::question::{AnswerSet, Operation, Question, QuestionGenerator, CHOICE_COUNT};
use crate::round_timer::RoundTimer;
use crate::scheduler::{Scheduler, TimerHandle};
use crate::session::{FinalReport, Phase, SessionState};
use crate::surface::{ChoiceMark, Surface, Warning};
use log::{debug, info};
use rand::{rngs::ThreadRng, Rng};
use std::fmt;
use std::time::Duration;

pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
/// Pause after an answer before the next question appears
pub const FEEDBACK_DELAY: Duration = Duration::from_millis(1000);
/// Pause between the end of the game and the results screen
pub const RESULTS_DELAY: Duration = Duration::from_millis(500);
pub const WARNING_DISPLAY: Duration = Duration::from_secs(2);
pub const HALFWAY_WARNING_SECS: u64 = 30;
pub const FINAL_WARNING_SECS: u64 = 10;

/// What the player did with a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Choice(usize),
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameEvent {
    CountdownTick,
    RoundProgress(u32),
    RoundExpired(u32),
    AdvanceRound(u32),
    DismissWarning,
    RevealResults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    InvalidPhase { action: &'static str, phase: Phase },
    UnknownSpeed(String),
    NoOpenRound,
    ChoiceOutOfRange(usize),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidPhase { action, phase } => {
                write!(f, "cannot {} while the game is {}", action, phase)
            }
            SessionError::UnknownSpeed(speed) => write!(f, "unknown speed '{}'", speed),
            SessionError::NoOpenRound => write!(f, "no question is waiting for an answer"),
            SessionError::ChoiceOutOfRange(index) => write!(
                f,
                "choice {} is out of range (0..{})",
                index, CHOICE_COUNT
            ),
        }
    }
}

impl std::error::Error for SessionError {}

/// One question-answer cycle
#[derive(Debug, Clone)]
pub struct Round {
    number: u32,
    question: Question,
    answers: AnswerSet,
    timer: RoundTimer,
    outcome: Option<Outcome>,
}

impl Round {
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn correct_index(&self) -> Option<usize> {
        self.answers.position_of(self.question.correct_answer)
    }

    pub fn is_open(&self) -> bool {
        self.outcome.is_none()
    }
}

/// Drives a quiz game: global countdown, rounds, scoring and the end of game.
///
/// Time only moves when the owner calls [`GameSession::advance_to`]. Every
/// timer the session arms is tracked here and cancelled on each transition;
/// handlers still check the phase and round number before acting.
pub struct GameSession<S: Surface, R: Rng = ThreadRng> {
    config: GameConfig,
    state: SessionState,
    generator: QuestionGenerator<R>,
    scheduler: Scheduler<GameEvent>,
    surface: S,
    round: Option<Round>,
    round_duration: Duration,
    rounds_started: u32,
    countdown: Option<TimerHandle>,
    next_round: Option<TimerHandle>,
    warning_dismissal: Option<TimerHandle>,
    results: Option<TimerHandle>,
    warnings_shown: Vec<Warning>,
    final_report: Option<FinalReport>,
}

impl<S: Surface> GameSession<S, ThreadRng> {
    pub fn new(config: GameConfig, surface: S) -> Self {
        Self::with_rng(config, surface, rand::thread_rng())
    }
}

impl<S: Surface, R: Rng> GameSession<S, R> {
    pub fn with_rng(config: GameConfig, surface: S, rng: R) -> Self {
        Self {
            config,
            state: SessionState::default(),
            generator: QuestionGenerator::with_rng(rng),
            scheduler: Scheduler::new(),
            surface,
            round: None,
            round_duration: Duration::ZERO,
            rounds_started: 0,
            countdown: None,
            next_round: None,
            warning_dismissal: None,
            results: None,
            warnings_shown: Vec::new(),
            final_report: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn final_report(&self) -> Option<FinalReport> {
        self.final_report
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Number of timers still armed
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn start(&mut self, operation: Operation, speed: &str) -> Result<(), SessionError> {
        if self.state.phase != Phase::Idle {
            return Err(SessionError::InvalidPhase {
                action: "start",
                phase: self.state.phase,
            });
        }
        let round_duration = self
            .config
            .question_duration(speed)
            .ok_or_else(|| SessionError::UnknownSpeed(speed.to_string()))?;

        self.cancel_timers();
        self.round = None;
        self.rounds_started = 0;
        self.warnings_shown.clear();
        self.final_report = None;
        self.round_duration = round_duration;
        self.state = SessionState {
            phase: Phase::Running,
            operation: Some(operation),
            speed: Some(speed.to_string()),
            max_possible_questions: self.config.max_possible_questions(speed).unwrap_or(0),
            seconds_remaining: self.config.game_duration,
            ..Default::default()
        };

        info!(
            "starting {} game at {} speed ({}ms per question, up to {} questions)",
            operation,
            speed,
            round_duration.as_millis(),
            self.state.max_possible_questions
        );

        self.surface.dismiss_warning();
        self.surface.show_score(0);
        self.surface
            .show_time_remaining(self.state.seconds_remaining, 1.0);
        self.countdown = Some(self.scheduler.every(COUNTDOWN_TICK, GameEvent::CountdownTick));
        self.start_round();
        Ok(())
    }

    pub fn submit_answer(&mut self, answer: Answer) -> Result<Outcome, SessionError> {
        if !self.state.is_active() {
            return Err(SessionError::InvalidPhase {
                action: "answer",
                phase: self.state.phase,
            });
        }
        if let Answer::Choice(index) = answer {
            if index >= CHOICE_COUNT {
                return Err(SessionError::ChoiceOutOfRange(index));
            }
        }
        let round = match self.round.as_mut() {
            Some(round) if round.is_open() => round,
            _ => return Err(SessionError::NoOpenRound),
        };

        round.timer.cancel(&mut self.scheduler);

        let correct = round.question.correct_answer;
        let outcome = match answer {
            Answer::TimedOut => Outcome::TimedOut,
            Answer::Choice(index) if round.answers.get(index) == Some(correct) => Outcome::Correct,
            Answer::Choice(_) => Outcome::Incorrect,
        };
        round.outcome = Some(outcome);
        let number = round.number;
        let correct_index = round.correct_index();

        self.surface.lock_choices();
        match (answer, outcome) {
            (Answer::Choice(index), Outcome::Correct) => {
                self.surface.mark_choice(index, ChoiceMark::Correct);
                self.state.score += 1;
                self.state.correct_answers += 1;
                self.surface.grow_tower();
            }
            (Answer::Choice(index), _) => {
                self.surface.mark_choice(index, ChoiceMark::Wrong);
                if let Some(ci) = correct_index {
                    self.surface.mark_choice(ci, ChoiceMark::Correct);
                }
            }
            (Answer::TimedOut, _) => {}
        }
        self.state.total_questions += 1;
        self.surface.show_score(self.state.score);

        debug!(
            "round {} resolved {:?} ({}/{})",
            number, outcome, self.state.correct_answers, self.state.total_questions
        );

        self.scheduler.cancel_slot(&mut self.next_round);
        self.next_round = Some(
            self.scheduler
                .once(FEEDBACK_DELAY, GameEvent::AdvanceRound(number)),
        );
        Ok(outcome)
    }

    /// Stop the game and schedule the results. Returns `None` when the game
    /// was not running.
    pub fn end_game(&mut self) -> Option<FinalReport> {
        if self.state.phase != Phase::Running {
            return None;
        }
        self.state.phase = Phase::Ended;

        self.cancel_timers();
        self.surface.lock_choices();
        self.surface.dismiss_warning();

        let report = self.state.report();
        self.final_report = Some(report);
        self.results = Some(self.scheduler.once(RESULTS_DELAY, GameEvent::RevealResults));

        info!("game over: score {}, {}", report.score, report);
        Some(report)
    }

    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.state.phase == Phase::Running {
            return Err(SessionError::InvalidPhase {
                action: "reset",
                phase: self.state.phase,
            });
        }
        self.cancel_timers();
        self.scheduler.cancel_slot(&mut self.results);
        self.round = None;
        self.rounds_started = 0;
        self.warnings_shown.clear();
        self.final_report = None;
        self.state = SessionState::default();
        self.surface.clear_round_visuals();
        Ok(())
    }

    /// Fire everything due up to `now`, in order
    pub fn advance_to(&mut self, now: Duration) {
        while let Some((_, event)) = self.scheduler.pop_due(now) {
            self.dispatch(event);
        }
        self.scheduler.settle(now);
    }

    pub fn advance_by(&mut self, delta: Duration) {
        let target = self.scheduler.now() + delta;
        self.advance_to(target);
    }

    fn dispatch(&mut self, event: GameEvent) {
        match event {
            GameEvent::CountdownTick => self.on_countdown_tick(),
            GameEvent::RoundProgress(number) => self.on_round_progress(number),
            GameEvent::RoundExpired(number) => {
                if self.state.is_active() && self.is_open_round(number) {
                    if let Err(e) = self.submit_answer(Answer::TimedOut) {
                        debug!("round {} expiry rejected: {}", number, e);
                    }
                }
            }
            GameEvent::AdvanceRound(number) => {
                self.next_round = None;
                let current = self.round.as_ref().map(Round::number);
                if self.state.is_active() && current == Some(number) {
                    self.start_round();
                }
            }
            GameEvent::DismissWarning => {
                self.warning_dismissal = None;
                self.surface.dismiss_warning();
            }
            GameEvent::RevealResults => {
                self.results = None;
                if let (Phase::Ended, Some(report)) = (self.state.phase, self.final_report) {
                    self.surface.show_final_report(&report);
                }
            }
        }
    }

    fn is_open_round(&self, number: u32) -> bool {
        self.round
            .as_ref()
            .is_some_and(|r| r.number == number && r.is_open())
    }

    fn on_countdown_tick(&mut self) {
        if !self.state.is_active() {
            return;
        }
        self.state.seconds_remaining = self.state.seconds_remaining.saturating_sub(1);
        let remaining = self.state.seconds_remaining;
        let fraction = remaining as f64 / self.config.game_duration.max(1) as f64;
        self.surface.show_time_remaining(remaining, fraction);

        match remaining {
            HALFWAY_WARNING_SECS => self.raise_warning(Warning::Halfway),
            FINAL_WARNING_SECS => self.raise_warning(Warning::FinalSeconds),
            _ => {}
        }

        if remaining == 0 {
            self.end_game();
        }
    }

    fn raise_warning(&mut self, warning: Warning) {
        if self.warnings_shown.contains(&warning) {
            return;
        }
        self.warnings_shown.push(warning);
        self.surface.show_warning(warning);
        self.scheduler.cancel_slot(&mut self.warning_dismissal);
        self.warning_dismissal = Some(
            self.scheduler
                .once(WARNING_DISPLAY, GameEvent::DismissWarning),
        );
    }

    fn on_round_progress(&mut self, number: u32) {
        if !self.state.is_active() {
            return;
        }
        let now = self.scheduler.now();
        let round = match self.round.as_mut() {
            Some(round) if round.number == number && round.is_open() => round,
            _ => return,
        };
        let fraction = round.timer.remaining_fraction(now);
        self.surface.show_round_progress(fraction);
        if fraction <= 0.0 {
            round.timer.stop_progress(&mut self.scheduler);
        }
    }

    fn start_round(&mut self) {
        let Some(operation) = self.state.operation else {
            return;
        };
        if let Some(previous) = self.round.as_mut() {
            previous.timer.cancel(&mut self.scheduler);
        }

        self.rounds_started += 1;
        let number = self.rounds_started;
        let question = self.generator.generate(operation);
        let answers = self
            .generator
            .generate_distractors(question.correct_answer, operation);

        self.surface.show_question(&question.prompt());
        self.surface.show_choices(&answers);
        self.surface.show_round_progress(1.0);

        let mut timer = RoundTimer::new(self.round_duration);
        timer.arm(
            &mut self.scheduler,
            GameEvent::RoundProgress(number),
            GameEvent::RoundExpired(number),
        );
        debug!("round {}: {} = {}", number, question, question.correct_answer);

        self.round = Some(Round {
            number,
            question,
            answers,
            timer,
            outcome: None,
        });
    }

    /// Cancel the countdown, the current round's timers and any pending
    /// next-round or warning dismissal. Safe to call repeatedly.
    fn cancel_timers(&mut self) {
        self.scheduler.cancel_slot(&mut self.countdown);
        self.scheduler.cancel_slot(&mut self.next_round);
        self.scheduler.cancel_slot(&mut self.warning_dismissal);
        if let Some(round) = self.round.as_mut() {
            round.timer.cancel(&mut self.scheduler);
        }
    }
}
