use crate::question::{AnswerSet, CHOICE_COUNT};
use crate::session::FinalReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceMark {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// Shown when 30 seconds remain
    Halfway,
    /// Shown when 10 seconds remain
    FinalSeconds,
}

impl Warning {
    pub fn message(&self) -> &'static str {
        match self {
            Warning::Halfway => "Halvveis!",
            Warning::FinalSeconds => "10 SEKUND IGJEN!",
        }
    }

    pub fn is_dramatic(&self) -> bool {
        matches!(self, Warning::FinalSeconds)
    }
}

/// Everything the game session asks a front end to show.
/// Implementations only render; they never call back into the session.
pub trait Surface {
    fn show_question(&mut self, prompt: &str);
    fn show_choices(&mut self, choices: &AnswerSet);
    /// Choices stop accepting input until the next `show_choices`
    fn lock_choices(&mut self);
    fn mark_choice(&mut self, index: usize, mark: ChoiceMark);
    fn show_time_remaining(&mut self, seconds: u64, fraction: f64);
    fn show_round_progress(&mut self, fraction: f64);
    fn show_score(&mut self, score: u32);
    fn show_final_report(&mut self, report: &FinalReport);
    fn show_warning(&mut self, warning: Warning);
    fn dismiss_warning(&mut self);
    /// One block per correct answer
    fn grow_tower(&mut self);
    fn clear_round_visuals(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: u32,
    pub mark: Option<ChoiceMark>,
}

/// Plain view model of the game screen, rendered by the TUI
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub question: Option<String>,
    pub choices: Vec<Choice>,
    pub choices_locked: bool,
    pub seconds_remaining: Option<u64>,
    pub hourglass: f64,
    pub round_progress: f64,
    pub score: u32,
    pub warning: Option<Warning>,
    pub tower_height: usize,
    pub final_report: Option<FinalReport>,
}

impl ViewState {
    /// Number of choice slots the game screen lays out
    pub const SLOTS: usize = CHOICE_COUNT;

    pub fn new() -> Self {
        Self {
            hourglass: 1.0,
            round_progress: 1.0,
            ..Default::default()
        }
    }
}

impl Surface for ViewState {
    fn show_question(&mut self, prompt: &str) {
        self.question = Some(prompt.to_string());
    }

    fn show_choices(&mut self, choices: &AnswerSet) {
        self.choices = choices
            .iter()
            .map(|&value| Choice { value, mark: None })
            .collect();
        self.choices_locked = false;
        self.round_progress = 1.0;
    }

    fn lock_choices(&mut self) {
        self.choices_locked = true;
    }

    fn mark_choice(&mut self, index: usize, mark: ChoiceMark) {
        if let Some(choice) = self.choices.get_mut(index) {
            choice.mark = Some(mark);
        }
    }

    fn show_time_remaining(&mut self, seconds: u64, fraction: f64) {
        self.seconds_remaining = Some(seconds);
        self.hourglass = fraction.clamp(0.0, 1.0);
    }

    fn show_round_progress(&mut self, fraction: f64) {
        self.round_progress = fraction.clamp(0.0, 1.0);
    }

    fn show_score(&mut self, score: u32) {
        self.score = score;
    }

    fn show_final_report(&mut self, report: &FinalReport) {
        self.final_report = Some(*report);
    }

    fn show_warning(&mut self, warning: Warning) {
        self.warning = Some(warning);
    }

    fn dismiss_warning(&mut self) {
        self.warning = None;
    }

    fn grow_tower(&mut self) {
        self.tower_height += 1;
    }

    fn clear_round_visuals(&mut self) {
        *self = Self::new();
    }
}
