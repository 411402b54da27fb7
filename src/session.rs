use crate::question::Operation;
use crate::util::accuracy_percent;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub phase: Phase,
    pub operation: Option<Operation>,
    pub speed: Option<String>,
    pub score: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    // Informational only; the global countdown ends the game
    pub max_possible_questions: u64,
    pub seconds_remaining: u64,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn accuracy(&self) -> u32 {
        accuracy_percent(self.correct_answers, self.total_questions)
    }

    pub fn report(&self) -> FinalReport {
        FinalReport {
            score: self.score,
            correct_answers: self.correct_answers,
            total_questions: self.total_questions,
            accuracy: self.accuracy(),
        }
    }
}

/// End-of-game summary handed to the presentation surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalReport {
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub accuracy: u32,
}

impl fmt::Display for FinalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} av {} ({}%)",
            self.correct_answers, self.total_questions, self.accuracy
        )
    }
}
