/// Whole-number percentage of correct answers, 0 when nothing was answered
pub fn accuracy_percent(correct: u32, total: u32) -> u32 {
    match total {
        0 => 0,
        total => ((correct as f64 / total as f64) * 100.0).round() as u32,
    }
}

/// Floor of `game_secs / (question_ms / 1000)`, computed without floating point
pub fn max_questions(game_secs: u64, question_ms: u64) -> u64 {
    match question_ms {
        0 => 0,
        ms => game_secs.saturating_mul(1_000) / ms,
    }
}
