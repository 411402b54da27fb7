use log::warn;
use rand::{rngs::ThreadRng, seq::SliceRandom, Rng};
use std::fmt;
use std::str::FromStr;

/// Number of choices shown for every question
pub const CHOICE_COUNT: usize = 4;

/// Upper bound on distractor sampling before falling back to sequential values
pub const MAX_DISTRACTOR_ATTEMPTS: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
    ];

    pub fn symbol(&self) -> char {
        match self {
            Operation::Addition => '+',
            Operation::Subtraction => '-',
            Operation::Multiplication => '×',
            Operation::Division => '÷',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOperationError(pub String);

impl fmt::Display for ParseOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation '{}'", self.0)
    }
}

impl std::error::Error for ParseOperationError {}

impl FromStr for Operation {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "addition" | "+" => Ok(Operation::Addition),
            "subtraction" | "-" => Ok(Operation::Subtraction),
            "multiplication" | "*" | "×" => Ok(Operation::Multiplication),
            "division" | "/" | "÷" => Ok(Operation::Division),
            _ => Err(ParseOperationError(s.to_string())),
        }
    }
}

/// A single arithmetic question. Never mutated once generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub operation: Operation,
    pub lhs: u32,
    pub rhs: u32,
    pub correct_answer: u32,
}

impl Question {
    pub fn prompt(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.operation.symbol(), self.rhs)
    }
}

/// Four distinct positive choices, exactly one of which is the correct answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerSet([u32; CHOICE_COUNT]);

impl AnswerSet {
    pub fn values(&self) -> &[u32; CHOICE_COUNT] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.0.get(index).copied()
    }

    pub fn position_of(&self, value: u32) -> Option<usize> {
        self.0.iter().position(|&v| v == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &u32> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        CHOICE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Produces questions and their distractors from a pseudo-random source
#[derive(Debug)]
pub struct QuestionGenerator<R: Rng = ThreadRng> {
    rng: R,
}

impl<R: Rng> QuestionGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate(&mut self, operation: Operation) -> Question {
        let (lhs, rhs, correct_answer) = match operation {
            Operation::Addition => {
                // lhs stops at 9 so the rhs range [1, 10 - lhs] is never empty
                let lhs = self.rng.gen_range(1..=9);
                let rhs = self.rng.gen_range(1..=10 - lhs);
                (lhs, rhs, lhs + rhs)
            }
            Operation::Subtraction => {
                let answer = self.rng.gen_range(1..=10);
                let rhs = self.rng.gen_range(1..=8);
                (rhs + answer, rhs, answer)
            }
            Operation::Multiplication => {
                let lhs = self.rng.gen_range(1..=9);
                let rhs = self.rng.gen_range(1..=9);
                (lhs, rhs, lhs * rhs)
            }
            Operation::Division => {
                let rhs = self.rng.gen_range(1..=5);
                let answer = self.rng.gen_range(1..=20 / rhs);
                (rhs * answer, rhs, answer)
            }
        };

        Question {
            operation,
            lhs,
            rhs,
            correct_answer,
        }
    }

    /// Build the shuffled choice set: the correct answer plus three nearby distractors.
    pub fn generate_distractors(&mut self, correct_answer: u32, operation: Operation) -> AnswerSet {
        let mut choices = [correct_answer; CHOICE_COUNT];
        let mut filled = 1;
        let mut attempts = 0;

        while filled < CHOICE_COUNT && attempts < MAX_DISTRACTOR_ATTEMPTS {
            attempts += 1;
            let base = correct_answer as i64;
            let mut candidate = base + self.rng.gen_range(-5..=4);
            if operation == Operation::Division && candidate < 1 {
                candidate = base + self.rng.gen_range(1..=5);
            }

            match u32::try_from(candidate) {
                Ok(value) if value > 0 && !choices[..filled].contains(&value) => {
                    choices[filled] = value;
                    filled += 1;
                }
                _ => {}
            }
        }

        if filled < CHOICE_COUNT {
            warn!(
                "distractor sampling exhausted after {} attempts for {}, filling sequentially",
                attempts, correct_answer
            );
            // count up from the answer, then down once u32::MAX is reached
            let mut up = correct_answer.checked_add(1);
            let mut down = correct_answer.checked_sub(1).filter(|&v| v > 0);
            while filled < CHOICE_COUNT {
                let next = match (up, down) {
                    (Some(v), _) => {
                        up = v.checked_add(1);
                        v
                    }
                    (None, Some(v)) => {
                        down = v.checked_sub(1).filter(|&v| v > 0);
                        v
                    }
                    (None, None) => break,
                };
                if !choices[..filled].contains(&next) {
                    choices[filled] = next;
                    filled += 1;
                }
            }
        }

        // SliceRandom::shuffle is a Fisher-Yates shuffle
        choices.shuffle(&mut self.rng);
        AnswerSet(choices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{
        rngs::{mock::StepRng, StdRng},
        SeedableRng,
    };

    fn seeded(seed: u64) -> QuestionGenerator<StdRng> {
        QuestionGenerator::with_rng(StdRng::seed_from_u64(seed))
    }

    fn operation_strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            Just(Operation::Addition),
            Just(Operation::Subtraction),
            Just(Operation::Multiplication),
            Just(Operation::Division),
        ]
    }

    proptest! {
        #[test]
        fn addition_sums_stay_within_ten(seed in any::<u64>()) {
            let q = seeded(seed).generate(Operation::Addition);
            prop_assert_eq!(q.lhs + q.rhs, q.correct_answer);
            prop_assert!(q.correct_answer <= 10);
            prop_assert!(q.lhs >= 1 && q.rhs >= 1);
        }

        #[test]
        fn subtraction_results_are_small_and_positive(seed in any::<u64>()) {
            let q = seeded(seed).generate(Operation::Subtraction);
            prop_assert_eq!(q.lhs - q.rhs, q.correct_answer);
            prop_assert!(q.lhs <= 18);
            prop_assert!((1..=10).contains(&q.correct_answer));
            prop_assert!((1..=8).contains(&q.rhs));
        }

        #[test]
        fn multiplication_factors_are_single_digits(seed in any::<u64>()) {
            let q = seeded(seed).generate(Operation::Multiplication);
            prop_assert!((1..=9).contains(&q.lhs));
            prop_assert!((1..=9).contains(&q.rhs));
            prop_assert_eq!(q.lhs * q.rhs, q.correct_answer);
        }

        #[test]
        fn division_is_always_whole(seed in any::<u64>()) {
            let q = seeded(seed).generate(Operation::Division);
            prop_assert_eq!(q.rhs * q.correct_answer, q.lhs);
            prop_assert!((1..=5).contains(&q.rhs));
            prop_assert!(q.correct_answer >= 1);
            prop_assert!(q.lhs <= 20);
        }

        #[test]
        fn answer_sets_are_distinct_positive_and_contain_answer(
            seed in any::<u64>(),
            operation in operation_strategy(),
        ) {
            let mut generator = seeded(seed);
            let q = generator.generate(operation);
            let answers = generator.generate_distractors(q.correct_answer, operation);

            prop_assert_eq!(answers.len(), CHOICE_COUNT);
            prop_assert!(answers.iter().all(|&v| v > 0));
            let occurrences = answers.iter().filter(|&&v| v == q.correct_answer).count();
            prop_assert_eq!(occurrences, 1);
            let mut sorted = *answers.values();
            sorted.sort_unstable();
            prop_assert!(sorted.windows(2).all(|w| w[0] != w[1]));
        }

        #[test]
        fn distractors_stay_near_the_answer(seed in any::<u64>(), correct in 1u32..=90) {
            let answers = seeded(seed).generate_distractors(correct, Operation::Multiplication);
            for &v in answers.iter() {
                let offset = v as i64 - correct as i64;
                prop_assert!((-5..=4).contains(&offset));
            }
        }
    }

    #[test]
    fn division_distractors_for_one_are_resampled_upwards() {
        let mut generator = seeded(7);
        for _ in 0..200 {
            let answers = generator.generate_distractors(1, Operation::Division);
            assert!(answers.iter().all(|&v| (1..=6).contains(&v)));
            assert_eq!(answers.iter().filter(|&&v| v == 1).count(), 1);
        }
    }

    #[test]
    fn smallest_answer_still_gets_three_distractors() {
        let mut generator = seeded(11);
        for _ in 0..200 {
            let answers = generator.generate_distractors(1, Operation::Addition);
            assert!(answers.iter().all(|&v| (1..=5).contains(&v)));
            assert!(answers.position_of(1).is_some());
        }
    }

    #[test]
    fn shuffle_places_correct_answer_in_every_slot() {
        let mut generator = seeded(3);
        let mut seen = [false; CHOICE_COUNT];
        for _ in 0..400 {
            let answers = generator.generate_distractors(12, Operation::Multiplication);
            seen[answers.position_of(12).unwrap()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn prompt_uses_operation_symbol() {
        let q = Question {
            operation: Operation::Division,
            lhs: 12,
            rhs: 3,
            correct_answer: 4,
        };
        assert_eq!(q.prompt(), "12 ÷ 3");

        let q = Question {
            operation: Operation::Addition,
            lhs: 2,
            rhs: 5,
            correct_answer: 7,
        };
        assert_eq!(q.prompt(), "2 + 5");
    }

    #[test]
    fn operation_parses_names_and_symbols() {
        assert_eq!("addition".parse::<Operation>(), Ok(Operation::Addition));
        assert_eq!("Division".parse::<Operation>(), Ok(Operation::Division));
        assert_eq!("*".parse::<Operation>(), Ok(Operation::Multiplication));
        assert_eq!("-".parse::<Operation>(), Ok(Operation::Subtraction));
        assert_eq!(
            "modulo".parse::<Operation>(),
            Err(ParseOperationError("modulo".to_string()))
        );
    }

    #[test]
    fn operation_display_is_lowercase() {
        assert_eq!(Operation::Multiplication.to_string(), "multiplication");
        assert_eq!(Operation::Addition.to_string(), "addition");
    }

    fn sorted(set: &AnswerSet) -> Vec<u32> {
        let mut values = set.values().to_vec();
        values.sort_unstable();
        values
    }

    #[test]
    fn exhausted_sampling_fills_upwards() {
        // a zero rng always draws the lowest offset, so every candidate for 1 is negative
        let mut generator = QuestionGenerator::with_rng(StepRng::new(0, 0));
        let set = generator.generate_distractors(1, Operation::Addition);
        assert_eq!(sorted(&set), vec![1, 2, 3, 4]);
        assert_eq!(set.iter().filter(|&&v| v == 1).count(), 1);
    }

    #[test]
    fn exhausted_sampling_walks_down_from_u32_max() {
        let mut generator = QuestionGenerator::with_rng(StepRng::new(0, 0));
        let set = generator.generate_distractors(u32::MAX, Operation::Subtraction);
        assert_eq!(
            sorted(&set),
            vec![u32::MAX - 5, u32::MAX - 2, u32::MAX - 1, u32::MAX]
        );
    }

    #[test]
    fn distractors_near_u32_max_never_wrap() {
        for seed in 0..200 {
            let set = seeded(seed).generate_distractors(u32::MAX, Operation::Addition);
            let values = sorted(&set);
            assert!(values.iter().all(|&v| v >= u32::MAX - 5), "{:?}", values);
            assert!(values.windows(2).all(|w| w[0] < w[1]), "{:?}", values);
            assert_eq!(values.last(), Some(&u32::MAX));
        }
    }
}
