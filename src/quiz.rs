use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizItem {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const QUIZ_ITEMS: &[QuizItem] = &[
    QuizItem {
        question: "Identify the verb tense in the sentence: 'She has been working all day.'",
        answer: "Present Perfect Continuous",
    },
    QuizItem {
        question: "Choose the correct sentence: 'She don't like ice cream' or 'She doesn't like ice cream.'",
        answer: "She doesn't like ice cream.",
    },
    QuizItem {
        question: "What is the opposite of the word 'strong'?",
        answer: "weak",
    },
    QuizItem {
        question: "Identify the subject in the sentence: 'The dog barked loudly.'",
        answer: "The dog",
    },
    QuizItem {
        question: "Choose the correct form of the verb: 'He _____ to the store yesterday.' (go, goes, went)",
        answer: "went",
    },
    QuizItem {
        question: "What is the correct plural form of 'mouse'?",
        answer: "mice",
    },
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizOutcome {
    /// Blank submission. Nothing was graded and the question is unchanged.
    Empty,
    Correct,
    Incorrect { answer: &'static str },
}

/// Quiz state for one session.
///
/// A wrong answer keeps the current question so it can be retried; only a
/// correct answer or [`QuizEngine::next`] picks a new one.
pub struct QuizEngine<R: Rng = StdRng> {
    items: &'static [QuizItem],
    current: usize,
    rng: R,
    answered: usize,
    correct: usize,
}

impl QuizEngine<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(QUIZ_ITEMS, StdRng::from_os_rng())
    }
}

impl<R: Rng> QuizEngine<R> {
    /// Panics if `items` is empty.
    pub fn new(items: &'static [QuizItem], rng: R) -> Self {
        assert!(!items.is_empty(), "quiz needs at least one item");
        let mut engine = Self {
            items,
            current: 0,
            rng,
            answered: 0,
            correct: 0,
        };
        engine.select();
        engine
    }

    pub fn current(&self) -> &QuizItem {
        &self.items[self.current]
    }

    pub fn answered(&self) -> usize {
        self.answered
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn submit(&mut self, answer: &str) -> QuizOutcome {
        let guess = answer.trim();
        if guess.is_empty() {
            return QuizOutcome::Empty;
        }

        self.answered += 1;
        let expected = self.current().answer;
        if guess.to_lowercase() == expected.to_lowercase() {
            self.correct += 1;
            debug!(answered = self.answered, "quiz answer correct");
            self.select();
            QuizOutcome::Correct
        } else {
            debug!(answered = self.answered, "quiz answer incorrect");
            QuizOutcome::Incorrect { answer: expected }
        }
    }

    pub fn next(&mut self) {
        self.select();
    }

    fn select(&mut self) {
        self.current = self.rng.random_range(0..self.items.len());
    }
}
