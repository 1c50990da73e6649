use thiserror::Error;

use crate::model::ids::{QuizId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("a question needs at least 2 options, got {count}")]
    TooFewOptions { count: usize },

    #[error("correct option {correct:?} is not one of the options")]
    CorrectOptionMissing { correct: String },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question.
///
/// The correct option is always one of `options`; construction enforces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct_option: String,
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt is blank, fewer than two options
    /// are given, or the correct option is not among them.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        let correct_option = correct_option.into();

        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                count: options.len(),
            });
        }
        if !options.iter().any(|option| *option == correct_option) {
            return Err(QuestionError::CorrectOptionMissing {
                correct: correct_option,
            });
        }

        Ok(Self {
            prompt,
            options,
            correct_option,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    #[must_use]
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|option| option == value)
    }

    #[must_use]
    pub fn is_correct(&self, value: &str) -> bool {
        self.correct_option == value
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A quiz with its ordered questions. Read-only for the taking side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    name: String,
    questions: Vec<Question>,
    owner: Option<UserId>,
}

impl Quiz {
    #[must_use]
    pub fn new(
        id: QuizId,
        name: impl Into<String>,
        questions: Vec<Question>,
        owner: Option<UserId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            questions,
            owner,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Creator of the quiz, when the quiz document records one.
    #[must_use]
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Counts the indices whose recorded answer equals the question's correct option.
///
/// Missing or unanswered entries count as wrong; extra answers past the last
/// question are ignored.
#[must_use]
pub fn calculate_score(questions: &[Question], answers: &[Option<String>]) -> u32 {
    let correct = questions
        .iter()
        .zip(answers)
        .filter(|(question, answer)| {
            answer
                .as_deref()
                .is_some_and(|value| question.is_correct(value))
        })
        .count();
    u32::try_from(correct).unwrap_or(u32::MAX)
}

/// Outcome of comparing the last selected option with the correct one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect,
}

impl Feedback {
    #[must_use]
    pub fn from_correct(correct: bool) -> Self {
        if correct { Self::Correct } else { Self::Incorrect }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Feedback::Correct => "Correct!",
            Feedback::Incorrect => "Incorrect.",
        }
    }
}
