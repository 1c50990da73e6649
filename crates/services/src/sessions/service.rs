use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{
    Feedback, FeedbackMode, ProgressRecord, Question, Quiz, QuizPolicy, ScoreRecord, ScoringMode,
    SubmitGate, UserId, calculate_score,
};

use crate::error::SessionError;

//
// ─── NAVIGATION / OUTCOMES ─────────────────────────────────────────────────────
//

/// Where to move the current question pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Previous,
    Next,
    To(usize),
}

/// Result of selecting an option on the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub index: usize,
    pub correct: bool,
    pub feedback: Option<Feedback>,
    pub score: u32,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Client-side state of one quiz attempt.
///
/// All mutation goes through [`select_answer`](Self::select_answer),
/// [`navigate`](Self::navigate) and [`submit`](Self::submit), which keep the
/// invariants in one place: the index stays within the question list, every
/// recorded answer is one of its question's options, and completion is
/// terminal.
pub struct QuizSession {
    quiz: Quiz,
    user_id: UserId,
    policy: QuizPolicy,
    current: usize,
    answers: Vec<Option<String>>,
    score: u32,
    feedback: Option<Feedback>,
    completed_at: Option<DateTime<Utc>>,
    score_taken: bool,
}

impl QuizSession {
    /// Start an empty attempt on `quiz` for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the quiz has no questions.
    pub fn new(
        quiz: Quiz,
        user_id: UserId,
        policy: QuizPolicy,
    ) -> Result<Self, SessionError> {
        if quiz.question_count() == 0 {
            return Err(SessionError::Empty);
        }
        let answers = vec![None; quiz.question_count()];

        Ok(Self {
            quiz,
            user_id,
            policy,
            current: 0,
            answers,
            score: 0,
            feedback: None,
            completed_at: None,
            score_taken: false,
        })
    }

    /// Resume from stored progress, replacing the fresh state.
    ///
    /// The record is normalized against the loaded questions first. With
    /// incremental scoring the score is recomputed from the restored answers;
    /// otherwise it stays at zero until submit.
    pub fn restore(&mut self, progress: ProgressRecord) {
        if self.is_complete() {
            return;
        }
        let progress = progress.normalized(self.quiz.questions());
        self.current = progress.current_index;
        self.answers = progress.answers;
        self.score = match self.policy.scoring() {
            ScoringMode::Incremental => calculate_score(self.quiz.questions(), &self.answers),
            ScoringMode::AtSubmit => 0,
        };
        self.feedback = None;
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn policy(&self) -> QuizPolicy {
        self.policy
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.quiz.question_count()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.question(self.current)
    }

    /// Answer recorded for the current question.
    #[must_use]
    pub fn current_answer(&self) -> Option<&str> {
        self.answers.get(self.current).and_then(Option::as_deref)
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.question_count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Snapshot written to the store when progress is persisted.
    #[must_use]
    pub fn snapshot(&self) -> ProgressRecord {
        ProgressRecord {
            current_index: self.current,
            answers: self.answers.clone(),
            score: self.score,
        }
    }

    /// Record `option` as the answer to the current question.
    ///
    /// Re-answering overwrites the previous choice. Incremental scores count
    /// each question at most once and follow the latest answer only.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submit, and
    /// `SessionError::InvalidOption` if `option` is not offered by the question.
    pub fn select_answer(&mut self, option: &str) -> Result<AnswerOutcome, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let Some(question) = self.quiz.question(self.current) else {
            return Err(SessionError::Empty);
        };
        if !question.has_option(option) {
            return Err(SessionError::InvalidOption {
                option: option.to_string(),
            });
        }
        let correct = question.is_correct(option);

        self.answers[self.current] = Some(option.to_string());

        self.feedback = match self.policy.feedback() {
            FeedbackMode::Immediate => Some(Feedback::from_correct(correct)),
            FeedbackMode::Off => None,
        };
        if self.policy.scoring() == ScoringMode::Incremental {
            self.score = calculate_score(self.quiz.questions(), &self.answers);
        }

        Ok(AnswerOutcome {
            index: self.current,
            correct,
            feedback: self.feedback,
            score: self.score,
        })
    }

    /// Move to another question.
    ///
    /// Returns `Ok(false)` without changing anything when the target is out
    /// of range.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submit.
    pub fn navigate(&mut self, to: Navigation) -> Result<bool, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let target = match to {
            Navigation::Previous => self.current.checked_sub(1),
            Navigation::Next => self.current.checked_add(1),
            Navigation::To(index) => Some(index),
        };
        let Some(target) = target.filter(|index| *index < self.question_count()) else {
            return Ok(false);
        };

        self.current = target;
        self.feedback = None;
        Ok(true)
    }

    /// Finish the attempt and return the final score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if already submitted and
    /// `SessionError::NotOnLastQuestion` when the policy requires submitting
    /// from the last question.
    pub fn submit(&mut self, completed_at: DateTime<Utc>) -> Result<u32, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        if self.policy.submit_gate() == SubmitGate::LastQuestion && !self.is_last() {
            return Err(SessionError::NotOnLastQuestion);
        }

        self.score = calculate_score(self.quiz.questions(), &self.answers);
        self.feedback = None;
        self.completed_at = Some(completed_at);
        Ok(self.score)
    }

    /// Hand out the score record of a completed attempt, at most once.
    ///
    /// Returns `None` before completion, on every call after the first, and
    /// when the quiz has no recorded owner.
    pub(crate) fn take_score_record(&mut self) -> Option<ScoreRecord> {
        if !self.is_complete() || self.score_taken {
            return None;
        }
        self.score_taken = true;
        let owner = self.quiz.owner()?.clone();
        Some(ScoreRecord::new(owner, self.quiz.id().clone(), self.score))
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", self.quiz.id())
            .field("user_id", &self.user_id)
            .field("questions_len", &self.quiz.question_count())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("completed_at", &self.completed_at)
            .field("score_taken", &self.score_taken)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
