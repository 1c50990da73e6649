use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// When the score of an attempt is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringMode {
    /// Score stays at zero until submit, then is computed from all answers.
    #[default]
    AtSubmit,
    /// Score is kept current after every answer.
    Incremental,
}

/// Whether in-progress answers are written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    #[default]
    LocalOnly,
    /// Upsert progress on every answer/navigation and restore it on start.
    Persisted,
}

/// Whether the user sees correct/incorrect right after answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackMode {
    #[default]
    Off,
    Immediate,
}

/// Where submit is accepted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitGate {
    #[default]
    LastQuestion,
    AnyQuestion,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown quiz policy {raw:?} (expected \"classic\" or \"resumable\")")]
pub struct ParsePolicyError {
    raw: String,
}

/// Behavioural switches for a quiz session.
///
/// The two presets correspond to the two shipped flavours of the quiz screen:
/// `classic` scores once at the end and keeps nothing between visits, while
/// `resumable` scores as you go, shows feedback and saves progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuizPolicy {
    scoring: ScoringMode,
    progress: ProgressMode,
    feedback: FeedbackMode,
    submit_gate: SubmitGate,
}

impl QuizPolicy {
    #[must_use]
    pub fn classic() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn resumable() -> Self {
        Self {
            scoring: ScoringMode::Incremental,
            progress: ProgressMode::Persisted,
            feedback: FeedbackMode::Immediate,
            submit_gate: SubmitGate::LastQuestion,
        }
    }

    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringMode) -> Self {
        self.scoring = scoring;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressMode) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn with_feedback(mut self, feedback: FeedbackMode) -> Self {
        self.feedback = feedback;
        self
    }

    #[must_use]
    pub fn with_submit_gate(mut self, submit_gate: SubmitGate) -> Self {
        self.submit_gate = submit_gate;
        self
    }

    #[must_use]
    pub fn scoring(&self) -> ScoringMode {
        self.scoring
    }

    #[must_use]
    pub fn progress(&self) -> ProgressMode {
        self.progress
    }

    #[must_use]
    pub fn feedback(&self) -> FeedbackMode {
        self.feedback
    }

    #[must_use]
    pub fn submit_gate(&self) -> SubmitGate {
        self.submit_gate
    }

    #[must_use]
    pub fn persists_progress(&self) -> bool {
        self.progress == ProgressMode::Persisted
    }
}

impl FromStr for QuizPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(Self::classic()),
            "resumable" => Ok(Self::resumable()),
            _ => Err(ParsePolicyError { raw: s.to_string() }),
        }
    }
}

impl fmt::Display for QuizPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::classic() {
            f.write_str("classic")
        } else if *self == Self::resumable() {
            f.write_str("resumable")
        } else {
            write!(
                f,
                "custom({:?}, {:?}, {:?}, {:?})",
                self.scoring, self.progress, self.feedback, self.submit_gate
            )
        }
    }
}
