//! What the quiz screen shows, independent of any UI toolkit.

use quiz_core::model::Feedback;

use super::service::QuizSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionScreen {
    pub quiz_name: String,
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub prompt: String,
    pub options: Vec<OptionView>,
    pub selected: Option<String>,
    pub feedback: Option<Feedback>,
    pub show_previous: bool,
    pub show_next: bool,
    pub show_finish: bool,
}

impl QuestionScreen {
    #[must_use]
    pub fn position_label(&self) -> String {
        format!("Question {} of {}", self.position, self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedScreen {
    pub score: u32,
    pub total: usize,
}

impl CompletedScreen {
    #[must_use]
    pub fn score_label(&self) -> String {
        format!("{}/{}", self.score, self.total)
    }
}

/// The states the quiz screen can render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizScreen {
    /// Nothing usable loaded yet (also covers fetch failures and empty quizzes).
    Loading,
    NotFound,
    Question(QuestionScreen),
    Completed(CompletedScreen),
}

impl QuizScreen {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        if session.is_complete() {
            return Self::Completed(CompletedScreen {
                score: session.score(),
                total: session.question_count(),
            });
        }
        let Some(question) = session.current_question() else {
            return Self::Loading;
        };

        let selected = session.current_answer().map(str::to_string);
        let options = question
            .options()
            .iter()
            .map(|label| OptionView {
                label: label.clone(),
                selected: selected.as_deref() == Some(label.as_str()),
            })
            .collect();

        Self::Question(QuestionScreen {
            quiz_name: session.quiz().name().to_owned(),
            position: session.current_index() + 1,
            total: session.question_count(),
            prompt: question.prompt().to_owned(),
            options,
            selected,
            feedback: session.feedback(),
            show_previous: !session.is_first(),
            show_next: !session.is_last(),
            show_finish: session.is_last(),
        })
    }
}
