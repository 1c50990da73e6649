use crate::model::quiz::Question;

/// Per-user, per-quiz snapshot of an attempt in progress.
///
/// Mutable on the store side: it is upserted on every answer and navigation
/// when progress persistence is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressRecord {
    pub current_index: usize,
    pub answers: Vec<Option<String>>,
    pub score: u32,
}

impl ProgressRecord {
    /// Reconcile stored progress with the questions that were actually loaded.
    ///
    /// The answer list is resized to the question count, answers that are no
    /// longer an option of their question are cleared, and an out-of-range
    /// index falls back to the first question. The score is left as stored.
    #[must_use]
    pub fn normalized(mut self, questions: &[Question]) -> Self {
        self.answers.resize(questions.len(), None);
        for (answer, question) in self.answers.iter_mut().zip(questions) {
            if answer.as_deref().is_some_and(|value| !question.has_option(value)) {
                *answer = None;
            }
        }
        if self.current_index >= questions.len() {
            self.current_index = 0;
        }
        self
    }
}
