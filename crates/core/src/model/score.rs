use crate::model::ids::{QuizId, UserId};

/// Immutable fact written once when an attempt completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub user_id: UserId,
    pub quiz_id: QuizId,
    pub score: u32,
}

impl ScoreRecord {
    #[must_use]
    pub fn new(user_id: UserId, quiz_id: QuizId, score: u32) -> Self {
        Self {
            user_id,
            quiz_id,
            score,
        }
    }
}
