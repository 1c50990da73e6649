mod ids;
mod policy;
mod progress;
mod quiz;
mod score;

pub use ids::{ParseIdError, QuizId, UserId};
pub use policy::{FeedbackMode, ParsePolicyError, ProgressMode, QuizPolicy, ScoringMode, SubmitGate};
pub use progress::ProgressRecord;
pub use quiz::{Feedback, Question, QuestionError, Quiz, calculate_score};
pub use score::ScoreRecord;
