mod guard;
mod service;
mod sync;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use guard::{SessionGuard, SessionTicket};
pub use service::{AnswerOutcome, Navigation, QuizSession};
pub use sync::SessionSync;
pub use view::{CompletedScreen, OptionView, QuestionScreen, QuizScreen};
pub use workflow::{LiveSession, QuizSessionLoop, SessionStart};
