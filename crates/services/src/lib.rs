#![forbid(unsafe_code)]

pub mod auth;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;

pub use auth::{AuthProvider, IdentityTransition, WatchAuth, identity_transition};
pub use error::SessionError;

pub use sessions::{
    AnswerOutcome, LiveSession, Navigation, QuizScreen, QuizSession, QuizSessionLoop,
    SessionGuard, SessionStart,
};
