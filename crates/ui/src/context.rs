use std::sync::Arc;

use quiz_core::model::{QuizId, UserId};
use services::{AuthProvider, QuizSessionLoop, WatchAuth};

pub trait UiApp: Send + Sync {
    fn default_quiz_id(&self) -> QuizId;

    fn auth(&self) -> Arc<WatchAuth>;
    fn session_loop(&self) -> Arc<QuizSessionLoop>;
}

#[derive(Clone)]
pub struct AppContext {
    default_quiz_id: QuizId,
    auth: Arc<WatchAuth>,
    session_loop: Arc<QuizSessionLoop>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            default_quiz_id: app.default_quiz_id(),
            auth: app.auth(),
            session_loop: app.session_loop(),
        }
    }

    #[must_use]
    pub fn default_quiz_id(&self) -> &QuizId {
        &self.default_quiz_id
    }

    #[must_use]
    pub fn auth(&self) -> Arc<WatchAuth> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserId> {
        self.auth.current_user()
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<QuizSessionLoop> {
        Arc::clone(&self.session_loop)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
