use quiz_core::model::{QuizId, UserId};
use services::{
    IdentityTransition, LiveSession, Navigation, QuizScreen, QuizSessionLoop, SessionGuard,
    SessionStart,
};

use crate::views::ViewError;

/// User actions on the quiz screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    Select(String),
    Previous,
    Next,
    Finish,
}

/// How a quiz load ended, from the screen's point of view.
#[derive(Debug)]
pub enum QuizLoad {
    /// Nobody signed in; go to the register screen.
    Redirect,
    /// The screen was torn down while loading.
    Stale,
    /// Render this screen without a live session.
    Static(QuizScreen),
    Ready(QuizVm),
}

pub struct QuizVm {
    live: LiveSession,
}

impl QuizVm {
    #[must_use]
    pub fn new(live: LiveSession) -> Self {
        Self { live }
    }

    #[must_use]
    pub fn screen(&self) -> QuizScreen {
        self.live.screen()
    }

    /// # Errors
    ///
    /// Returns `ViewError::Rejected` when the session refuses the action
    /// (e.g. finishing before the last question).
    pub fn dispatch(&mut self, intent: QuizIntent) -> Result<QuizScreen, ViewError> {
        let result = match intent {
            QuizIntent::Select(option) => self.live.select_answer(&option).map(|_| ()),
            QuizIntent::Previous => self.live.navigate(Navigation::Previous).map(|_| ()),
            QuizIntent::Next => self.live.navigate(Navigation::Next).map(|_| ()),
            QuizIntent::Finish => self.live.submit().map(|_| ()),
        };
        result.map_err(|_| ViewError::Rejected)?;
        Ok(self.screen())
    }

    /// Returns `true` when the screen has to leave for the register route.
    pub fn on_identity_change(&mut self, current: Option<&UserId>) -> bool {
        self.live.on_identity_change(current) == IdentityTransition::Redirect
    }
}

impl std::fmt::Debug for QuizVm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizVm").field("live", &self.live).finish()
    }
}

/// # Errors
///
/// Returns `ViewError::LoadFailed` when the quiz could not be fetched.
pub async fn start_quiz(
    session_loop: &QuizSessionLoop,
    quiz_id: &QuizId,
    guard: &SessionGuard,
) -> Result<QuizLoad, ViewError> {
    let Some(start) = session_loop
        .start_guarded(quiz_id, guard)
        .await
        .map_err(|_| ViewError::LoadFailed)?
    else {
        return Ok(QuizLoad::Stale);
    };

    Ok(match start {
        SessionStart::Unauthenticated => QuizLoad::Redirect,
        SessionStart::Ready(live) => QuizLoad::Ready(QuizVm::new(live)),
        other => QuizLoad::Static(other.screen()),
    })
}
