use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use quiz_core::Clock;
use quiz_core::model::{Quiz, QuizId, QuizPolicy, UserId};
use storage::QuizStore;

use super::guard::SessionGuard;
use super::service::{AnswerOutcome, Navigation, QuizSession};
use super::sync::SessionSync;
use super::view::QuizScreen;
use crate::auth::{AuthProvider, IdentityTransition, identity_transition};
use crate::error::SessionError;

/// What starting a quiz produced.
#[derive(Debug)]
pub enum SessionStart {
    /// Nobody is signed in; nothing was read from the store.
    Unauthenticated,
    NotFound,
    /// The quiz exists but has no questions.
    Empty,
    Ready(LiveSession),
}

impl SessionStart {
    #[must_use]
    pub fn screen(&self) -> QuizScreen {
        match self {
            Self::Unauthenticated | Self::Empty => QuizScreen::Loading,
            Self::NotFound => QuizScreen::NotFound,
            Self::Ready(live) => live.screen(),
        }
    }
}

/// Orchestrates loading a quiz and handing out live sessions.
#[derive(Clone)]
pub struct QuizSessionLoop {
    clock: Clock,
    store: QuizStore,
    auth: Arc<dyn AuthProvider>,
    policy: QuizPolicy,
}

impl QuizSessionLoop {
    #[must_use]
    pub fn new(clock: Clock, store: QuizStore, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            clock,
            store,
            auth,
            policy: QuizPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: QuizPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> QuizPolicy {
        self.policy
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    #[must_use]
    pub fn store(&self) -> &QuizStore {
        &self.store
    }

    /// Load `quiz_id` for the signed-in user.
    ///
    /// Header and questions are fetched concurrently. With persisted progress
    /// the stored record is restored on top of the fresh state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when a fetch fails.
    pub async fn start(&self, quiz_id: &QuizId) -> Result<SessionStart, SessionError> {
        let Some(user_id) = self.auth.current_user() else {
            debug!(%quiz_id, "no signed-in user; not loading quiz");
            return Ok(SessionStart::Unauthenticated);
        };

        let fetched = tokio::try_join!(
            self.store.fetch_header(quiz_id),
            self.store.fetch_questions(quiz_id),
        );
        let (header, questions) = match fetched {
            Ok(parts) => parts,
            Err(err) => {
                error!(%quiz_id, error = %err, "failed to load quiz");
                return Err(err.into());
            }
        };
        let Some(header) = header else {
            info!(%quiz_id, "quiz not found");
            return Ok(SessionStart::NotFound);
        };
        if questions.is_empty() {
            info!(%quiz_id, "quiz has no questions");
            return Ok(SessionStart::Empty);
        }

        let quiz = Quiz::new(quiz_id.clone(), header.name, questions, header.owner);
        let mut session = QuizSession::new(quiz, user_id.clone(), self.policy)?;

        if self.policy.persists_progress() {
            match self.store.fetch_progress(&user_id, quiz_id).await {
                Ok(Some(progress)) => session.restore(progress),
                Ok(None) => {}
                Err(err) => {
                    error!(%quiz_id, %user_id, error = %err, "failed to load quiz progress");
                    return Err(err.into());
                }
            }
        }

        debug!(
            %quiz_id,
            %user_id,
            questions = session.question_count(),
            index = session.current_index(),
            "quiz session started"
        );
        Ok(SessionStart::Ready(LiveSession {
            session,
            sync: SessionSync::spawn(self.store.clone()),
            clock: self.clock,
            detached: false,
        }))
    }

    /// Like [`start`](Self::start), but returns `Ok(None)` when `guard` was
    /// invalidated while loading.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when a fetch fails and the guard is
    /// still current.
    pub async fn start_guarded(
        &self,
        quiz_id: &QuizId,
        guard: &SessionGuard,
    ) -> Result<Option<SessionStart>, SessionError> {
        let ticket = guard.ticket();
        let started = self.start(quiz_id).await;
        if !guard.is_current(ticket) {
            debug!(%quiz_id, "discarding quiz load for a torn down screen");
            return Ok(None);
        }
        started.map(Some)
    }
}

impl fmt::Debug for QuizSessionLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSessionLoop")
            .field("clock", &self.clock)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// A loaded session plus the writer task persisting it.
pub struct LiveSession {
    session: QuizSession,
    sync: SessionSync,
    clock: Clock,
    detached: bool,
}

impl LiveSession {
    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn screen(&self) -> QuizScreen {
        QuizScreen::from_session(&self.session)
    }

    /// Select an option on the current question and queue a progress write.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::select_answer`]; also `SessionError::Detached`
    /// after the identity changed.
    pub fn select_answer(&mut self, option: &str) -> Result<AnswerOutcome, SessionError> {
        self.ensure_attached()?;
        let outcome = self.session.select_answer(option)?;
        self.queue_progress();
        Ok(outcome)
    }

    /// Move to another question; queues a progress write when it moved.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::navigate`]; also `SessionError::Detached`.
    pub fn navigate(&mut self, to: Navigation) -> Result<bool, SessionError> {
        self.ensure_attached()?;
        let moved = self.session.navigate(to)?;
        if moved {
            self.queue_progress();
        }
        Ok(moved)
    }

    /// Complete the attempt and queue its score record.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::submit`]; also `SessionError::Detached`.
    pub fn submit(&mut self) -> Result<u32, SessionError> {
        self.ensure_attached()?;
        let score = self.session.submit(self.clock.now())?;
        match self.session.take_score_record() {
            Some(record) => self.sync.append_score(record),
            None => {
                debug!(quiz_id = %self.session.quiz().id(), "quiz has no owner; score not recorded");
            }
        }
        Ok(score)
    }

    /// React to a change of the signed-in user.
    ///
    /// On `Redirect` the session stops accepting actions so nothing is
    /// written on behalf of another identity.
    pub fn on_identity_change(&mut self, current: Option<&UserId>) -> IdentityTransition {
        let transition = identity_transition(self.session.user_id(), current);
        if transition == IdentityTransition::Redirect && !self.detached {
            info!(user_id = %self.session.user_id(), "signed-in user changed; leaving quiz");
            self.detached = true;
        }
        transition
    }

    /// Wait for every queued write to be attempted.
    pub async fn flush(&self) {
        self.sync.flush().await;
    }

    fn ensure_attached(&self) -> Result<(), SessionError> {
        if self.detached {
            return Err(SessionError::Detached);
        }
        Ok(())
    }

    fn queue_progress(&self) {
        if self.session.policy().persists_progress() {
            self.sync.save_progress(
                self.session.user_id(),
                self.session.quiz().id(),
                self.session.snapshot(),
            );
        }
    }
}

impl fmt::Debug for LiveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveSession")
            .field("session", &self.session)
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}
