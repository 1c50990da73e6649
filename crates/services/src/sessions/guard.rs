use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Marks results of async work as stale once the screen that started it is gone.
///
/// A ticket taken before an await is only honoured if the guard has not been
/// invalidated in between.
#[derive(Clone, Debug, Default)]
pub struct SessionGuard {
    epoch: Arc<AtomicU64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionTicket(u64);

impl SessionGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ticket(&self) -> SessionTicket {
        SessionTicket(self.epoch.load(Ordering::Acquire))
    }

    /// Tear down: every outstanding ticket becomes stale.
    pub fn invalidate(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }

    #[must_use]
    pub fn is_current(&self, ticket: SessionTicket) -> bool {
        self.epoch.load(Ordering::Acquire) == ticket.0
    }
}
