//! Background persistence for one live session.
//!
//! Every write of a session goes through a single task fed by a FIFO channel,
//! so an answer write can never land after the navigation write that
//! superseded it. Callers never wait on a write; failures are logged and the
//! in-memory session stays authoritative.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use quiz_core::model::{ProgressRecord, QuizId, ScoreRecord, UserId};
use storage::QuizStore;

#[derive(Debug)]
struct ProgressWrite {
    user_id: UserId,
    quiz_id: QuizId,
    progress: ProgressRecord,
}

#[derive(Debug)]
enum SyncOp {
    Progress(ProgressWrite),
    Score(ScoreRecord),
    Flush(oneshot::Sender<()>),
}

/// Handle to the writer task of one session.
///
/// Dropping the handle closes the channel; writes already queued still run.
#[derive(Debug)]
pub struct SessionSync {
    tx: mpsc::UnboundedSender<SyncOp>,
}

impl SessionSync {
    /// Spawn the writer task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn spawn(store: QuizStore) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store, rx));
        Self { tx }
    }

    pub fn save_progress(&self, user_id: &UserId, quiz_id: &QuizId, progress: ProgressRecord) {
        self.send(SyncOp::Progress(ProgressWrite {
            user_id: user_id.clone(),
            quiz_id: quiz_id.clone(),
            progress,
        }));
    }

    pub fn append_score(&self, record: ScoreRecord) {
        self.send(SyncOp::Score(record));
    }

    /// Wait until every write queued before this call has been attempted.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(SyncOp::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }

    fn send(&self, op: SyncOp) {
        if let Err(err) = self.tx.send(op) {
            warn!(op = ?err.0, "session writer stopped; dropping write");
        }
    }
}

async fn run_writer(store: QuizStore, mut rx: mpsc::UnboundedReceiver<SyncOp>) {
    let mut next = rx.recv().await;
    while let Some(op) = next.take() {
        match op {
            SyncOp::Progress(mut write) => {
                // A burst of progress writes collapses into the newest one.
                loop {
                    match rx.try_recv() {
                        Ok(SyncOp::Progress(newer)) => write = newer,
                        Ok(other) => {
                            next = Some(other);
                            break;
                        }
                        Err(_) => break,
                    }
                }
                if let Err(error) = store
                    .save_progress(&write.user_id, &write.quiz_id, &write.progress)
                    .await
                {
                    warn!(
                        user_id = %write.user_id,
                        quiz_id = %write.quiz_id,
                        %error,
                        "failed to save quiz progress"
                    );
                }
            }
            SyncOp::Score(record) => match store.append_score(&record).await {
                Ok(id) => {
                    info!(quiz_id = %record.quiz_id, score = record.score, %id, "score saved");
                }
                Err(error) => {
                    warn!(quiz_id = %record.quiz_id, score = record.score, %error, "failed to save score");
                }
            },
            SyncOp::Flush(done) => {
                let _ = done.send(());
            }
        }

        if next.is_none() {
            next = rx.recv().await;
        }
    }
    debug!("session writer finished");
}
