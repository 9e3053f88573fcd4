//! Serialized cart persistence with stale-write detection.
//!
//! Every mutation of an authenticated user's cart enqueues a snapshot (the
//! reduced `{product_id, quantity}` lines plus the cart's epoch and monotonic
//! version) onto a single worker. The worker drains whatever is queued, keeps
//! only the newest snapshot per user, and skips any snapshot whose version is
//! at or below the last version it wrote for that user. One writer plus
//! version checks means two in-flight writes can never land out of order.
//!
//! Version counters restart at 0 whenever a cart is rehydrated (cache
//! eviction, login), so staleness is only checked within a single epoch: a
//! snapshot from a new epoch always supersedes whatever the old generation
//! last wrote.
//!
//! Writes are still best-effort from the session's point of view: a failed
//! write is logged and dropped, the in-session cart is untouched, and the
//! next mutation carries a fresh snapshot.

use std::collections::HashMap;

use sqlx::PgPool;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use feira_core::UserId;

use super::CartLineRecord;
use crate::db::{self, RepositoryError};

/// A point-in-time copy of a user's cart, reduced to its persisted shape.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    pub user_id: UserId,
    pub epoch: Uuid,
    pub version: u64,
    pub lines: Vec<CartLineRecord>,
}

/// Destination for cart snapshots. The production writer replaces the user's
/// database row whole; tests substitute a recorder.
pub trait CartWriter: Send + Sync + 'static {
    fn write(
        &self,
        user_id: &UserId,
        lines: &[CartLineRecord],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Writes snapshots to the `carts` table.
pub struct PgCartWriter {
    pool: PgPool,
}

impl PgCartWriter {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CartWriter for PgCartWriter {
    async fn write(
        &self,
        user_id: &UserId,
        lines: &[CartLineRecord],
    ) -> Result<(), RepositoryError> {
        db::carts::put(&self.pool, user_id, lines).await
    }
}

/// Cheap handle for enqueueing snapshots onto the sync worker.
#[derive(Debug, Clone)]
pub struct CartSyncHandle {
    tx: mpsc::UnboundedSender<CartSnapshot>,
}

impl CartSyncHandle {
    /// Queue a snapshot for persistence. Never blocks and never fails the
    /// caller; if the worker is gone the snapshot is dropped with a warning.
    pub fn enqueue(&self, user_id: UserId, epoch: Uuid, version: u64, lines: Vec<CartLineRecord>) {
        let snapshot = CartSnapshot {
            user_id,
            epoch,
            version,
            lines,
        };
        if self.tx.send(snapshot).is_err() {
            warn!("cart sync worker has shut down; dropping snapshot");
        }
    }
}

/// Start the sync worker and return a handle for enqueueing.
pub fn spawn<W: CartWriter>(writer: W) -> CartSyncHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run_worker(writer, rx));
    CartSyncHandle { tx }
}

async fn run_worker<W: CartWriter>(writer: W, mut rx: mpsc::UnboundedReceiver<CartSnapshot>) {
    let mut last_written: HashMap<UserId, (Uuid, u64)> = HashMap::new();

    while let Some(first) = rx.recv().await {
        // Coalesce: drain everything queued right now, keeping only the
        // newest snapshot per user.
        let mut pending: HashMap<UserId, CartSnapshot> = HashMap::new();
        stash(&mut pending, first);
        while let Ok(next) = rx.try_recv() {
            stash(&mut pending, next);
        }

        for (user_id, snapshot) in pending {
            let stale = last_written
                .get(&user_id)
                .is_some_and(|&(epoch, written)| {
                    snapshot.epoch == epoch && snapshot.version <= written
                });
            if stale {
                debug!(
                    user_id = %user_id,
                    version = snapshot.version,
                    "discarding stale cart snapshot"
                );
                continue;
            }

            match writer.write(&user_id, &snapshot.lines).await {
                Ok(()) => {
                    last_written.insert(user_id, (snapshot.epoch, snapshot.version));
                }
                Err(e) => {
                    // Best effort: the next mutation re-enqueues fresher state.
                    warn!(user_id = %user_id, error = %e, "cart sync write failed");
                }
            }
        }
    }
}

fn stash(pending: &mut HashMap<UserId, CartSnapshot>, snapshot: CartSnapshot) {
    match pending.get(&snapshot.user_id) {
        // Within one epoch the highest version wins. Across epochs the later
        // arrival wins: the channel is FIFO, so it was enqueued later.
        Some(existing)
            if existing.epoch == snapshot.epoch && existing.version >= snapshot.version => {}
        _ => {
            pending.insert(snapshot.user_id.clone(), snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use rust_decimal::Decimal;

    use feira_core::ProductId;

    use super::super::{Cart, CartLine};
    use super::*;

    #[derive(Clone, Default)]
    struct RecordingWriter {
        writes: Arc<Mutex<Vec<(UserId, Vec<CartLineRecord>)>>>,
        fail: Arc<AtomicBool>,
    }

    impl CartWriter for RecordingWriter {
        async fn write(
            &self,
            user_id: &UserId,
            lines: &[CartLineRecord],
        ) -> Result<(), RepositoryError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(RepositoryError::DataCorruption("injected failure".into()));
            }
            self.writes
                .lock()
                .expect("lock")
                .push((user_id.clone(), lines.to_vec()));
            Ok(())
        }
    }

    fn lines(quantity: u32) -> Vec<CartLineRecord> {
        vec![CartLineRecord {
            product_id: ProductId::new("p-1"),
            quantity,
        }]
    }

    async fn wait_for<F: Fn() -> bool>(cond: F) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_latest_version_wins() {
        let writer = RecordingWriter::default();
        let writes = Arc::clone(&writer.writes);
        let handle = spawn(writer);
        let user = UserId::new("u-1");
        let epoch = Uuid::new_v4();

        handle.enqueue(user.clone(), epoch, 1, lines(1));
        handle.enqueue(user.clone(), epoch, 2, lines(2));

        wait_for(|| {
            writes
                .lock()
                .expect("lock")
                .last()
                .is_some_and(|(_, l)| l[0].quantity == 2)
        })
        .await;
    }

    #[tokio::test]
    async fn test_stale_snapshot_is_discarded() {
        let writer = RecordingWriter::default();
        let writes = Arc::clone(&writer.writes);
        let handle = spawn(writer);
        let user = UserId::new("u-1");
        let epoch = Uuid::new_v4();

        handle.enqueue(user.clone(), epoch, 5, lines(5));
        wait_for(|| !writes.lock().expect("lock").is_empty()).await;
        let count_after_first = writes.lock().expect("lock").len();

        // A delayed write carrying an older version must not overwrite.
        handle.enqueue(user.clone(), epoch, 3, lines(3));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(writes.lock().expect("lock").len(), count_after_first);

        // A genuinely newer version still goes through.
        handle.enqueue(user, epoch, 6, lines(6));
        wait_for(|| {
            writes
                .lock()
                .expect("lock")
                .last()
                .is_some_and(|(_, l)| l[0].quantity == 6)
        })
        .await;
    }

    #[tokio::test]
    async fn test_new_epoch_supersedes_old_generation() {
        let writer = RecordingWriter::default();
        let writes = Arc::clone(&writer.writes);
        let handle = spawn(writer);
        let user = UserId::new("u-1");

        // The first cart instance leaves off at a high version.
        handle.enqueue(user.clone(), Uuid::new_v4(), 5, lines(5));
        wait_for(|| !writes.lock().expect("lock").is_empty()).await;

        // After eviction the cart rehydrates: fresh epoch, version counter
        // back at 0. Clearing it (post-checkout) must still be persisted
        // even though its version is far below the old generation's.
        let mut cart = Cart::from_hydrated(vec![CartLine {
            product_id: ProductId::new("p-1"),
            title: "Produto p-1".to_owned(),
            price: Decimal::new(5000, 2),
            image: String::new(),
            quantity: 5,
        }]);
        cart.clear();
        handle.enqueue(user.clone(), cart.epoch(), cart.version(), cart.records());

        wait_for(|| {
            writes
                .lock()
                .expect("lock")
                .last()
                .is_some_and(|(_, l)| l.is_empty())
        })
        .await;

        // And within the new epoch, staleness applies again.
        let count = writes.lock().expect("lock").len();
        handle.enqueue(user, cart.epoch(), 0, lines(9));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(writes.lock().expect("lock").len(), count);
    }

    #[tokio::test]
    async fn test_write_failure_does_not_kill_worker() {
        let writer = RecordingWriter::default();
        let writes = Arc::clone(&writer.writes);
        let fail = Arc::clone(&writer.fail);
        let handle = spawn(writer);
        let user = UserId::new("u-1");
        let epoch = Uuid::new_v4();

        fail.store(true, Ordering::SeqCst);
        handle.enqueue(user.clone(), epoch, 1, lines(1));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(writes.lock().expect("lock").is_empty());

        fail.store(false, Ordering::SeqCst);
        handle.enqueue(user, epoch, 2, lines(2));
        wait_for(|| {
            writes
                .lock()
                .expect("lock")
                .last()
                .is_some_and(|(_, l)| l[0].quantity == 2)
        })
        .await;
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let writer = RecordingWriter::default();
        let writes = Arc::clone(&writer.writes);
        let handle = spawn(writer);

        handle.enqueue(UserId::new("u-a"), Uuid::new_v4(), 1, lines(1));
        handle.enqueue(UserId::new("u-b"), Uuid::new_v4(), 1, lines(9));

        wait_for(|| {
            let writes = writes.lock().expect("lock");
            let users: std::collections::HashSet<&str> =
                writes.iter().map(|(u, _)| u.as_str()).collect();
            users.contains("u-a") && users.contains("u-b")
        })
        .await;
    }
}
