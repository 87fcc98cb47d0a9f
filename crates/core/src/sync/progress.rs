//! Progress and cancellation context for range syncs.
//!
//! Each sync gets its own [`SyncProgress`]; clones share state, so the
//! caller can keep one clone to observe or cancel while the sync holds
//! another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

/// Callback invoked with a snapshot after every progress update.
pub type ProgressListener = Arc<dyn Fn(&ProgressSnapshot) + Send + Sync>;

/// Point-in-time copy of a sync's progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProgressSnapshot {
    /// Attempts completed so far.
    pub current: u32,
    /// Attempts planned.
    pub total: u32,
    pub is_running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
}

struct ProgressInner {
    state: RwLock<ProgressSnapshot>,
    cancelled: AtomicBool,
    cancel_notify: Notify,
    listener: Option<ProgressListener>,
}

/// Shared progress/cancellation handle for one range sync.
#[derive(Clone)]
pub struct SyncProgress {
    inner: Arc<ProgressInner>,
}

impl Default for SyncProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SyncProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncProgress")
            .field("state", &self.snapshot())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl SyncProgress {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a progress handle that forwards every update to `listener`.
    pub fn with_listener(listener: ProgressListener) -> Self {
        Self::build(Some(listener))
    }

    fn build(listener: Option<ProgressListener>) -> Self {
        Self {
            inner: Arc::new(ProgressInner {
                state: RwLock::new(ProgressSnapshot::default()),
                cancelled: AtomicBool::new(false),
                cancel_notify: Notify::new(),
                listener,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ProgressSnapshot> {
        self.inner.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProgressSnapshot> {
        self.inner.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Reset and mark running. A pending cancellation is kept.
    pub fn start(&self, total: u32) {
        *self.write() = ProgressSnapshot {
            current: 0,
            total,
            is_running: true,
            last_update: Some(Utc::now()),
        };
    }

    /// Record progress. No-op unless running.
    pub fn update(&self, current: u32, total: Option<u32>) {
        let snapshot = {
            let mut state = self.write();
            if !state.is_running {
                return;
            }
            state.current = current;
            if let Some(total) = total {
                state.total = total;
            }
            state.last_update = Some(Utc::now());
            state.clone()
        };

        if let Some(listener) = &self.inner.listener {
            listener(&snapshot);
        }
    }

    /// Mark not running and snap `current` to `total`.
    pub fn finish(&self) {
        let mut state = self.write();
        state.is_running = false;
        state.current = state.total;
        state.last_update = Some(Utc::now());
    }

    /// Mark not running without touching `current`, for a sync that died
    /// before it could finish.
    pub fn abort(&self) {
        let mut state = self.write();
        state.is_running = false;
        state.last_update = Some(Utc::now());
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.read().clone()
    }

    /// Ask the sync to stop before its next attempt.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.cancel_notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        let notified = self.inner.cancel_notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent cancel is not missed
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}
