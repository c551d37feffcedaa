//! Progress and cancellation reporting.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Sink the compiling service pushes progress into.
///
/// The orchestrator only relays; it never drives progress itself.
pub trait ProgressSink: Send + Sync {
    /// Set the total amount of work.
    fn set_total(&self, total: u64);

    /// Set the amount of work done so far.
    fn set_progress(&self, current: u64);

    /// Whether cancellation has been requested.
    fn is_cancelled(&self) -> bool;

    /// Request cancellation.
    fn cancel(&self);

    /// Signal that the tracked task ended. Only the first call has effect.
    fn complete(&self, success: bool);
}

/// Progress callback invoked on every update.
pub type ProgressCallback = Box<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Snapshot passed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub current: u64,
    pub total: u64,
    pub stage: ProgressStage,
}

impl ProgressUpdate {
    /// Completed fraction in `[0.0, 1.0]`; 0 while the total is unknown.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f64 / self.total as f64).clamp(0.0, 1.0)
        }
    }
}

/// Stage of the tracked task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    Running,
    Completed { success: bool },
}

/// Atomic [`ProgressSink`] with an optional callback.
pub struct ProgressTracker {
    total: AtomicU64,
    current: AtomicU64,
    cancelled: AtomicBool,
    completed: AtomicBool,
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    /// Tracker that only records state.
    pub fn silent() -> Self {
        Self {
            total: AtomicU64::new(0),
            current: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            completed: AtomicBool::new(false),
            callback: None,
        }
    }

    /// Tracker that reports every update to `callback`.
    pub fn with_callback(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            ..Self::silent()
        }
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    fn notify(&self, stage: ProgressStage) {
        if let Some(cb) = &self.callback {
            cb(ProgressUpdate {
                current: self.current(),
                total: self.total(),
                stage,
            });
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::silent()
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("total", &self.total())
            .field("current", &self.current())
            .field("cancelled", &self.is_cancelled())
            .field("completed", &self.is_completed())
            .finish()
    }
}

impl ProgressSink for ProgressTracker {
    fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Release);
        self.notify(ProgressStage::Running);
    }

    fn set_progress(&self, current: u64) {
        self.current.store(current, Ordering::Release);
        self.notify(ProgressStage::Running);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            tracing::info!("Cancellation requested");
        }
    }

    fn complete(&self, success: bool) {
        if self.completed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.notify(ProgressStage::Completed { success });
    }
}
