//! Run control and processed-video bookkeeping.
//!
//! `RunControl` is the cancellation/pause token handed to the pipeline;
//! `ProcessManager` is the plain state object behind the interactive surface,
//! independent of any UI technology.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::youtube::VideoRecord;

/// A fully processed playlist entry.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedVideo {
    pub record: VideoRecord,
    /// Extracted description snippet, when extraction is enabled.
    pub snippet: Option<String>,
    pub transcript: Option<String>,
    pub summary: Option<String>,
}

/// Pause/stop flags shared between the worker loop and control handlers.
///
/// Both flags are only consulted between items; an in-flight request cannot
/// be cancelled mid-call.
#[derive(Debug, Default)]
pub struct RunControl {
    paused: AtomicBool,
    stopped: AtomicBool,
}

impl RunControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.stopped.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Lifecycle of an interactive run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Stopped,
    Completed,
}

/// Navigation direction through processed videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

#[derive(Debug)]
struct ManagerInner {
    state: RunState,
    processed: Vec<ProcessedVideo>,
    /// Index into `processed`; `None` while the list is empty.
    cursor: Option<usize>,
    total: usize,
    error: Option<String>,
}

impl ManagerInner {
    fn empty() -> Self {
        Self {
            state: RunState::Idle,
            processed: Vec::new(),
            cursor: None,
            total: 0,
            error: None,
        }
    }
}

/// Snapshot of the manager state for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub state: RunState,
    pub processed_count: usize,
    pub total: usize,
    pub cursor: Option<usize>,
    pub error: Option<String>,
}

/// In-memory state machine for an interactive run.
///
/// State is reset on `start` and discarded at process exit; nothing is
/// persisted across runs.
pub struct ProcessManager {
    control: Arc<RunControl>,
    inner: Mutex<ManagerInner>,
}

impl ProcessManager {
    pub fn new() -> Self {
        Self {
            control: RunControl::new(),
            inner: Mutex::new(ManagerInner::empty()),
        }
    }

    /// The control token the worker loop polls.
    pub fn control(&self) -> Arc<RunControl> {
        self.control.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManagerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset all state and move Idle -> Running.
    pub fn start(&self) {
        self.control.reset();
        let mut inner = self.lock();
        *inner = ManagerInner::empty();
        inner.state = RunState::Running;
    }

    pub fn set_total(&self, total: usize) {
        self.lock().total = total;
    }

    pub fn pause(&self) {
        self.control.pause();
        let mut inner = self.lock();
        if inner.state == RunState::Running {
            inner.state = RunState::Paused;
        }
    }

    pub fn resume(&self) {
        self.control.resume();
        let mut inner = self.lock();
        if inner.state == RunState::Paused {
            inner.state = RunState::Running;
        }
    }

    pub fn stop(&self) {
        self.control.stop();
        // Clear pause so a paused worker can observe the stop flag and exit.
        self.control.resume();
        self.lock().state = RunState::Stopped;
    }

    /// Mark the run finished. Keeps `Stopped` if stop was requested.
    pub fn complete(&self) {
        let mut inner = self.lock();
        if inner.state != RunState::Stopped {
            inner.state = RunState::Completed;
        }
    }

    /// Record a run failure and return to idle.
    pub fn fail(&self, message: &str) {
        let mut inner = self.lock();
        inner.state = RunState::Idle;
        inner.error = Some(message.to_string());
    }

    /// Append a processed video and move the cursor to it.
    pub fn add_video(&self, video: ProcessedVideo) {
        let mut inner = self.lock();
        inner.processed.push(video);
        inner.cursor = Some(inner.processed.len() - 1);
    }

    /// The video under the cursor.
    pub fn current(&self) -> Option<ProcessedVideo> {
        let inner = self.lock();
        inner.cursor.and_then(|i| inner.processed.get(i).cloned())
    }

    /// Move the cursor directly to `index`. Out-of-range indices leave the
    /// cursor untouched and return `None`.
    pub fn move_to(&self, index: usize) -> Option<ProcessedVideo> {
        let mut inner = self.lock();
        let video = inner.processed.get(index).cloned()?;
        inner.cursor = Some(index);
        Some(video)
    }

    /// Move the cursor one step, clamped to the valid range. A no-op at the
    /// boundaries (and on an empty list) returns `None`.
    pub fn navigate(&self, direction: Direction) -> Option<ProcessedVideo> {
        let mut inner = self.lock();
        let cursor = inner.cursor?;

        let target = match direction {
            Direction::Prev => cursor.checked_sub(1)?,
            Direction::Next => {
                let next = cursor + 1;
                if next >= inner.processed.len() {
                    return None;
                }
                next
            }
        };

        inner.cursor = Some(target);
        inner.processed.get(target).cloned()
    }

    pub fn status(&self) -> StatusSnapshot {
        let inner = self.lock();
        StatusSnapshot {
            state: inner.state,
            processed_count: inner.processed.len(),
            total: inner.total,
            cursor: inner.cursor,
            error: inner.error.clone(),
        }
    }
}

impl Default for ProcessManager {
    fn default() -> Self {
        Self::new()
    }
}
