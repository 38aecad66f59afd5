//! Frame scheduling for height transitions.
//!
//! A CSS-style height transition only animates when the starting height has
//! been committed by the renderer before the target height is written. The
//! [`FrameScheduler`] trait exposes the three deferral primitives a collapse
//! item needs to sequence its writes:
//!
//! - [`run_as_microtask`](FrameScheduler::run_as_microtask): after the current
//!   synchronous work, before the next paint
//! - [`run_on_next_frame`](FrameScheduler::run_on_next_frame): at the next
//!   paint frame
//! - [`run_on_frame_after_next`](FrameScheduler::run_on_frame_after_next):
//!   two paint frames from now
//!
//! Two implementations are provided. [`FrameQueue`] is driven by the host,
//! which calls [`FrameQueue::advance_frame`] once per rendered frame.
//! [`ImmediateScheduler`] runs everything inline for hosts without a paint
//! frame concept.
//!
//! There is no cancellation. A callback whose premise no longer holds is
//! expected to check live state and return without effect.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::logging::targets;

/// A boxed frame callback.
pub type FrameTask = Box<dyn FnOnce() + Send + 'static>;

/// The three scheduling primitives used to sequence height writes.
pub trait FrameScheduler: Send + Sync {
    /// Run `task` after the current synchronous work completes.
    fn run_as_microtask(&self, task: FrameTask);

    /// Run `task` at the next paint frame.
    fn run_on_next_frame(&self, task: FrameTask);

    /// Run `task` two paint frames from now.
    fn run_on_frame_after_next(&self, task: FrameTask);
}

/// Internal task data: the frame number the task is due on.
struct FrameEntry {
    due: u64,
    task: FrameTask,
}

/// A host-driven microtask and frame queue.
///
/// The host calls [`flush_microtasks`](Self::flush_microtasks) at the end of
/// each batch of synchronous work, and [`advance_frame`](Self::advance_frame)
/// once per paint frame. A task scheduled during frame `N` for the next frame
/// runs on frame `N + 1`; for the frame after next, on `N + 2`.
///
/// # Example
///
/// ```
/// use horizon_collapse_core::{FrameQueue, FrameScheduler};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// let queue = FrameQueue::new();
/// let fired = Arc::new(AtomicU32::new(0));
///
/// let counter = fired.clone();
/// queue.run_on_frame_after_next(Box::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// queue.advance_frame();
/// assert_eq!(fired.load(Ordering::SeqCst), 0);
/// queue.advance_frame();
/// assert_eq!(fired.load(Ordering::SeqCst), 1);
/// ```
pub struct FrameQueue {
    /// Pending microtasks, in submission order.
    microtasks: Mutex<VecDeque<FrameTask>>,
    /// Pending frame tasks, in submission order.
    frames: Mutex<VecDeque<FrameEntry>>,
    /// The number of the most recently started frame.
    frame: AtomicU64,
}

impl FrameQueue {
    /// Create an empty queue at frame zero.
    pub fn new() -> Self {
        Self {
            microtasks: Mutex::new(VecDeque::new()),
            frames: Mutex::new(VecDeque::new()),
            frame: AtomicU64::new(0),
        }
    }

    /// The number of the most recently started frame.
    pub fn current_frame(&self) -> u64 {
        self.frame.load(Ordering::SeqCst)
    }

    /// Check if any microtask or frame task is pending.
    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }

    /// Get the number of pending microtasks and frame tasks.
    pub fn pending_count(&self) -> usize {
        self.microtasks.lock().len() + self.frames.lock().len()
    }

    /// Run every pending microtask, including ones queued while draining.
    ///
    /// Returns the number of microtasks executed.
    pub fn flush_microtasks(&self) -> usize {
        let mut count = 0;
        loop {
            // Pop under the lock, run outside it
            let Some(task) = self.microtasks.lock().pop_front() else {
                break;
            };
            task();
            count += 1;
        }
        count
    }

    /// Start the next frame.
    ///
    /// Pending microtasks run first, then every frame task due on the new
    /// frame, then the microtasks those tasks queued. Returns the number of
    /// frame tasks executed.
    #[tracing::instrument(skip_all, target = "horizon_collapse_core::frame", level = "trace")]
    pub fn advance_frame(&self) -> usize {
        self.flush_microtasks();

        let frame = self.frame.fetch_add(1, Ordering::SeqCst) + 1;
        let due: Vec<FrameEntry> = {
            let mut frames = self.frames.lock();
            let (ready, waiting): (VecDeque<_>, VecDeque<_>) =
                frames.drain(..).partition(|entry| entry.due <= frame);
            *frames = waiting;
            ready.into_iter().collect()
        };

        tracing::trace!(target: targets::FRAME, frame, tasks = due.len(), "frame started");

        let count = due.len();
        for entry in due {
            (entry.task)();
            self.flush_microtasks();
        }
        count
    }

    /// Advance frames until nothing is pending, up to `max_frames`.
    ///
    /// Returns the number of frames advanced.
    pub fn run_until_idle(&self, max_frames: usize) -> usize {
        self.flush_microtasks();
        let mut frames = 0;
        while self.has_pending() && frames < max_frames {
            self.advance_frame();
            frames += 1;
        }
        if self.has_pending() {
            tracing::debug!(target: targets::FRAME, max_frames, pending = self.pending_count(), "queue still busy");
        }
        frames
    }

    fn push_frame(&self, offset: u64, task: FrameTask) {
        let due = self.current_frame() + offset;
        self.frames.lock().push_back(FrameEntry { due, task });
    }
}

impl FrameScheduler for FrameQueue {
    fn run_as_microtask(&self, task: FrameTask) {
        self.microtasks.lock().push_back(task);
    }

    fn run_on_next_frame(&self, task: FrameTask) {
        self.push_frame(1, task);
    }

    fn run_on_frame_after_next(&self, task: FrameTask) {
        self.push_frame(2, task);
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameQueue")
            .field("frame", &self.current_frame())
            .field("microtasks", &self.microtasks.lock().len())
            .field("frames", &self.frames.lock().len())
            .finish()
    }
}

/// A scheduler that runs every primitive inline.
///
/// For headless hosts and tests that do not care about animation. Height
/// writes still happen in the correct order; the start and target heights
/// are simply written back to back.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl FrameScheduler for ImmediateScheduler {
    fn run_as_microtask(&self, task: FrameTask) {
        task();
    }

    fn run_on_next_frame(&self, task: FrameTask) {
        task();
    }

    fn run_on_frame_after_next(&self, task: FrameTask) {
        task();
    }
}

static_assertions::assert_impl_all!(FrameQueue: Send, Sync);
