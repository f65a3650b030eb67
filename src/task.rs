//! Task polling utilities
//!
//! Provides helpers for polling async tasks spawned on the tokio runtime.
//! Listing tasks carry a generation tag so that results delivered after a
//! newer listing has started can be recognized and discarded.

use futures::FutureExt;
use tokio::task::JoinHandle;

/// Result of polling a task
pub enum PollResult<T> {
    /// No task to poll (task was None)
    NoTask,
    /// Task is still running
    Pending,
    /// Task completed with result (may be Ok or join error)
    Complete(Result<T, tokio::task::JoinError>),
}

/// Poll an optional task handle and return its result if finished.
///
/// This helper encapsulates the common pattern of:
/// 1. Checking if a task exists
/// 2. Checking if it's finished
/// 3. Taking ownership and extracting the result with `now_or_never()`
///
/// # Returns
/// - `PollResult::NoTask` if task is None
/// - `PollResult::Pending` if task is still running
/// - `PollResult::Complete(result)` if task is finished
///
/// # Example
/// ```ignore
/// match poll_task(&mut self.transfer_task) {
///     PollResult::Complete(Ok(Ok(()))) => { /* success */ }
///     PollResult::Complete(Ok(Err(e))) => { /* task returned error */ }
///     PollResult::Complete(Err(e)) => { /* task panicked */ }
///     PollResult::Pending => ctx.request_repaint(),
///     PollResult::NoTask => {}
/// }
/// ```
pub fn poll_task<T>(task: &mut Option<JoinHandle<T>>) -> PollResult<T> {
    let Some(handle) = task else {
        return PollResult::NoTask;
    };

    if !handle.is_finished() {
        return PollResult::Pending;
    }

    let handle = task.take().unwrap();
    match handle.now_or_never() {
        Some(result) => PollResult::Complete(result),
        None => {
            // Shouldn't happen since we checked is_finished()
            tracing::warn!("Task not ready despite is_finished()");
            PollResult::Pending
        }
    }
}

/// A listing task tagged with the generation it was started for.
///
/// The controller bumps its generation whenever a new listing supersedes a
/// running one. A completed handle whose tag no longer matches the current
/// generation is stale and its result must not touch the list.
pub struct TaggedTask<T> {
    generation: u64,
    handle: JoinHandle<T>,
}

impl<T> TaggedTask<T> {
    pub fn new(generation: u64, handle: JoinHandle<T>) -> Self {
        Self { generation, handle }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of polling a tagged task
pub enum TaggedPoll<T> {
    NoTask,
    Pending,
    /// Task finished; `generation` is the tag it was started with
    Complete {
        generation: u64,
        result: Result<T, tokio::task::JoinError>,
    },
}

/// Poll an optional tagged task handle, keeping the generation tag with
/// the result so the caller can compare it against the current one.
pub fn poll_tagged<T>(task: &mut Option<TaggedTask<T>>) -> TaggedPoll<T> {
    let Some(tagged) = task else {
        return TaggedPoll::NoTask;
    };

    if !tagged.handle.is_finished() {
        return TaggedPoll::Pending;
    }

    let tagged = task.take().unwrap();
    match tagged.handle.now_or_never() {
        Some(result) => TaggedPoll::Complete {
            generation: tagged.generation,
            result,
        },
        None => {
            tracing::warn!("Task not ready despite is_finished()");
            TaggedPoll::Pending
        }
    }
}
