//! Waitable action handlers
//!
//! A handler services action ids it recognizes and returns a [`Completion`]
//! describing when the action is finished. Completions are poll-based: the
//! playback loop feeds them elapsed time each tick, which keeps the crate
//! free of any async runtime while still expressing "wait until done".

use std::fmt;

/// When an invoked action counts as finished.
pub enum Completion {
    /// Finished immediately.
    Done,
    /// Finished once this many seconds have elapsed.
    Timer(f32),
    /// Finished once the closure returns true. Called once per tick with
    /// the elapsed seconds since the previous call.
    Poll(Box<dyn FnMut(f32) -> bool + Send>),
}

impl Completion {
    /// A completion that resolves after `seconds`.
    #[must_use]
    pub fn after_seconds(seconds: f32) -> Self {
        Completion::Timer(seconds.max(0.0))
    }

    /// A completion driven by a custom poll closure.
    #[must_use]
    pub fn poll_fn(poll: impl FnMut(f32) -> bool + Send + 'static) -> Self {
        Completion::Poll(Box::new(poll))
    }

    /// Advance by `dt` seconds; returns true once the action is finished.
    pub fn poll(&mut self, dt: f32) -> bool {
        match self {
            Completion::Done => true,
            Completion::Timer(remaining) => {
                *remaining -= dt;
                *remaining <= 0.0
            }
            Completion::Poll(poll) => poll(dt),
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Done => f.write_str("Completion::Done"),
            Completion::Timer(remaining) => write!(f, "Completion::Timer({remaining})"),
            Completion::Poll(_) => f.write_str("Completion::Poll(..)"),
        }
    }
}

/// A waitable action handler.
///
/// Handlers are consulted in registration order; the first whose
/// [`can_handle`](ActionHandler::can_handle) returns true services the
/// action. Errors from [`handle`](ActionHandler::handle) are caught at the
/// bridge boundary, logged, and treated as "this handler did not run".
pub trait ActionHandler: Send {
    /// Whether this handler services the given action id.
    fn can_handle(&self, action_id: &str) -> bool;

    /// Start the action and describe its completion.
    ///
    /// # Errors
    /// May fail for malformed payloads or unavailable resources; the
    /// failure never propagates into playback.
    fn handle(&mut self, action_id: &str, payload: &str) -> anyhow::Result<Completion>;
}
