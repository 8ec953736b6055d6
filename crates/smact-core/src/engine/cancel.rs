use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

/// Polled once per visited search-tree node. Returning `true` stops the search; results found
/// so far are kept and flagged as cancelled.
pub trait Cancellation: Sync {
    fn is_cancelled(&self) -> bool;
}

/// Never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A flag another thread (or a signal handler) can raise.
impl Cancellation for AtomicBool {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Cancels once the wall-clock deadline has passed.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(pub Instant);

impl Cancellation for Deadline {
    #[inline]
    fn is_cancelled(&self) -> bool {
        Instant::now() >= self.0
    }
}

impl<C: Cancellation + ?Sized> Cancellation for &C {
    #[inline]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Stops after a fixed number of polls. Handy for exercising partial results.
#[derive(Debug)]
pub struct PollBudget {
    remaining: AtomicU64,
}

impl PollBudget {
    pub fn new(polls: u64) -> Self {
        Self {
            remaining: AtomicU64::new(polls),
        }
    }
}

impl Cancellation for PollBudget {
    fn is_cancelled(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_err()
    }
}
