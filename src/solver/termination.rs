//! Cooperative cancellation for the long-running solver entry points.
//!
//! A [`Termination`] is polled at the solver's safepoints (once per search
//! candidate, once per arc-consistency queue pop). When it triggers, the
//! running call returns [`Error::Canceled`](crate::error::Error::Canceled)
//! promptly, distinct from "no solution found". The store may be left in an
//! intermediate state and should not be trusted afterwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Decides when a running solve should give up, even though no conclusion
/// has been reached.
pub trait Termination {
    /// Returns true when the current call should stop.
    fn should_stop(&mut self) -> bool;
}

/// Never stops; the solve runs to completion or failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct Indefinite;

impl Termination for Indefinite {
    fn should_stop(&mut self) -> bool {
        false
    }
}

/// Stops once a fixed point in time has passed.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    deadline: Instant,
}

impl Deadline {
    /// A deadline the given duration from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            deadline: Instant::now() + budget,
        }
    }

    /// A deadline at the given instant.
    pub fn at(deadline: Instant) -> Self {
        Self { deadline }
    }
}

impl Termination for Deadline {
    fn should_stop(&mut self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// Stops once [`CancelFlag::cancel`] has been called on any clone of the
/// flag, e.g. from another thread or a signal handler.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag {
    canceled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Relaxed);
    }
}

impl Termination for CancelFlag {
    fn should_stop(&mut self) -> bool {
        self.canceled.load(Ordering::Relaxed)
    }
}

/// Stops when either of two conditions triggers.
#[derive(Clone, Copy, Debug)]
pub struct Combinator<T1, T2> {
    t1: T1,
    t2: T2,
}

impl<T1, T2> Combinator<T1, T2> {
    pub fn new(t1: T1, t2: T2) -> Self {
        Self { t1, t2 }
    }
}

impl<T1: Termination, T2: Termination> Termination for Combinator<T1, T2> {
    fn should_stop(&mut self) -> bool {
        self.t1.should_stop() || self.t2.should_stop()
    }
}

/// Maps a triggered condition to the canceled error at a solver safepoint.
pub(crate) fn checkpoint(termination: &mut impl Termination) -> Result<()> {
    if termination.should_stop() {
        Err(Error::Canceled)
    } else {
        Ok(())
    }
}
