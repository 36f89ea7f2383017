use std::time::Duration;

use crate::timing::{Delay, Timeout};

/// Extend `Future` with time-based operations.
///
/// Handy for building the pending values a routine waits on, or for racing a
/// whole run against a deadline from the outside.
pub trait PendingExt: Future {
    fn delay(self, due: Duration) -> Delay<Self>
    where
        Self: Sized,
    {
        Delay::new(self, due)
    }

    fn timeout(self, time_limit: Duration) -> Timeout<Self>
    where
        Self: Sized,
    {
        Timeout::new(self, time_limit)
    }
}

impl<T> PendingExt for T where T: Future {}
