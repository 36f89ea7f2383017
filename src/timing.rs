//! Timing utilities for building pending values.
//!
//! Provides wrappers that defer a future or bound it by a deadline, plus
//! [`settle_after`] for producing a pending value a routine can wait on.
//! Wake-ups are driven by one background timer thread holding a deadline heap,
//! so these types do not depend on any particular async runtime.

use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    pin::Pin,
    sync::{Arc, Condvar, Mutex, MutexGuard, Once, PoisonError},
    task::{Context, Poll, Waker},
    time::{Duration, Instant},
};

use futures::{FutureExt, future};
use log::{debug, error};
use pin_project_lite::pin_project;
use thiserror::Error;

use crate::routine::Pending;

type Slot = Arc<Mutex<Option<Waker>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Entry {
    due: Instant,
    seq: u64,
    slot: Slot,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the max-heap pops the earliest deadline first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

struct Queue {
    heap: BinaryHeap<Entry>,
    seq: u64,
    running: bool,
}

struct Timer {
    queue: Mutex<Queue>,
    changed: Condvar,
}

static TIMER: Timer = Timer {
    queue: Mutex::new(Queue {
        heap: BinaryHeap::new(),
        seq: 0,
        running: false,
    }),
    changed: Condvar::new(),
};
static START: Once = Once::new();

impl Timer {
    fn start(&'static self) {
        START.call_once(|| {
            let spawned = std::thread::Builder::new()
                .name("coflow-timer".into())
                .spawn(move || self.run());
            match spawned {
                Ok(_) => lock(&self.queue).running = true,
                Err(e) => error!("failed to start timer thread: {e}"),
            }
        });
    }

    fn register(&'static self, due: Instant, slot: Slot) {
        self.start();
        let mut queue = lock(&self.queue);
        if !queue.running {
            drop(queue);
            // Without a timer thread the best we can do is re-poll right away.
            let waker = lock(&slot).take();
            if let Some(waker) = waker {
                waker.wake();
            }
            return;
        }
        queue.seq += 1;
        let seq = queue.seq;
        queue.heap.push(Entry { due, seq, slot });
        drop(queue);
        self.changed.notify_one();
    }

    fn run(&self) {
        let mut queue = lock(&self.queue);
        loop {
            let now = Instant::now();
            let mut due = Vec::new();
            while queue.heap.peek().is_some_and(|entry| entry.due <= now) {
                if let Some(entry) = queue.heap.pop() {
                    due.push(entry.slot);
                }
            }
            if !due.is_empty() {
                drop(queue);
                for slot in due {
                    // Cleared slots belong to futures that were dropped.
                    let waker = lock(&slot).take();
                    if let Some(waker) = waker {
                        waker.wake();
                    }
                }
                queue = lock(&self.queue);
                continue;
            }
            queue = match queue.heap.peek() {
                Some(next) => {
                    let wait = next.due.saturating_duration_since(now);
                    self.changed
                        .wait_timeout(queue, wait)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .changed
                    .wait(queue)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }
}

// A wake-up registered with the timer thread. Dropping it withdraws the waker.
struct Wakeup {
    slot: Slot,
}

impl Wakeup {
    fn arm(due: Instant, waker: &Waker) -> Self {
        let slot = Arc::new(Mutex::new(Some(waker.clone())));
        TIMER.register(due, Arc::clone(&slot));
        Wakeup { slot }
    }

    // Keeps the registered waker current when the future moves between tasks.
    fn refresh(&self, waker: &Waker) {
        let mut slot = lock(&self.slot);
        if let Some(current) = slot.as_mut().filter(|current| !current.will_wake(waker)) {
            *current = waker.clone();
        }
    }

    fn is_registered(&self) -> bool {
        lock(&self.slot).is_some()
    }
}

impl Drop for Wakeup {
    fn drop(&mut self) {
        lock(&self.slot).take();
    }
}

fn schedule(wakeup: &mut Option<Wakeup>, due: Instant, waker: &Waker) {
    if let Some(current) = wakeup.as_ref().filter(|w| w.is_registered()) {
        current.refresh(waker);
        return;
    }
    *wakeup = Some(Wakeup::arm(due, waker));
}

pin_project! {
    /// A future that begins polling its inner future only after a specified delay.
    ///
    /// The delay is counted from the moment the `Delay` is created. Once it has
    /// passed, every poll is forwarded to the inner future. Dropping a `Delay`
    /// withdraws its pending wake-up.
    #[must_use = "futures do nothing unless polled or .awaited"]
    pub struct Delay<F> {
        #[pin]
        future: F,
        due: Instant,
        wakeup: Option<Wakeup>,
    }
}

impl<F> Delay<F> {
    /// Creates a new `Delay` that defers the given future by `delay`.
    ///
    /// A more convenient way to construct this is via
    /// [`PendingExt::delay`](crate::pending_ext::PendingExt::delay).
    pub fn new(future: F, delay: Duration) -> Self {
        Delay {
            future,
            due: Instant::now() + delay,
            wakeup: None,
        }
    }
}

impl<F: Future> Future for Delay<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        if Instant::now() < *this.due {
            if this.wakeup.is_none() {
                debug!(
                    "delay armed for {:?}",
                    this.due.saturating_duration_since(Instant::now())
                );
            }
            schedule(this.wakeup, *this.due, cx.waker());
            return Poll::Pending;
        }
        this.wakeup.take();
        this.future.poll(cx)
    }
}

/// Error returned by [`Timeout`] when the deadline passes first.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("deadline elapsed")]
pub struct Elapsed;

pin_project! {
    /// A future that applies a deadline to another future.
    ///
    /// Resolves to `Err(Elapsed)` if the inner future has not completed when the
    /// deadline passes. The countdown starts when the `Timeout` is created, not
    /// when it is awaited. Dropping the `Timeout` drops the inner future and its
    /// pending wake-up.
    #[must_use = "futures do nothing unless polled or .awaited"]
    pub struct Timeout<F> {
        #[pin]
        future: F,
        deadline: Instant,
        wakeup: Option<Wakeup>,
    }
}

impl<F> Timeout<F> {
    /// Creates a new `Timeout` that gives `future` at most `time_limit` to finish.
    pub fn new(future: F, time_limit: Duration) -> Self {
        Timeout {
            future,
            deadline: Instant::now() + time_limit,
            wakeup: None,
        }
    }
}

impl<F: Future> Future for Timeout<F> {
    type Output = Result<F::Output, Elapsed>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        if Instant::now() >= *this.deadline {
            debug!("deadline reached");
            this.wakeup.take();
            return Poll::Ready(Err(Elapsed));
        }
        if let Poll::Ready(output) = this.future.poll(cx) {
            this.wakeup.take();
            return Poll::Ready(Ok(output));
        }
        schedule(this.wakeup, *this.deadline, cx.waker());
        Poll::Pending
    }
}

/// Returns a pending value that settles to `result` once `delay` has passed.
pub fn settle_after<V, E>(delay: Duration, result: Result<V, E>) -> Pending<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    Delay::new(future::ready(result), delay).boxed()
}
