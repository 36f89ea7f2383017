//! The coroutine trampoline.
//!
//! [`async_exec`] turns a [`Routine`] into a single future. The future keeps at
//! most one pending value in flight: whenever the routine hands one back, the
//! run suspends until it settles, then resumes the routine with the
//! settlement at the exact point it stopped. A failed pending value is raised
//! inside the routine through [`Resume::Failure`], so the routine can recover
//! from it; only an error returned from [`Routine::resume`] ends the run.
//!
//! The driver is executor agnostic and never spawns anything. Steps that hand
//! back [`Yielded::Ready`] are resumed in the same poll without deferring.

use std::{
    borrow::Cow,
    fmt,
    pin::Pin,
    task::{Context, Poll},
};

use futures::future::FusedFuture;
use log::{debug, trace};
use pin_project_lite::pin_project;

use crate::routine::{Pending, Resume, Routine, Yielded};

/// Observable lifecycle of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// The routine exists but has not been resumed yet.
    Created,
    /// Waiting on a pending value.
    Suspended,
    /// The routine finished and the run settled successfully.
    Done,
    /// The routine returned an error and the run settled with it.
    Failed,
}

enum Stage<V, E> {
    Created,
    Suspended(Pending<V, E>),
    Finished(RunState),
}

impl<V, E> Stage<V, E> {
    fn state(&self) -> RunState {
        match self {
            Stage::Created => RunState::Created,
            Stage::Suspended(_) => RunState::Suspended,
            Stage::Finished(state) => *state,
        }
    }
}

pin_project! {
    /// Future driving one routine to completion.
    ///
    /// Resolves to the routine's output, or to the error that ended it. Created
    /// by [`async_exec`] or [`Exec::new`].
    #[must_use = "futures do nothing unless polled or .awaited"]
    pub struct Exec<R>
    where
        R: Routine,
    {
        routine: R,
        stage: Stage<R::Value, R::Error>,
        steps: usize,
        label: Option<Cow<'static, str>>,
    }
}

impl<R: Routine> Exec<R> {
    /// Wraps an already constructed routine.
    pub fn new(routine: R) -> Self {
        Self {
            routine,
            stage: Stage::Created,
            steps: 0,
            label: None,
        }
    }

    /// Names the run in log records.
    pub fn label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.stage.state()
    }

    /// Number of resume steps taken so far.
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl<R: Routine> fmt::Debug for Exec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exec")
            .field("label", &self.label)
            .field("state", &self.state())
            .field("steps", &self.steps)
            .finish()
    }
}

/// Invokes `factory` and returns a future that drives the resulting routine.
///
/// # Example
/// ```
/// use coflow::{Resume, Yielded, async_exec, routine};
///
/// let run = async_exec(|| {
///     routine::from_fn(|input: Resume<i32, String>| match input {
///         Resume::Start => Ok(Yielded::pending(async { Ok::<_, String>(5) })),
///         Resume::Value(v) => Ok(Yielded::Done(v * 2)),
///         Resume::Failure(e) => Err(e),
///     })
/// });
///
/// assert_eq!(futures::executor::block_on(run), Ok(10));
/// ```
pub fn async_exec<R, F>(factory: F) -> Exec<R>
where
    R: Routine,
    F: FnOnce() -> R,
{
    Exec::new(factory())
}

impl<R: Routine> Future for Exec<R> {
    type Output = Result<R::Output, R::Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let name = this.label.as_deref().unwrap_or("exec");

        loop {
            let mut input = match this.stage {
                Stage::Created => Resume::Start,
                Stage::Suspended(pending) => match pending.as_mut().poll(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Ok(value)) => Resume::Value(value),
                    Poll::Ready(Err(error)) => {
                        trace!("{name}: pending value failed, raising it in the routine");
                        Resume::Failure(error)
                    }
                },
                Stage::Finished(_) => panic!("`Exec` polled after completion"),
            };

            // Resume until the routine suspends on something that is not ready.
            loop {
                *this.steps += 1;
                trace!("{name}: resume step {}", this.steps);
                match this.routine.resume(input) {
                    Ok(Yielded::Ready(value)) => input = Resume::Value(value),
                    Ok(Yielded::Pending(pending)) => {
                        *this.stage = Stage::Suspended(pending);
                        break;
                    }
                    Ok(Yielded::Done(output)) => {
                        debug!("{name}: done after {} steps", this.steps);
                        *this.stage = Stage::Finished(RunState::Done);
                        return Poll::Ready(Ok(output));
                    }
                    Err(error) => {
                        debug!("{name}: failed after {} steps", this.steps);
                        *this.stage = Stage::Finished(RunState::Failed);
                        return Poll::Ready(Err(error));
                    }
                }
            }
        }
    }
}

impl<R: Routine> FusedFuture for Exec<R> {
    fn is_terminated(&self) -> bool {
        matches!(self.stage, Stage::Finished(_))
    }
}
