//! Resumable routines driven by [`Exec`](crate::Exec).
//!
//! A routine is an explicit state machine. Each call to [`Routine::resume`]
//! runs it up to its next suspension point, where it hands back a
//! [`Yielded`] value. The driver feeds the settlement of that value back in
//! through the next `resume` call, either as [`Resume::Value`] or as
//! [`Resume::Failure`]. Returning `Err` from `resume` means the routine did not
//! recover and the run fails with that error.

use std::marker::PhantomData;

use futures::{FutureExt, future::BoxFuture};

/// A pending value the routine waits on.
pub type Pending<V, E> = BoxFuture<'static, Result<V, E>>;

/// Input handed to a routine when it is resumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resume<V, E> {
    /// First step; the routine has not suspended yet.
    Start,
    /// The awaited value settled successfully.
    Value(V),
    /// The awaited value failed. The routine may recover or return the error.
    Failure(E),
}

/// What a routine hands back at a suspension point.
pub enum Yielded<V, E, T> {
    /// Wait for this value, then resume with its settlement.
    Pending(Pending<V, E>),
    /// An already available value; the routine is resumed with it right away.
    Ready(V),
    /// The routine finished with its final output.
    Done(T),
}

impl<V, E, T> Yielded<V, E, T> {
    /// Boxes `future` into a [`Yielded::Pending`].
    pub fn pending(future: impl Future<Output = Result<V, E>> + Send + 'static) -> Self {
        Yielded::Pending(future.boxed())
    }
}

impl<V, E, T> std::fmt::Debug for Yielded<V, E, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Yielded::Pending(_) => f.write_str("Pending"),
            Yielded::Ready(_) => f.write_str("Ready"),
            Yielded::Done(_) => f.write_str("Done"),
        }
    }
}

/// A computation that suspends on pending values.
pub trait Routine {
    /// Values flowing into the routine at suspension points.
    type Value;
    /// Failure type of pending values and of the routine itself.
    type Error;
    /// Final output.
    type Output;

    /// Runs the routine to its next suspension point.
    fn resume(
        &mut self,
        input: Resume<Self::Value, Self::Error>,
    ) -> Result<Yielded<Self::Value, Self::Error, Self::Output>, Self::Error>;
}

impl<R: Routine + ?Sized> Routine for Box<R> {
    type Value = R::Value;
    type Error = R::Error;
    type Output = R::Output;

    fn resume(
        &mut self,
        input: Resume<Self::Value, Self::Error>,
    ) -> Result<Yielded<Self::Value, Self::Error, Self::Output>, Self::Error> {
        (**self).resume(input)
    }
}

/// Routine backed by a closure, created by [`from_fn`].
pub struct FromFn<F, V, E, T> {
    f: F,
    _marker: PhantomData<fn(V, E) -> T>,
}

impl<F, V, E, T> Routine for FromFn<F, V, E, T>
where
    F: FnMut(Resume<V, E>) -> Result<Yielded<V, E, T>, E>,
{
    type Value = V;
    type Error = E;
    type Output = T;

    fn resume(&mut self, input: Resume<V, E>) -> Result<Yielded<V, E, T>, E> {
        (self.f)(input)
    }
}

/// Builds a routine from a closure called once per resume step.
///
/// The closure keeps whatever state it needs in its captures.
pub fn from_fn<F, V, E, T>(f: F) -> FromFn<F, V, E, T>
where
    F: FnMut(Resume<V, E>) -> Result<Yielded<V, E, T>, E>,
{
    FromFn {
        f,
        _marker: PhantomData,
    }
}
