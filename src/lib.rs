//! Lazy sequence combinators and a coroutine trampoline.
//!
//! `coflow` provides two small, independent layers:
//!
//! - A uniform lazy-iteration layer. Any value implementing [`Sequence`] (by
//!   native iteration or by indexed access) can be walked with [`iterator`],
//!   transformed with [`map`], [`filter`], [`concat`] and [`zip`], generated
//!   with the `range` family, and consumed with [`all`], [`any`], [`first`],
//!   [`last`], [`index_of`], [`partition`] and [`sets_are_equal`].
//! - A coroutine trampoline. [`async_exec`] drives a [`Routine`], a resumable
//!   state machine that suspends on pending values, and exposes the whole run
//!   as one future. Failed pending values are raised back inside the routine so
//!   it can recover; anything it does not recover from settles the future.
//!
//! The trampoline is executor agnostic. Timing helpers in [`timing`] and
//! [`pending_ext`] build pending values that settle after a delay or race a run
//! against a deadline.

pub mod adapter;
pub mod combinators;
pub mod error;
pub mod exec;
pub mod grouping;
pub mod pending_ext;
pub mod routine;
pub mod search;
pub mod timing;

pub use adapter::{ArrayLike, Capability, Cursor, Sequence, SinglePass, iterator};
pub use combinators::{
    DynSequence, Range, concat, filter, lazy_range, lazy_range_from, lazy_range_map, map, range,
    range_from, range_map, try_filter, try_map, zip,
};
pub use error::{Error, Result};
pub use exec::{Exec, RunState, async_exec};
pub use grouping::GroupingMap;
pub use routine::{Pending, Resume, Routine, Yielded};
pub use search::{
    Searchable, SetLike, Truthy, all, all_by, any, any_by, first, index_of, index_of_by, last,
    partition, sets_are_equal, try_all_by, try_any_by, try_index_of_by, try_partition,
};
