//! Lazy producers and transforms over [`Sequence`] values.
//!
//! Every transform resolves its inputs through [`iterator`] before yielding
//! anything, so a non-iterable input fails the call itself with
//! [`Error::NotIterable`](crate::Error::NotIterable). The returned adaptors
//! are wrapped in [`SinglePass`]: they can be iterated directly or handed to any
//! operation that accepts a [`Sequence`].

use std::{collections::VecDeque, iter::FusedIterator};

use crate::{
    adapter::{Cursor, SinglePass, iterator},
    error::Result,
    Sequence,
};

/// A borrowed sequence of any concrete type, used by the variadic combinators.
pub type DynSequence<'a, T> = dyn Sequence<Item = T> + 'a;

/// Integers from a start value up to an exclusive end, optionally mapped.
///
/// Created by [`lazy_range`], [`lazy_range_from`] and [`lazy_range_map`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Clone, Debug)]
pub struct Range<F> {
    next: i64,
    end: i64,
    ordinal: usize,
    f: F,
}

/// Mapping function of an unmapped [`Range`].
pub type Identity = fn(i64, usize) -> i64;

fn identity(value: i64, _ordinal: usize) -> i64 {
    value
}

impl<F> Range<F> {
    fn remaining(&self) -> usize {
        usize::try_from(self.end.saturating_sub(self.next).max(0)).unwrap_or(usize::MAX)
    }
}

impl<T, F> Iterator for Range<F>
where
    F: FnMut(i64, usize) -> T,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.next >= self.end {
            return None;
        }
        let value = self.next;
        let ordinal = self.ordinal;
        self.next += 1;
        self.ordinal += 1;
        Some((self.f)(value, ordinal))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl<T, F> ExactSizeIterator for Range<F> where F: FnMut(i64, usize) -> T {}

impl<T, F> FusedIterator for Range<F> where F: FnMut(i64, usize) -> T {}

/// Lazily yields `0..end`.
pub fn lazy_range(end: i64) -> Range<Identity> {
    lazy_range_from(0, end)
}

/// Lazily yields `start..end`. Empty when `end <= start`.
pub fn lazy_range_from(start: i64, end: i64) -> Range<Identity> {
    lazy_range_map(start, end, identity)
}

/// Lazily yields `f(value, ordinal)` for every `value` in `start..end`.
pub fn lazy_range_map<T, F>(start: i64, end: i64, f: F) -> Range<F>
where
    F: FnMut(i64, usize) -> T,
{
    Range {
        next: start,
        end,
        ordinal: 0,
        f,
    }
}

/// Returns `[0, 1, ..., end - 1]`.
pub fn range(end: i64) -> Vec<i64> {
    lazy_range(end).collect()
}

/// Returns `[start, ..., end - 1]`, of length `max(0, end - start)`.
pub fn range_from(start: i64, end: i64) -> Vec<i64> {
    lazy_range_from(start, end).collect()
}

/// Returns `f(value, ordinal)` for every `value` in `start..end`.
///
/// ```
/// assert_eq!(coflow::range_map(0, 5, |v, _| v * v), vec![0, 1, 4, 9, 16]);
/// ```
pub fn range_map<T, F>(start: i64, end: i64, f: F) -> Vec<T>
where
    F: FnMut(i64, usize) -> T,
{
    lazy_range_map(start, end, f).collect()
}

/// Adaptor created by [`map`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Map<'a, S: Sequence + ?Sized, F> {
    cursor: Cursor<'a, S>,
    source: &'a S,
    ordinal: usize,
    f: F,
}

impl<S, U, F> Iterator for Map<'_, S, F>
where
    S: Sequence + ?Sized,
    F: FnMut(S::Item, usize, &S) -> U,
{
    type Item = U;

    fn next(&mut self) -> Option<U> {
        let item = self.cursor.next()?;
        let ordinal = self.ordinal;
        self.ordinal += 1;
        Some((self.f)(item, ordinal, self.source))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cursor.size_hint()
    }
}

/// Lazily applies `f(element, ordinal, seq)` to every element of `seq`.
pub fn map<'a, S, U, F>(seq: &'a S, f: F) -> Result<SinglePass<Map<'a, S, F>>>
where
    S: Sequence + ?Sized,
    F: FnMut(S::Item, usize, &S) -> U,
{
    Ok(SinglePass::new(Map {
        cursor: iterator(seq)?,
        source: seq,
        ordinal: 0,
        f,
    }))
}

/// Adaptor created by [`try_map`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct TryMap<'a, S: Sequence + ?Sized, F> {
    inner: Map<'a, S, F>,
    failed: bool,
}

impl<S, U, E, F> Iterator for TryMap<'_, S, F>
where
    S: Sequence + ?Sized,
    F: FnMut(S::Item, usize, &S) -> std::result::Result<U, E>,
{
    type Item = std::result::Result<U, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.inner.next()?;
        self.failed = item.is_err();
        Some(item)
    }
}

/// Like [`map`], with a fallible mapping function.
///
/// The first `Err` returned by `f` is yielded unchanged and ends the sequence.
pub fn try_map<'a, S, U, E, F>(seq: &'a S, f: F) -> Result<SinglePass<TryMap<'a, S, F>>>
where
    S: Sequence + ?Sized,
    F: FnMut(S::Item, usize, &S) -> std::result::Result<U, E>,
{
    let inner = Map {
        cursor: iterator(seq)?,
        source: seq,
        ordinal: 0,
        f,
    };
    Ok(SinglePass::new(TryMap {
        inner,
        failed: false,
    }))
}

/// Adaptor created by [`filter`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Filter<'a, S: Sequence + ?Sized, P> {
    cursor: Cursor<'a, S>,
    ordinal: usize,
    predicate: P,
}

impl<S, P> Iterator for Filter<'_, S, P>
where
    S: Sequence + ?Sized,
    P: FnMut(&S::Item, usize) -> bool,
{
    type Item = S::Item;

    fn next(&mut self) -> Option<S::Item> {
        for item in self.cursor.by_ref() {
            // Ordinal counts source elements, not kept ones.
            let ordinal = self.ordinal;
            self.ordinal += 1;
            if (self.predicate)(&item, ordinal) {
                return Some(item);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.cursor.size_hint().1)
    }
}

/// Lazily keeps the elements of `seq` for which `predicate(&element, ordinal)`
/// holds. The ordinal is the element's position in `seq`.
pub fn filter<'a, S, P>(seq: &'a S, predicate: P) -> Result<SinglePass<Filter<'a, S, P>>>
where
    S: Sequence + ?Sized,
    P: FnMut(&S::Item, usize) -> bool,
{
    Ok(SinglePass::new(Filter {
        cursor: iterator(seq)?,
        ordinal: 0,
        predicate,
    }))
}

/// Adaptor created by [`try_filter`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct TryFilter<'a, S: Sequence + ?Sized, P> {
    cursor: Cursor<'a, S>,
    ordinal: usize,
    predicate: P,
    failed: bool,
}

impl<S, E, P> Iterator for TryFilter<'_, S, P>
where
    S: Sequence + ?Sized,
    P: FnMut(&S::Item, usize) -> std::result::Result<bool, E>,
{
    type Item = std::result::Result<S::Item, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        for item in self.cursor.by_ref() {
            let ordinal = self.ordinal;
            self.ordinal += 1;
            match (self.predicate)(&item, ordinal) {
                Ok(true) => return Some(Ok(item)),
                Ok(false) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

/// Like [`filter`], with a fallible predicate.
///
/// The first `Err` returned by `predicate` is yielded unchanged and ends the
/// sequence.
pub fn try_filter<'a, S, E, P>(seq: &'a S, predicate: P) -> Result<SinglePass<TryFilter<'a, S, P>>>
where
    S: Sequence + ?Sized,
    P: FnMut(&S::Item, usize) -> std::result::Result<bool, E>,
{
    Ok(SinglePass::new(TryFilter {
        cursor: iterator(seq)?,
        ordinal: 0,
        predicate,
        failed: false,
    }))
}

/// Adaptor created by [`concat`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Concat<'a, T> {
    cursors: VecDeque<Cursor<'a, DynSequence<'a, T>>>,
}

impl<T> Iterator for Concat<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while let Some(cursor) = self.cursors.front_mut() {
            if let Some(item) = cursor.next() {
                return Some(item);
            }
            self.cursors.pop_front();
        }
        None
    }
}

/// Lazily yields every element of each sequence in turn, exhausting one before
/// starting the next.
pub fn concat<'a, T>(sequences: &[&'a DynSequence<'a, T>]) -> Result<SinglePass<Concat<'a, T>>> {
    let cursors = sequences
        .iter()
        .map(|seq| iterator(*seq))
        .collect::<Result<VecDeque<_>>>()?;
    Ok(SinglePass::new(Concat { cursors }))
}

/// Adaptor created by [`zip`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Zip<'a, T> {
    cursors: Vec<Cursor<'a, DynSequence<'a, T>>>,
    done: bool,
}

impl<T> Iterator for Zip<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.done {
            return None;
        }
        let mut row = Vec::with_capacity(self.cursors.len());
        for cursor in &mut self.cursors {
            match cursor.next() {
                Some(item) => row.push(item),
                None => {
                    // Values already pulled this round are dropped.
                    self.done = true;
                    return None;
                }
            }
        }
        Some(row)
    }
}

/// Lazily advances all sequences in lockstep, yielding one row per round.
///
/// Stops as soon as any sequence is exhausted. Zipping no sequences yields
/// nothing.
pub fn zip<'a, T>(sequences: &[&'a DynSequence<'a, T>]) -> Result<SinglePass<Zip<'a, T>>> {
    let cursors = sequences
        .iter()
        .map(|seq| iterator(*seq))
        .collect::<Result<Vec<_>>>()?;
    let done = cursors.is_empty();
    Ok(SinglePass::new(Zip { cursors, done }))
}
