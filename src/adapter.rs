//! Uniform lazy cursors over sequence-like values.
//!
//! A value takes part in the sequence layer by implementing [`Sequence`]. The
//! trait exposes two independent capabilities, and [`iterator`] consults them
//! in a fixed order:
//!
//! 1. **Native iteration** ([`Sequence::native`]). If present, the native cursor
//!    is used as-is.
//! 2. **Indexed access** ([`Sequence::length`] together with [`Sequence::at`]).
//!    A cursor walking indices `0..length` is synthesized over the value.
//!
//! A value offering neither is rejected with [`Error::NotIterable`]. Nothing is
//! ever copied up front: every cursor pulls from its source on demand.
//!
//! Collections such as `Vec<T>` or `VecDeque<T>` are *restartable*: each call to
//! [`iterator`] starts over. [`SinglePass`] wraps an arbitrary iterator as a
//! *single-pass* sequence whose cursors all drain the same underlying state.

use std::{
    cell::RefCell,
    collections::{BTreeSet, HashSet, VecDeque},
    fmt,
    iter::Fuse,
    marker::PhantomData,
};

use crate::error::{Error, Result};

/// Boxed cursor returned by the native iteration capability.
pub type NativeCursor<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// The capability a sequence-like value was recognized by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// The value produces its own cursor.
    Native,
    /// The value has a length and integer-indexed elements.
    Indexed,
    /// The value is not sequence-like.
    None,
}

/// A value that can produce cursors over its elements.
///
/// All methods have defaults that report the capability as missing, so a type
/// only implements what it actually supports. Implementors of the indexed
/// capability must provide both [`length`](Sequence::length) and
/// [`at`](Sequence::at).
pub trait Sequence {
    /// Element type yielded by cursors over this value.
    type Item;

    /// Returns a fresh native cursor, if the value can iterate itself.
    fn native(&self) -> Option<NativeCursor<'_, Self::Item>> {
        None
    }

    /// Returns the number of indexed elements, if the value is array-like.
    fn length(&self) -> Option<usize> {
        None
    }

    /// Returns the element at `index`, if the value is array-like.
    fn at(&self, _index: usize) -> Option<Self::Item> {
        None
    }

    /// Returns the elements as a contiguous slice when they are stored that way.
    ///
    /// Used by search operations as a fast path.
    fn as_slice(&self) -> Option<&[Self::Item]> {
        None
    }

    /// Human readable rendering used in [`Error::NotIterable`].
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Reports which capability [`iterator`] would use for this value.
    fn capability(&self) -> Capability {
        if self.native().is_some() {
            Capability::Native
        } else if self.length().is_some() {
            Capability::Indexed
        } else {
            Capability::None
        }
    }
}

impl<S: Sequence + ?Sized> Sequence for &S {
    type Item = S::Item;

    fn native(&self) -> Option<NativeCursor<'_, Self::Item>> {
        (**self).native()
    }

    fn length(&self) -> Option<usize> {
        (**self).length()
    }

    fn at(&self, index: usize) -> Option<Self::Item> {
        (**self).at(index)
    }

    fn as_slice(&self) -> Option<&[Self::Item]> {
        (**self).as_slice()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<T: Clone> Sequence for [T] {
    type Item = T;

    fn native(&self) -> Option<NativeCursor<'_, T>> {
        Some(Box::new(self.iter().cloned()))
    }

    fn length(&self) -> Option<usize> {
        Some(self.len())
    }

    fn at(&self, index: usize) -> Option<T> {
        self.get(index).cloned()
    }

    fn as_slice(&self) -> Option<&[T]> {
        Some(self)
    }
}

impl<T: Clone, const N: usize> Sequence for [T; N] {
    type Item = T;

    fn native(&self) -> Option<NativeCursor<'_, T>> {
        Some(Box::new(self.iter().cloned()))
    }

    fn length(&self) -> Option<usize> {
        Some(N)
    }

    fn at(&self, index: usize) -> Option<T> {
        self.get(index).cloned()
    }

    fn as_slice(&self) -> Option<&[T]> {
        Some(self)
    }
}

impl<T: Clone> Sequence for Vec<T> {
    type Item = T;

    fn native(&self) -> Option<NativeCursor<'_, T>> {
        Some(Box::new(self.iter().cloned()))
    }

    fn length(&self) -> Option<usize> {
        Some(self.len())
    }

    fn at(&self, index: usize) -> Option<T> {
        self.get(index).cloned()
    }

    fn as_slice(&self) -> Option<&[T]> {
        Some(self)
    }
}

impl<T: Clone> Sequence for VecDeque<T> {
    type Item = T;

    fn native(&self) -> Option<NativeCursor<'_, T>> {
        Some(Box::new(self.iter().cloned()))
    }

    fn length(&self) -> Option<usize> {
        Some(self.len())
    }

    fn at(&self, index: usize) -> Option<T> {
        self.get(index).cloned()
    }
}

impl<T: Clone, H> Sequence for HashSet<T, H> {
    type Item = T;

    fn native(&self) -> Option<NativeCursor<'_, T>> {
        Some(Box::new(self.iter().cloned()))
    }
}

impl<T: Clone> Sequence for BTreeSet<T> {
    type Item = T;

    fn native(&self) -> Option<NativeCursor<'_, T>> {
        Some(Box::new(self.iter().cloned()))
    }
}

impl Sequence for str {
    type Item = char;

    fn native(&self) -> Option<NativeCursor<'_, char>> {
        Some(Box::new(self.chars()))
    }

    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

impl Sequence for String {
    type Item = char;

    fn native(&self) -> Option<NativeCursor<'_, char>> {
        Some(Box::new(self.chars()))
    }

    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

/// Cursor over a sequence, obtained from [`iterator`].
pub enum Cursor<'a, S: Sequence + ?Sized + 'a> {
    /// The value's own cursor.
    Native(NativeCursor<'a, S::Item>),
    /// Index walk over an array-like value.
    Indexed { source: &'a S, index: usize },
}

impl<S: Sequence + ?Sized> Iterator for Cursor<'_, S> {
    type Item = S::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Cursor::Native(cursor) => cursor.next(),
            Cursor::Indexed { source, index } => {
                // Length is re-read on each step so a shrinking source ends the walk.
                if *index >= source.length().unwrap_or(0) {
                    return None;
                }
                match source.at(*index) {
                    Some(item) => {
                        *index += 1;
                        Some(item)
                    }
                    None => {
                        // A gap ends the walk for good.
                        *index = usize::MAX;
                        None
                    }
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Cursor::Native(cursor) => cursor.size_hint(),
            Cursor::Indexed { source, index } => {
                let remaining = source.length().unwrap_or(0).saturating_sub(*index);
                (0, Some(remaining))
            }
        }
    }
}

impl<S: Sequence + ?Sized> fmt::Debug for Cursor<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::Native(_) => f.write_str("Cursor::Native"),
            Cursor::Indexed { index, .. } => f
                .debug_struct("Cursor::Indexed")
                .field("index", index)
                .finish(),
        }
    }
}

/// Produces a lazy cursor over `value`.
///
/// Native iteration wins over indexed access. Fails with
/// [`Error::NotIterable`] when the value supports neither.
pub fn iterator<S: Sequence + ?Sized>(value: &S) -> Result<Cursor<'_, S>> {
    if let Some(cursor) = value.native() {
        return Ok(Cursor::Native(cursor));
    }
    if value.length().is_some() {
        return Ok(Cursor::Indexed {
            source: value,
            index: 0,
        });
    }
    Err(Error::not_iterable(value.describe()))
}

/// A single-pass sequence backed by an iterator.
///
/// Every cursor obtained from a `SinglePass` drains the same underlying
/// iterator, so once it is exhausted no cursor yields anything again. It is
/// also an [`Iterator`] itself.
///
/// # Panics
///
/// Pulling from a cursor while the wrapped iterator is already being advanced
/// (re-entrantly, from inside its own `next`) panics.
pub struct SinglePass<I> {
    inner: RefCell<Fuse<I>>,
}

impl<I: Iterator> SinglePass<I> {
    pub fn new(iter: I) -> Self {
        Self {
            inner: RefCell::new(iter.fuse()),
        }
    }
}

impl<I: Iterator> Iterator for SinglePass<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.get_mut().next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.borrow().size_hint()
    }
}

struct Drain<'a, I> {
    inner: &'a RefCell<Fuse<I>>,
}

impl<I: Iterator> Iterator for Drain<'_, I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.borrow_mut().next()
    }
}

impl<I: Iterator> Sequence for SinglePass<I> {
    type Item = I::Item;

    fn native(&self) -> Option<NativeCursor<'_, I::Item>> {
        Some(Box::new(Drain { inner: &self.inner }))
    }

    fn describe(&self) -> String {
        format!("single-pass sequence over {}", std::any::type_name::<I>())
    }
}

impl<I> fmt::Debug for SinglePass<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SinglePass")
    }
}

/// An array-like value: a length plus an index function, with no native cursor.
pub struct ArrayLike<T, F> {
    len: usize,
    get: F,
    _item: PhantomData<fn() -> T>,
}

impl<T, F> ArrayLike<T, F>
where
    F: Fn(usize) -> Option<T>,
{
    pub fn new(len: usize, get: F) -> Self {
        Self {
            len,
            get,
            _item: PhantomData,
        }
    }
}

impl<T, F> Sequence for ArrayLike<T, F>
where
    F: Fn(usize) -> Option<T>,
{
    type Item = T;

    fn length(&self) -> Option<usize> {
        Some(self.len)
    }

    fn at(&self, index: usize) -> Option<T> {
        if index < self.len {
            (self.get)(index)
        } else {
            None
        }
    }

    fn describe(&self) -> String {
        format!("array-like of length {}", self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Opaque;

    impl Sequence for Opaque {
        type Item = u8;

        fn describe(&self) -> String {
            "Opaque".to_string()
        }
    }

    #[test]
    fn native_capability_wins() {
        let v = vec![1, 2, 3];
        assert_eq!(v.capability(), Capability::Native);
        let cursor = iterator(&v).unwrap();
        assert!(matches!(cursor, Cursor::Native(_)));
        assert_eq!(cursor.collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn array_like_walks_indices() {
        let squares = ArrayLike::new(4, |i| Some(i * i));
        assert_eq!(squares.capability(), Capability::Indexed);
        let cursor = iterator(&squares).unwrap();
        assert!(matches!(cursor, Cursor::Indexed { .. }));
        assert_eq!(cursor.collect::<Vec<_>>(), vec![0, 1, 4, 9]);
    }

    #[test]
    fn gap_in_array_like_ends_the_walk() {
        let holey = ArrayLike::new(3, |i| if i == 1 { None } else { Some(i) });
        let mut cursor = iterator(&holey).unwrap();
        assert_eq!(cursor.next(), Some(0));
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.size_hint(), (0, Some(0)));
    }

    #[test]
    fn restartable_sequences_start_over() {
        let v = vec!['a', 'b'];
        assert_eq!(iterator(&v).unwrap().count(), 2);
        assert_eq!(iterator(&v).unwrap().count(), 2);
    }

    #[test]
    fn single_pass_is_never_replayed() {
        let once = SinglePass::new(0..3);
        let mut first = iterator(&once).unwrap();
        assert_eq!(first.next(), Some(0));
        let second = iterator(&once).unwrap();
        assert_eq!(second.collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(first.next(), None);
        assert_eq!(iterator(&once).unwrap().next(), None);
    }

    #[test]
    fn strings_iterate_chars() {
        let s = String::from("hé");
        assert_eq!(iterator(&s).unwrap().collect::<String>(), "hé");
        assert_eq!(iterator("xy").unwrap().count(), 2);
    }

    #[test]
    fn opaque_value_is_not_iterable() {
        assert_eq!(Opaque.capability(), Capability::None);
        let err = iterator(&Opaque).unwrap_err();
        assert_eq!(
            err,
            Error::NotIterable {
                value: "Opaque".to_string()
            }
        );
        assert_eq!(err.to_string(), "value is not iterable: Opaque");
    }
}
