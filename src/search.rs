//! Consumers of sequences: quantifiers, element extraction, index search,
//! grouping and set equality.
//!
//! Infallible callbacks are plain closures. The `try_*` variants accept
//! callbacks returning `Result<_, E>` and hand the first callback error back
//! unchanged; `E` only needs a `From<Error>` conversion so that a
//! non-iterable input can be reported through the same channel.

use std::{
    collections::{BTreeSet, HashSet},
    hash::{BuildHasher, Hash},
};

use crate::{
    adapter::{Sequence, iterator},
    error::{Error, Result},
    grouping::GroupingMap,
};

/// Identity-as-boolean conversion used by [`all`] and [`any`].
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

macro_rules! truthy_int {
    ($($t:ty),*) => {
        $(impl Truthy for $t {
            fn is_truthy(&self) -> bool {
                *self != 0
            }
        })*
    };
}

truthy_int!(i8, u8, i16, u16, i32, u32, i64, u64, i128, u128, isize, usize);

impl Truthy for f32 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for char {
    fn is_truthy(&self) -> bool {
        true
    }
}

impl Truthy for &str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::is_truthy)
    }
}

impl<T> Truthy for Vec<T> {
    fn is_truthy(&self) -> bool {
        true
    }
}

/// Equality used by [`index_of`], with an explicit not-a-number test.
///
/// Not-a-number never equals itself under `PartialEq`, so searching for it
/// matches any candidate that is also not-a-number instead.
pub trait Searchable: PartialEq {
    fn is_nan_value(&self) -> bool {
        false
    }
}

impl Searchable for f32 {
    fn is_nan_value(&self) -> bool {
        self.is_nan()
    }
}

impl Searchable for f64 {
    fn is_nan_value(&self) -> bool {
        self.is_nan()
    }
}

macro_rules! searchable {
    ($($t:ty),*) => {
        $(impl Searchable for $t {})*
    };
}

searchable!(
    bool, char, i8, u8, i16, u16, i32, u32, i64, u64, i128, u128, isize, usize, String, &str
);

impl<T: Searchable> Searchable for Option<T> {
    fn is_nan_value(&self) -> bool {
        self.as_ref().is_some_and(Searchable::is_nan_value)
    }
}

impl<T: PartialEq> Searchable for Vec<T> {}

/// Returns `true` when every element is truthy. Empty sequences yield `true`.
pub fn all<S>(seq: &S) -> Result<bool>
where
    S: Sequence + ?Sized,
    S::Item: Truthy,
{
    all_by(seq, Truthy::is_truthy)
}

/// Returns `true` when `predicate` holds for every element, stopping at the
/// first element that fails it.
pub fn all_by<S, P>(seq: &S, mut predicate: P) -> Result<bool>
where
    S: Sequence + ?Sized,
    P: FnMut(&S::Item) -> bool,
{
    Ok(iterator(seq)?.all(|item| predicate(&item)))
}

/// Like [`all_by`], with a fallible predicate whose first error is returned.
pub fn try_all_by<S, E, P>(seq: &S, mut predicate: P) -> std::result::Result<bool, E>
where
    S: Sequence + ?Sized,
    P: FnMut(&S::Item) -> std::result::Result<bool, E>,
    E: From<Error>,
{
    for item in iterator(seq)? {
        if !predicate(&item)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Returns `true` when some element is truthy. Empty sequences yield `false`.
pub fn any<S>(seq: &S) -> Result<bool>
where
    S: Sequence + ?Sized,
    S::Item: Truthy,
{
    any_by(seq, Truthy::is_truthy)
}

/// Returns `true` as soon as `predicate` holds for an element.
pub fn any_by<S, P>(seq: &S, mut predicate: P) -> Result<bool>
where
    S: Sequence + ?Sized,
    P: FnMut(&S::Item) -> bool,
{
    Ok(iterator(seq)?.any(|item| predicate(&item)))
}

/// Like [`any_by`], with a fallible predicate whose first error is returned.
pub fn try_any_by<S, E, P>(seq: &S, mut predicate: P) -> std::result::Result<bool, E>
where
    S: Sequence + ?Sized,
    P: FnMut(&S::Item) -> std::result::Result<bool, E>,
    E: From<Error>,
{
    for item in iterator(seq)? {
        if predicate(&item)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Returns the first element without consuming the rest of the sequence.
///
/// `Ok(None)` means the sequence is empty.
pub fn first<S: Sequence + ?Sized>(seq: &S) -> Result<Option<S::Item>> {
    Ok(iterator(seq)?.next())
}

/// Returns the last element.
///
/// Array-like values are read at their final index directly. Other sequences
/// are drained to the end.
pub fn last<S: Sequence + ?Sized>(seq: &S) -> Result<Option<S::Item>> {
    if let Some(len) = seq.length() {
        return Ok(len.checked_sub(1).and_then(|i| seq.at(i)));
    }
    Ok(iterator(seq)?.last())
}

/// Returns the position of the first element equal to `item`.
///
/// A not-a-number `item` matches the first not-a-number element. Slice-backed
/// sequences are searched in place.
pub fn index_of<S>(seq: &S, item: &S::Item) -> Result<Option<usize>>
where
    S: Sequence + ?Sized,
    S::Item: Searchable,
{
    if item.is_nan_value() {
        return Ok(iterator(seq)?.position(|candidate| candidate.is_nan_value()));
    }
    if let Some(slice) = seq.as_slice() {
        return Ok(slice.iter().position(|candidate| candidate == item));
    }
    Ok(iterator(seq)?.position(|candidate| &candidate == item))
}

/// Returns the position of the first element for which `equals(element, item)`
/// holds.
pub fn index_of_by<S, F>(seq: &S, item: &S::Item, mut equals: F) -> Result<Option<usize>>
where
    S: Sequence + ?Sized,
    F: FnMut(&S::Item, &S::Item) -> bool,
{
    Ok(iterator(seq)?.position(|candidate| equals(&candidate, item)))
}

/// Like [`index_of_by`], with a fallible equality function whose first error is
/// returned.
pub fn try_index_of_by<S, E, F>(
    seq: &S,
    item: &S::Item,
    mut equals: F,
) -> std::result::Result<Option<usize>, E>
where
    S: Sequence + ?Sized,
    F: FnMut(&S::Item, &S::Item) -> std::result::Result<bool, E>,
    E: From<Error>,
{
    for (position, candidate) in iterator(seq)?.enumerate() {
        if equals(&candidate, item)? {
            return Ok(Some(position));
        }
    }
    Ok(None)
}

/// Groups the elements of `seq` by `key_fn` in a single forward pass.
///
/// ```
/// let groups = coflow::partition(&vec![1, 2, 3, 4], |x| x % 2).unwrap();
/// assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![1, 0]);
/// assert_eq!(groups.get(&1), Some(&[1, 3][..]));
/// ```
pub fn partition<S, K, F>(seq: &S, mut key_fn: F) -> Result<GroupingMap<K, S::Item>>
where
    S: Sequence + ?Sized,
    K: Eq + Hash + Clone,
    F: FnMut(&S::Item) -> K,
{
    let mut groups = GroupingMap::new();
    for item in iterator(seq)? {
        groups.push(key_fn(&item), item);
    }
    Ok(groups)
}

/// Like [`partition`], with a fallible key function whose first error is
/// returned.
pub fn try_partition<S, K, E, F>(
    seq: &S,
    mut key_fn: F,
) -> std::result::Result<GroupingMap<K, S::Item>, E>
where
    S: Sequence + ?Sized,
    K: Eq + Hash + Clone,
    F: FnMut(&S::Item) -> std::result::Result<K, E>,
    E: From<Error>,
{
    let mut groups = GroupingMap::new();
    for item in iterator(seq)? {
        groups.push(key_fn(&item)?, item);
    }
    Ok(groups)
}

/// Membership view over a set, used by [`sets_are_equal`].
pub trait SetLike<T> {
    fn size(&self) -> usize;

    fn has(&self, value: &T) -> bool;

    fn members(&self) -> Box<dyn Iterator<Item = &T> + '_>;
}

impl<T: Eq + Hash, H: BuildHasher> SetLike<T> for HashSet<T, H> {
    fn size(&self) -> usize {
        self.len()
    }

    fn has(&self, value: &T) -> bool {
        self.contains(value)
    }

    fn members(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.iter())
    }
}

impl<T: Ord> SetLike<T> for BTreeSet<T> {
    fn size(&self) -> usize {
        self.len()
    }

    fn has(&self, value: &T) -> bool {
        self.contains(value)
    }

    fn members(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.iter())
    }
}

/// Returns `true` when both sets hold the same members, in any order.
pub fn sets_are_equal<T, A, B>(a: &A, b: &B) -> bool
where
    A: SetLike<T> + ?Sized,
    B: SetLike<T> + ?Sized,
{
    if std::ptr::addr_eq(a, b) {
        return true;
    }
    a.size() == b.size() && a.members().all(|member| b.has(member))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArrayLike, SinglePass};

    struct Opaque;

    impl Sequence for Opaque {
        type Item = i32;
    }

    #[derive(Debug, PartialEq)]
    enum KeyError {
        NotIterable,
        Negative(i32),
    }

    impl From<Error> for KeyError {
        fn from(_: Error) -> Self {
            KeyError::NotIterable
        }
    }

    #[test]
    fn quantifiers_on_empty() {
        let empty: Vec<i32> = Vec::new();
        assert_eq!(all(&empty), Ok(true));
        assert_eq!(any(&empty), Ok(false));
        assert_eq!(all_by(&empty, |_| false), Ok(true));
        assert_eq!(any_by(&empty, |_| true), Ok(false));
    }

    #[test]
    fn quantifiers_use_truthiness() {
        assert_eq!(all(&vec![1, 2, 3]), Ok(true));
        assert_eq!(all(&vec![1, 0, 3]), Ok(false));
        assert_eq!(any(&vec![0.0, f64::NAN]), Ok(false));
        assert_eq!(any(&vec![None, Some(""), Some("x")]), Ok(true));
    }

    #[test]
    fn quantifiers_short_circuit() {
        let mut visited = 0;
        assert_eq!(
            all_by(&vec![1, -1, 2, 3], |x| {
                visited += 1;
                *x > 0
            }),
            Ok(false)
        );
        assert_eq!(visited, 2);

        let once = SinglePass::new(1..10);
        assert_eq!(any_by(&once, |x| *x == 3), Ok(true));
        assert_eq!(first(&once), Ok(Some(4)));
    }

    #[test]
    fn try_quantifiers_return_callback_error() {
        let v = vec![1, -2, 3];
        let check = |x: &i32| if *x < 0 { Err(KeyError::Negative(*x)) } else { Ok(true) };
        assert_eq!(try_all_by(&v, check), Err(KeyError::Negative(-2)));
        assert_eq!(try_any_by(&v, |x| Ok::<_, KeyError>(*x == 1)), Ok(true));
        assert_eq!(try_all_by(&Opaque, check), Err(KeyError::NotIterable));
    }

    #[test]
    fn first_and_last() {
        assert_eq!(first(&vec![4, 5, 6]), Ok(Some(4)));
        assert_eq!(last(&vec![4, 5, 6]), Ok(Some(6)));
        assert_eq!(first(&Vec::<u8>::new()), Ok(None));
        assert_eq!(last(&Vec::<u8>::new()), Ok(None));
        assert_eq!(first(&vec![None::<u8>]), Ok(Some(None)));
    }

    #[test]
    fn last_reads_final_index_directly() {
        let reads = std::cell::RefCell::new(Vec::new());
        let tracked = ArrayLike::new(100, |i| {
            reads.borrow_mut().push(i);
            Some(i)
        });
        assert_eq!(last(&tracked), Ok(Some(99)));
        assert_eq!(*reads.borrow(), vec![99]);
    }

    #[test]
    fn last_drains_single_pass() {
        let once = SinglePass::new("abc".chars());
        assert_eq!(last(&once), Ok(Some('c')));
        assert_eq!(last(&once), Ok(None));
    }

    #[test]
    fn extraction_rejects_non_iterables() {
        assert!(matches!(first(&Opaque), Err(Error::NotIterable { .. })));
        assert!(matches!(last(&Opaque), Err(Error::NotIterable { .. })));
    }

    #[test]
    fn index_of_modes() {
        assert_eq!(index_of(&vec![1.0, f64::NAN, 3.0], &f64::NAN), Ok(Some(1)));
        assert_eq!(index_of(&vec![1, 2, 3], &2), Ok(Some(1)));
        assert_eq!(index_of(&vec![1, 2, 3], &9), Ok(None));
        assert_eq!(
            index_of(&SinglePass::new(["a", "b"].into_iter()), &"b"),
            Ok(Some(1))
        );
        let words = vec!["Alpha".to_string(), "beta".to_string()];
        assert_eq!(
            index_of_by(&words, &"BETA".to_string(), |a, b| a.eq_ignore_ascii_case(b)),
            Ok(Some(1))
        );
    }

    #[test]
    fn try_index_of_by_returns_callback_error() {
        let mut compared = 0;
        let r = try_index_of_by(&vec![4, -3, 7], &7, |a, b| {
            compared += 1;
            if *a < 0 { Err(KeyError::Negative(*a)) } else { Ok(a == b) }
        });
        assert_eq!(r, Err(KeyError::Negative(-3)));
        assert_eq!(compared, 2);
        assert_eq!(try_index_of_by(&vec![4, 7], &7, |a, b| Ok::<_, KeyError>(a == b)), Ok(Some(1)));
        assert_eq!(try_index_of_by(&vec![4], &7, |a, b| Ok::<_, KeyError>(a == b)), Ok(None));
        assert_eq!(
            try_index_of_by(&Opaque, &1, |a, b| Ok::<_, KeyError>(a == b)),
            Err(KeyError::NotIterable)
        );
    }

    #[test]
    fn partition_keeps_first_occurrence_order() {
        let groups = partition(&vec![1, 2, 3, 4], |x| x % 2).unwrap();
        let pairs: Vec<_> = groups.into_iter().collect();
        assert_eq!(pairs, vec![(1, vec![1, 3]), (0, vec![2, 4])]);
        assert!(partition(&Vec::<i32>::new(), |x| *x).unwrap().is_empty());
    }

    #[test]
    fn try_partition_stops_on_error() {
        let r = try_partition(&vec![3, -1, 4], |x| {
            if *x < 0 { Err(KeyError::Negative(*x)) } else { Ok(*x > 3) }
        });
        assert_eq!(r.unwrap_err(), KeyError::Negative(-1));
    }

    #[test]
    fn set_equality() {
        let a: HashSet<_> = [1, 2, 3].into_iter().collect();
        let b: HashSet<_> = [3, 1, 2].into_iter().collect();
        let c: BTreeSet<_> = [1, 2].into_iter().collect();
        assert!(sets_are_equal(&a, &a));
        assert!(sets_are_equal(&a, &b));
        assert!(sets_are_equal(&b, &a));
        assert!(!sets_are_equal(&a, &c));
        assert!(!sets_are_equal(&c, &a));
    }
}
