use std::collections::{BTreeSet, HashSet};

use coflow::{
    ArrayLike, DynSequence, Error, Sequence, SinglePass, all, any, any_by, concat, filter, first,
    index_of, iterator, last, lazy_range, lazy_range_from, map, partition, range, range_from,
    range_map, sets_are_equal, zip,
};

// Something that is neither natively iterable nor indexed.
#[allow(dead_code)]
#[derive(Debug)]
struct Point {
    x: i32,
    y: i32,
}

impl Sequence for Point {
    type Item = i32;

    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

#[test]
fn ranges() {
    assert_eq!(range(5), vec![0, 1, 2, 3, 4]);
    assert_eq!(range_from(2, 2), Vec::<i64>::new());
    assert_eq!(range_map(0, 5, |v, _| v * v), vec![0, 1, 4, 9, 16]);

    let mut lazy = lazy_range_from(0, 5);
    let mut pulled = Vec::new();
    while let Some(v) = lazy.next() {
        pulled.push(v);
    }
    assert_eq!(pulled, range(5), "Lazy range should match the eager one");
    assert_eq!(lazy_range(-3).count(), 0);
}

#[test]
fn zip_shortest_wins() {
    let a = vec![1, 2, 3];
    let b = vec![4, 5];
    let seqs: [&DynSequence<'_, i32>; 2] = [&a, &b];
    let rows: Vec<_> = zip(&seqs).unwrap().collect();
    assert_eq!(rows, vec![vec![1, 4], vec![2, 5]]);
}

#[test]
fn index_of_cases() {
    assert_eq!(index_of(&vec![1.0, f64::NAN, 3.0], &f64::NAN), Ok(Some(1)));
    assert_eq!(index_of(&vec![1, 2, 3], &2), Ok(Some(1)));
    assert_eq!(index_of(&vec![1, 2, 3], &9), Ok(None));
}

#[test]
fn partition_by_parity() {
    let groups = partition(&vec![1, 2, 3, 4], |x| x % 2).unwrap();
    assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![1, 0]);
    assert_eq!(groups.get(&1), Some(&[1, 3][..]));
    assert_eq!(groups.get(&0), Some(&[2, 4][..]));
}

#[test]
fn vacuous_quantifiers() {
    let empty: Vec<bool> = Vec::new();
    assert_eq!(all(&empty), Ok(true));
    assert_eq!(any(&empty), Ok(false));
}

#[test]
fn set_equality_is_symmetric_and_reflexive() {
    let sets: Vec<HashSet<i32>> = vec![
        HashSet::new(),
        [1].into_iter().collect(),
        [1, 2].into_iter().collect(),
        [2, 1].into_iter().collect(),
        [1, 3].into_iter().collect(),
    ];
    for a in &sets {
        assert!(sets_are_equal(a, a));
        for b in &sets {
            assert_eq!(sets_are_equal(a, b), sets_are_equal(b, a));
        }
    }
    let ordered: BTreeSet<i32> = [2, 1].into_iter().collect();
    assert!(sets_are_equal(&sets[2], &ordered));
}

#[test]
fn not_iterable_names_the_value() {
    let p = Point { x: 1, y: 2 };
    let expected = Error::NotIterable {
        value: "Point { x: 1, y: 2 }".to_string(),
    };
    assert_eq!(iterator(&p).unwrap_err(), expected);
    assert_eq!(first(&p), Err(expected.clone()));
    assert_eq!(last(&p), Err(expected));
}

#[test]
fn combinators_compose() {
    let source = ArrayLike::new(10, |i| Some(i as i64));
    let evens = filter(&source, |x, _| x % 2 == 0).unwrap();
    let scaled = map(&evens, |x, i, _| x * 10 + i as i64).unwrap();
    let tail = vec![-1];
    let seqs: [&DynSequence<'_, i64>; 2] = [&scaled, &tail];
    let joined: Vec<_> = concat(&seqs).unwrap().collect();
    assert_eq!(joined, vec![0, 21, 42, 63, 84, -1]);
}

#[test]
fn search_over_combinator_output() {
    let words = vec!["apple", "", "cherry"];
    let lengths = map(&words, |w, _, _| w.len()).unwrap();
    assert_eq!(first(&lengths), Ok(Some(5)));
    assert_eq!(any_by(&lengths, |n| *n == 0), Ok(true));
    // Both calls above drew from the same single-pass cursor.
    assert_eq!(last(&lengths), Ok(Some(6)));
    assert_eq!(last(&lengths), Ok(None));
}

#[test]
fn single_pass_exhaustion_is_final() {
    let once = SinglePass::new(vec![1, 2].into_iter());
    assert_eq!(iterator(&once).unwrap().count(), 2);
    assert_eq!(first(&once), Ok(None));
    assert_eq!(all(&once), Ok(true));
}
