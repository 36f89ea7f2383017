use std::{collections::HashMap, hash::Hash};

/// Groups of values keyed by `K`, in first-occurrence order.
///
/// Keys iterate in the order they were first seen, and each group keeps its
/// members in insertion order. A `GroupingMap` never holds an empty group.
/// Built by [`partition`](crate::partition).
#[derive(Clone, Debug)]
pub struct GroupingMap<K, T> {
    index: HashMap<K, usize>,
    groups: Vec<(K, Vec<T>)>,
}

impl<K: Eq + Hash + Clone, T> GroupingMap<K, T> {
    pub(crate) fn new() -> Self {
        Self {
            index: HashMap::with_capacity(8),
            groups: Vec::with_capacity(8),
        }
    }

    pub(crate) fn push(&mut self, key: K, item: T) {
        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].1.push(item),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![item]));
            }
        }
    }

    /// Returns the members grouped under `key`.
    pub fn get(&self, key: &K) -> Option<&[T]> {
        self.index
            .get(key)
            .map(|&slot| self.groups[slot].1.as_slice())
    }

    /// Returns `true` if some member was grouped under `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Keys in first-occurrence order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.groups.iter().map(|(k, _)| k)
    }

    /// `(key, members)` pairs in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[T])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

impl<K, T> IntoIterator for GroupingMap<K, T> {
    type Item = (K, Vec<T>);
    type IntoIter = std::vec::IntoIter<(K, Vec<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<K: PartialEq, T: PartialEq> PartialEq for GroupingMap<K, T> {
    // Order-sensitive: two maps are equal only if their groups appeared in the
    // same order.
    fn eq(&self, other: &Self) -> bool {
        self.groups == other.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_first_occurrence() {
        let mut groups = GroupingMap::new();
        for (k, v) in [("b", 1), ("a", 2), ("b", 3), ("c", 4), ("a", 5)] {
            groups.push(k, v);
        }
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(groups.get(&"a"), Some(&[2, 5][..]));
        assert_eq!(groups.get(&"z"), None);
        assert!(groups.contains_key(&"c"));
        assert!(!groups.contains_key(&"z"));
        assert!(groups.iter().all(|(_, members)| !members.is_empty()));
        assert_eq!(groups.len(), 3);
    }
}
