//! # Pair frequency tables
//!
//! For a sequence `s` of length `F` and a distance `d`, the pairs at distance `d`
//! are `(s[i], s[i + d])` for `i in 0..F - d`. [`PairFrequencyTable`] groups them
//! by value and keeps only counts, together with the two marginal count maps
//! (left symbols and right symbols over the same occurrences). That is all the
//! entropy terms need.
//!
//! [`PairPositions`] keeps the left-hand positions of every group as well. It is
//! the heavier structure and is not used when computing curves.
//!
//! Both borrow the symbols from the input slice, so building a table never clones
//! a token. Tables are meant to be built, consumed into
//! [`DistanceEntropies`], and dropped before the next distance.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hash};

use crate::entropy::{plugin_entropy, DistanceEntropies};

/// Hash map with fixed SipHash keys. Iteration order, and with it the order in
/// which entropy terms are summed, is identical for identical input, so curves
/// are bit-for-bit reproducible.
type CountMap<K, V> = HashMap<K, V, BuildHasherDefault<DefaultHasher>>;

/// Counts of `(x, y)` pairs at a fixed distance, plus their marginals.
#[derive(Debug, Clone)]
pub struct PairFrequencyTable<'a, T> {
    distance: usize,
    total: usize,
    joint: CountMap<(&'a T, &'a T), usize>,
    left: CountMap<&'a T, usize>,
    right: CountMap<&'a T, usize>,
}

impl<'a, T: Hash + Eq> PairFrequencyTable<'a, T> {
    /// Count every pair `(tokens[i], tokens[i + distance])`.
    ///
    /// If `distance >= tokens.len()` there are no valid pairs and the table is empty.
    /// `distance == 0` pairs each symbol with itself.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lagmi::PairFrequencyTable;
    ///
    /// let seq = ["a", "b", "a", "b", "a"];
    /// let table = PairFrequencyTable::build(&seq, 1);
    ///
    /// assert_eq!(table.total(), 4);
    /// assert_eq!(table.count(&"a", &"b"), 2);
    /// assert_eq!(table.count(&"b", &"a"), 2);
    /// assert_eq!(table.count(&"a", &"a"), 0);
    /// ```
    pub fn build(tokens: &'a [T], distance: usize) -> Self {
        let total = tokens.len().saturating_sub(distance);
        let mut joint = CountMap::default();
        let mut left = CountMap::default();
        let mut right = CountMap::default();

        for (x, y) in tokens.iter().zip(tokens.iter().skip(distance)) {
            *joint.entry((x, y)).or_insert(0) += 1;
            *left.entry(x).or_insert(0) += 1;
            *right.entry(y).or_insert(0) += 1;
        }

        Self {
            distance,
            total,
            joint,
            left,
            right,
        }
    }

    /// Number of occurrences of the pair `(x, y)`.
    pub fn count(&self, x: &T, y: &T) -> usize {
        self.joint.get(&(x, y)).copied().unwrap_or(0)
    }

    /// Group counts of the joint `(x, y)` distribution, in no particular order.
    pub fn joint_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.joint.values().copied()
    }

    /// Group counts of the left-hand marginal.
    pub fn left_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.left.values().copied()
    }

    /// Group counts of the right-hand marginal.
    pub fn right_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.right.values().copied()
    }

    /// The three plug-in entropies for this distance. All zero for an empty table.
    pub fn entropies(&self) -> DistanceEntropies {
        DistanceEntropies {
            h_x: plugin_entropy(self.left_counts()),
            h_y: plugin_entropy(self.right_counts()),
            h_xy: plugin_entropy(self.joint_counts()),
        }
    }
}

impl<T> PairFrequencyTable<'_, T> {
    /// The distance this table was built for.
    pub fn distance(&self) -> usize {
        self.distance
    }

    /// Number of pair occurrences, `len - distance` (or 0).
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct `(x, y)` pairs.
    pub fn len(&self) -> usize {
        self.joint.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Left-hand positions of every `(x, y)` pair at a fixed distance.
#[derive(Debug, Clone)]
pub struct PairPositions<'a, T> {
    distance: usize,
    groups: CountMap<(&'a T, &'a T), Vec<usize>>,
}

impl<'a, T: Hash + Eq> PairPositions<'a, T> {
    /// Group positions `i` by `(tokens[i], tokens[i + distance])`.
    ///
    /// Positions within a group are ascending.
    pub fn build(tokens: &'a [T], distance: usize) -> Self {
        let mut groups: CountMap<(&T, &T), Vec<usize>> = CountMap::default();
        for (i, (x, y)) in tokens
            .iter()
            .zip(tokens.iter().skip(distance))
            .enumerate()
        {
            groups.entry((x, y)).or_default().push(i);
        }
        Self { distance, groups }
    }

    /// Positions of `x` for which `(x, y)` occurs, or an empty slice.
    ///
    /// The query symbols must borrow for as long as the indexed sequence.
    pub fn positions(&self, x: &'a T, y: &'a T) -> &[usize] {
        self.groups
            .get(&(x, y))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Group sizes, i.e. the joint frequency counts.
    pub fn group_sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups.values().map(Vec::len)
    }

    /// Joint entropy H(X,Y) from the group sizes.
    pub fn joint_entropy(&self) -> f64 {
        plugin_entropy(self.group_sizes())
    }

    /// Iterate over `((x, y), positions)`.
    pub fn iter(&self) -> impl Iterator<Item = ((&'a T, &'a T), &[usize])> + '_ {
        self.groups.iter().map(|(&k, v)| (k, v.as_slice()))
    }
}

impl<T> PairPositions<'_, T> {
    pub fn distance(&self) -> usize {
        self.distance
    }

    /// Number of distinct `(x, y)` pairs.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn alternating_sequence_has_two_pairs() {
        let seq = ["A", "B", "A", "B", "A", "B", "A", "B"];
        let table = PairFrequencyTable::build(&seq, 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.total(), 7);
        assert_eq!(table.count(&"A", &"B"), 4);
        assert_eq!(table.count(&"B", &"A"), 3);
    }

    #[test]
    fn distance_at_or_past_length_is_empty() {
        let seq = [1u32, 2, 3];
        for d in [3, 4, 100] {
            let table = PairFrequencyTable::build(&seq, d);
            assert!(table.is_empty());
            assert_eq!(table.total(), 0);
            assert_eq!(table.len(), 0);
            assert_eq!(table.entropies(), DistanceEntropies::default());
        }
    }

    #[test]
    fn marginals_cover_the_right_ranges() {
        // Left symbols come from 0..F-d, right symbols from d..F.
        let seq = ['x', 'y', 'y', 'z'];
        let table = PairFrequencyTable::build(&seq, 2);
        let mut left: Vec<usize> = table.left_counts().collect();
        let mut right: Vec<usize> = table.right_counts().collect();
        left.sort_unstable();
        right.sort_unstable();
        // left: x, y ; right: y, z
        assert_eq!(left, vec![1, 1]);
        assert_eq!(right, vec![1, 1]);
        assert_eq!(table.count(&'x', &'y'), 1);
        assert_eq!(table.count(&'y', &'z'), 1);
    }

    #[test]
    fn positions_are_grouped_and_ascending() {
        let seq = ["a", "b", "a", "b", "a"];
        let idx = PairPositions::build(&seq, 1);
        assert_eq!(idx.positions(&"a", &"b"), &[0, 2]);
        assert_eq!(idx.positions(&"b", &"a"), &[1, 3]);
        assert!(idx.positions(&"b", &"b").is_empty());
        assert_eq!(idx.distance(), 1);
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn positions_agree_with_counts() {
        let seq: Vec<u8> = b"the quick brown fox jumps over the lazy dog".to_vec();
        let table = PairFrequencyTable::build(&seq, 3);
        let idx = PairPositions::build(&seq, 3);
        for ((x, y), positions) in idx.iter() {
            assert_eq!(table.count(x, y), positions.len());
        }
        assert!((idx.joint_entropy() - table.entropies().h_xy).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn counts_sum_to_number_of_positions(
            seq in prop::collection::vec(0u8..6, 1..300),
            d in 0usize..40,
        ) {
            let table = PairFrequencyTable::build(&seq, d);
            let expected = seq.len().saturating_sub(d);
            prop_assert_eq!(table.total(), expected);
            prop_assert_eq!(table.joint_counts().sum::<usize>(), expected);
            prop_assert_eq!(table.left_counts().sum::<usize>(), expected);
            prop_assert_eq!(table.right_counts().sum::<usize>(), expected);

            let idx = PairPositions::build(&seq, d);
            prop_assert_eq!(idx.group_sizes().sum::<usize>(), expected);
        }
    }
}
