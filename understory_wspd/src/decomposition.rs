// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pair enumeration over a split tree.

use alloc::vec::Vec;
use core::fmt::Debug;

use log::debug;
use understory_split_tree::{NodeId, PointId, SplitTree};

use crate::error::{Error, Result};
use crate::separation::is_well_separated;

/// Two disjoint nodes of one tree whose point sets are well separated.
///
/// The pair is unordered; `first` and `second` only record the order the pair was
/// found in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WellSeparatedPair {
    /// One side of the pair.
    pub first: NodeId,
    /// The other side of the pair.
    pub second: NodeId,
}

impl WellSeparatedPair {
    /// Both nodes as a tuple.
    pub const fn nodes(self) -> (NodeId, NodeId) {
        (self.first, self.second)
    }
}

/// A well-separated pair decomposition of a [`SplitTree`].
///
/// Expanding every pair into the cross product of its two point sets yields each
/// unordered pair of distinct input points exactly once.
///
/// The decomposition borrows its tree, so it cannot outlive it and the tree cannot be
/// moved through [`SplitTree::set_position`] while it exists. Force accumulators use
/// interior mutability and stay writable. Pairs kept past a move (via
/// [`into_pairs`](Self::into_pairs)) can be re-checked with
/// [`pairs_still_separated`](crate::pairs_still_separated).
pub struct Wspd<'a, P> {
    tree: &'a SplitTree<P>,
    separation: f64,
    pairs: Vec<WellSeparatedPair>,
    tests: usize,
}

impl<P: Debug> Debug for Wspd<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Wspd")
            .field("separation", &self.separation)
            .field("pairs", &self.pairs.len())
            .field("tests", &self.tests)
            .finish_non_exhaustive()
    }
}

impl<'a, P> Wspd<'a, P> {
    /// Decompose `tree` at separation factor `separation`.
    ///
    /// For every internal node the two children are matched against each other. A
    /// match that is not yet well separated is refined by splitting the side whose
    /// bounding rectangle has the longer longer side (the second side on a tie).
    /// Runs in O(s²n) for a fixed factor `s`.
    ///
    /// Reads the tree's bounding rectangles, filling them if needed; refresh them
    /// after moving points. Fails with [`Error::InvalidSeparation`] unless
    /// `separation` is finite and positive.
    pub fn build(tree: &'a SplitTree<P>, separation: f64) -> Result<Self> {
        if !(separation.is_finite() && separation > 0.0) {
            return Err(Error::InvalidSeparation(separation));
        }
        let mut pairs = Vec::new();
        let mut tests = 0_usize;
        let mut work: Vec<(NodeId, NodeId)> = Vec::new();
        for u in tree.node_ids() {
            let Some(children) = tree.children(u) else {
                continue;
            };
            work.push(children);
            while let Some((v, w)) = work.pop() {
                tests += 1;
                let a = tree.bounding_rectangle(v);
                let b = tree.bounding_rectangle(w);
                if is_well_separated(&a, &b, separation) {
                    pairs.push(WellSeparatedPair {
                        first: v,
                        second: w,
                    });
                    continue;
                }
                // Pushed right first so the left child is matched first.
                if a.longer_side() <= b.longer_side() {
                    if let Some((l, r)) = tree.children(w) {
                        work.push((v, r));
                        work.push((v, l));
                        continue;
                    }
                } else if let Some((l, r)) = tree.children(v) {
                    work.push((r, w));
                    work.push((l, w));
                    continue;
                }
                // Two leaves always separate; this only guards a non-finite geometry.
                pairs.push(WellSeparatedPair {
                    first: v,
                    second: w,
                });
            }
        }
        debug!(
            "wspd over {} points at s = {separation}: {} pairs after {tests} separation tests",
            tree.point_count(),
            pairs.len()
        );
        Ok(Self {
            tree,
            separation,
            pairs,
            tests,
        })
    }

    /// The separation factor this decomposition was built with.
    pub fn separation(&self) -> f64 {
        self.separation
    }

    /// The tree this decomposition refers to.
    pub fn tree(&self) -> &'a SplitTree<P> {
        self.tree
    }

    /// All pairs, in discovery order.
    pub fn pairs(&self) -> &[WellSeparatedPair] {
        &self.pairs
    }

    /// Iterate over the pairs.
    pub fn iter(&self) -> core::slice::Iter<'_, WellSeparatedPair> {
        self.pairs.iter()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// `true` for a tree with a single point.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of separation tests performed during construction.
    pub fn tests(&self) -> usize {
        self.tests
    }

    /// Release the tree borrow, keeping only the pairs.
    pub fn into_pairs(self) -> Vec<WellSeparatedPair> {
        self.pairs
    }

    /// Number of point pairs represented, the sum of `size(first) * size(second)`.
    ///
    /// Always `n * (n - 1) / 2` for a tree over `n` points.
    pub fn interaction_count(&self) -> usize {
        self.pairs
            .iter()
            .map(|p| self.tree.subtree_size(p.first) * self.tree.subtree_size(p.second))
            .sum()
    }

    /// Every represented pair of points, grouped by the node pair that represents it.
    pub fn leaf_pairs(&self) -> impl Iterator<Item = (PointId, PointId)> + '_ {
        let tree = self.tree;
        self.pairs.iter().flat_map(move |pair| {
            let second = tree.subtree_point_ids(pair.second);
            tree.subtree_point_ids(pair.first)
                .iter()
                .flat_map(move |&a| second.iter().map(move |&b| (a, b)))
        })
    }
}

impl<'w, P> IntoIterator for &'w Wspd<'_, P> {
    type Item = &'w WellSeparatedPair;
    type IntoIter = core::slice::Iter<'w, WellSeparatedPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::separation::{is_well_separated_nodes, pairs_still_separated};
    use alloc::vec;
    use kurbo::Point;

    struct Rng(u64);

    impl Rng {
        fn next_f64(&mut self) -> f64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            ((x >> 11) as f64) / ((1_u64 << 53) as f64)
        }
    }

    fn random_tree(n: usize, seed: u64) -> SplitTree<usize> {
        let mut rng = Rng(seed);
        let points: Vec<_> = (0..n)
            .map(|i| (i, Point::new(rng.next_f64() * 50.0, rng.next_f64() * 50.0)))
            .collect();
        SplitTree::build(points).unwrap()
    }

    fn square() -> SplitTree<&'static str> {
        SplitTree::build([
            ("a", Point::new(0.0, 0.0)),
            ("b", Point::new(1.0, 0.0)),
            ("c", Point::new(0.0, 1.0)),
            ("d", Point::new(1.0, 1.0)),
        ])
        .unwrap()
    }

    /// Each unordered pair of distinct points exactly once.
    fn assert_partition<P>(wspd: &Wspd<'_, P>) {
        let n = wspd.tree().point_count();
        let mut seen = vec![0_u32; n * n];
        for (a, b) in wspd.leaf_pairs() {
            assert_ne!(a, b, "a point is never paired with itself");
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            seen[lo.index() * n + hi.index()] += 1;
        }
        for i in 0..n {
            for j in 0..n {
                let expected = u32::from(i < j);
                assert_eq!(seen[i * n + j], expected, "pair ({i}, {j})");
            }
        }
    }

    #[test]
    fn rejects_invalid_separation() {
        let tree = square();
        for s in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Wspd::build(&tree, s).unwrap_err();
            assert!(matches!(err, Error::InvalidSeparation(_)), "s = {s}");
        }
        assert!(
            Wspd::build(&tree, 1.0e-9).is_ok(),
            "tiny positive factors are valid"
        );
    }

    #[test]
    fn single_point_has_no_pairs() {
        let tree = SplitTree::build([((), Point::new(2.0, 3.0))]).unwrap();
        let wspd = Wspd::build(&tree, 1.0).unwrap();
        assert!(wspd.is_empty(), "a single leaf has no pairs");
        assert_eq!(wspd.len(), 0);
        assert_eq!(wspd.interaction_count(), 0);
        assert_eq!(wspd.leaf_pairs().count(), 0);
    }

    #[test]
    fn unit_square_at_one() {
        let tree = square();
        let wspd = Wspd::build(&tree, 1.0).unwrap();
        assert_eq!(wspd.separation(), 1.0);

        // The two columns have radius 0.5 and centers 1 apart: 1 < (1 + 2) * 0.5.
        let (left, right) = tree.children(tree.root()).unwrap();
        assert!(
            !is_well_separated_nodes(&tree, left, right, 1.0),
            "columns are too close"
        );

        // So the decomposition bottoms out at single points: all six pairs are leaves.
        assert_eq!(wspd.len(), 6);
        assert!(
            wspd.iter()
                .all(|p| tree.is_leaf(p.first) && tree.is_leaf(p.second)),
            "expected only point pairs, got {:?}",
            wspd.pairs()
        );
        assert_partition(&wspd);

        // Diagonal (0,0)-(1,1): radius 0, distance sqrt(2); sqrt(2) >= 3 * 0.
        let p0 = tree.leaf(tree.point_id(0).unwrap());
        let p3 = tree.leaf(tree.point_id(3).unwrap());
        let expected = Point::new(0.0, 0.0).distance(Point::new(1.0, 1.0)) >= (1.0 + 2.0) * 0.0;
        assert_eq!(is_well_separated_nodes(&tree, p0, p3, 1.0), expected);
        assert!(expected, "coincident radii make any two points separated");
        let diagonal = WellSeparatedPair {
            first: p0,
            second: p3,
        };
        let swapped = WellSeparatedPair {
            first: p3,
            second: p0,
        };
        assert!(
            wspd.pairs().contains(&diagonal) || wspd.pairs().contains(&swapped),
            "diagonal pair missing"
        );
    }

    #[test]
    fn small_point_sets_partition_exactly() {
        for n in 2..=12 {
            for seed in [1_u64, 7, 0xDEAD_BEEF] {
                let tree = random_tree(n, seed.wrapping_mul(n as u64 + 1));
                for s in [0.5, 1.0, 2.0, 4.0] {
                    let wspd = Wspd::build(&tree, s).unwrap();
                    assert_partition(&wspd);
                    assert_eq!(wspd.interaction_count(), n * (n - 1) / 2);
                }
            }
        }
    }

    #[test]
    fn every_emitted_pair_is_separated() {
        let tree = random_tree(300, 42);
        for s in [0.5, 1.0, 3.0] {
            let wspd = Wspd::build(&tree, s).unwrap();
            for pair in &wspd {
                assert!(
                    is_well_separated_nodes(&tree, pair.first, pair.second, s),
                    "{pair:?} at s = {s}"
                );
            }
            assert!(pairs_still_separated(&tree, wspd.pairs(), s), "s = {s}");
        }
    }

    #[test]
    fn pair_count_grows_linearly() {
        // For a fixed s the pair count is O(n); C(n, 2) would quadruple per doubling.
        let counts: Vec<usize> = [250_usize, 500, 1000]
            .iter()
            .map(|&n| {
                let tree = random_tree(n, 9);
                Wspd::build(&tree, 1.0).unwrap().len()
            })
            .collect();
        for w in counts.windows(2) {
            let ratio = w[1] as f64 / w[0] as f64;
            assert!(ratio < 3.0, "pair counts {counts:?}");
        }
    }

    #[test]
    fn identical_points_pair_up_without_nan() {
        let tree = SplitTree::build((0..5).map(|i| (i, Point::new(4.0, 4.0)))).unwrap();
        let wspd = Wspd::build(&tree, 2.0).unwrap();
        assert_partition(&wspd);
        for pair in &wspd {
            let a = tree.bounding_rectangle(pair.first);
            let b = tree.bounding_rectangle(pair.second);
            assert_eq!(a.diagonal(), 0.0);
            assert!(a.center().distance(b.center()).is_finite(), "{pair:?}");
        }
    }

    #[test]
    fn forces_stay_writable_while_borrowed() {
        let tree = square();
        let wspd = Wspd::build(&tree, 1.0).unwrap();
        for pair in &wspd {
            tree.add_force(pair.first, kurbo::Vec2::new(1.0, 0.0));
            tree.add_force(pair.second, kurbo::Vec2::new(-1.0, 0.0));
        }
        let total = tree
            .leaf_forces()
            .into_iter()
            .fold(kurbo::Vec2::ZERO, |acc, f| acc + f);
        assert_eq!(total, kurbo::Vec2::ZERO);
    }

    #[test]
    fn retained_pairs_detect_a_move_across_clusters() {
        let a = [(0.0, 0.0), (0.1, 0.0), (0.0, 0.1), (0.1, 0.1)];
        let b = [(10.0, 0.0), (10.1, 0.0), (10.0, 0.1), (10.1, 0.1)];
        let points = a
            .iter()
            .chain(&b)
            .enumerate()
            .map(|(i, &(x, y))| (i, Point::new(x, y)));
        let mut tree = SplitTree::build(points).unwrap();
        let pairs = Wspd::build(&tree, 1.0).unwrap().into_pairs();
        let (left, right) = tree.children(tree.root()).unwrap();
        assert!(
            pairs.contains(&WellSeparatedPair {
                first: left,
                second: right,
            }),
            "the two clusters form one pair"
        );

        // A small jitter keeps every pair separated.
        let p0 = tree.point_id(0).unwrap();
        tree.set_position(p0, Point::new(0.005, 0.005)).unwrap();
        tree.recompute_all_bounding_rectangles();
        assert!(
            pairs_still_separated(&tree, &pairs, 1.0),
            "jitter keeps pairs"
        );

        // Moving a point of the first cluster into the second breaks the root pair.
        tree.set_position(p0, Point::new(10.05, 0.05)).unwrap();
        assert!(
            pairs_still_separated(&tree, &pairs, 1.0),
            "cached rectangles are stale until recomputed"
        );
        tree.recompute_all_bounding_rectangles();
        assert!(
            !pairs_still_separated(&tree, &pairs, 1.0),
            "merged clusters are no longer separated"
        );
    }
}
