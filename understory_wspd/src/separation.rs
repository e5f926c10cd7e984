// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The separation predicate, on bare rectangles and on tree nodes.

use understory_split_tree::{NodeId, Rectangle, SplitTree};

use crate::decomposition::WellSeparatedPair;

/// Whether two point sets with bounding rectangles `a` and `b` are well separated at
/// factor `s`.
///
/// Each set is enclosed by the circle around its rectangle's center with half its
/// diagonal as radius. With `r` the larger of the two radii, the sets are well separated
/// when the centers are at least `(s + 2) * r` apart, which leaves a gap of at least
/// `s * r` between the circles.
///
/// The predicate is symmetric in `a` and `b` and monotone in `s`: a pair separated at
/// some `s` stays separated at every smaller `s`. Zero-size rectangles are separated
/// from each other at any finite `s`. `s` is not validated here.
pub fn is_well_separated(a: &Rectangle, b: &Rectangle, s: f64) -> bool {
    let radius = (0.5 * a.diagonal()).max(0.5 * b.diagonal());
    a.center().distance(b.center()) >= (s + 2.0) * radius
}

/// [`is_well_separated`] applied to the current bounding rectangles of two tree nodes.
pub fn is_well_separated_nodes<P>(tree: &SplitTree<P>, v: NodeId, w: NodeId, s: f64) -> bool {
    is_well_separated(&tree.bounding_rectangle(v), &tree.bounding_rectangle(w), s)
}

/// Whether every retained pair is still well separated at `s` in `tree`'s current
/// geometry.
///
/// This is the cheap staleness check for a decomposition kept across a point move:
/// refresh the tree's bounding rectangles first, then test against the same or a
/// tightened `s`. The pairs must come from a decomposition of this tree.
pub fn pairs_still_separated<P>(tree: &SplitTree<P>, pairs: &[WellSeparatedPair], s: f64) -> bool {
    pairs
        .iter()
        .all(|pair| is_well_separated_nodes(tree, pair.first, pair.second, s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rectangle {
        Rectangle::new(x, y, w, h).unwrap()
    }

    #[test]
    fn diagonal_corners_of_the_unit_square() {
        let a = Rectangle::point(Point::new(0.0, 0.0));
        let b = Rectangle::point(Point::new(1.0, 1.0));
        // Both radii are zero, so the requirement is distance >= 0.
        assert!(is_well_separated(&a, &b, 1.0), "points at s = 1");
        assert!(is_well_separated(&a, &b, 1.0e6), "points at any s");
    }

    #[test]
    fn unit_square_columns_are_not_separated_at_one() {
        // Columns x = 0 and x = 1, each spanning y in [0, 1]: radius 0.5, centers 1 apart.
        let left = rect(0.0, 0.0, 0.0, 1.0);
        let right = rect(1.0, 0.0, 0.0, 1.0);
        // (1 + 2) * 0.5 = 1.5 > 1.
        assert!(!is_well_separated(&left, &right, 1.0), "too close at s = 1");
        // Exactly at the boundary: (s + 2) * 0.5 = 1 when s = 0.
        assert!(
            is_well_separated(&left, &right, 0.0),
            "boundary is inclusive"
        );
    }

    #[test]
    fn symmetric_in_its_arguments() {
        let cases = [
            (rect(0.0, 0.0, 2.0, 1.0), rect(5.0, 5.0, 0.5, 0.5)),
            (rect(-3.0, 1.0, 0.0, 4.0), rect(2.0, -2.0, 1.0, 1.0)),
            (rect(0.0, 0.0, 1.0, 1.0), rect(0.5, 0.5, 1.0, 1.0)),
        ];
        for (a, b) in cases {
            for s in [0.1, 0.5, 1.0, 2.0, 8.0] {
                assert_eq!(is_well_separated(&a, &b, s), is_well_separated(&b, &a, s));
            }
        }
    }

    #[test]
    fn monotone_in_separation() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(6.0, 0.0, 2.0, 2.0);
        let factors = [0.25, 0.5, 1.0, 1.5, 2.0, 3.0, 4.0, 6.0];
        for (i, &s2) in factors.iter().enumerate() {
            if is_well_separated(&a, &b, s2) {
                for &s1 in &factors[..i] {
                    assert!(
                        is_well_separated(&a, &b, s1),
                        "separated at {s2} but not at {s1}"
                    );
                }
            }
        }
        assert!(is_well_separated(&a, &b, 0.25), "far enough at s = 0.25");
        assert!(!is_well_separated(&a, &b, 6.0), "too close at s = 6");
    }
}
