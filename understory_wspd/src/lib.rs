// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_wspd --heading-base-level=0

//! Understory WSPD: well-separated pair decompositions over a split tree.
//!
//! Two point sets are *well separated* at factor `s` when their enclosing circles are at
//! least `s` times the larger radius apart. A decomposition is a list of node pairs of an
//! [`understory_split_tree::SplitTree`] such that every pair of distinct points is
//! represented by exactly one node pair, and every node pair is well separated. For a
//! fixed `s` there are O(s²n) pairs, so one force per pair approximates all O(n²)
//! pairwise interactions.
//!
//! - [`Wspd::build`] enumerates the pairs.
//! - [`is_well_separated`] is the predicate on bare rectangles; [`is_well_separated_nodes`]
//!   applies it to tree nodes.
//! - [`pairs_still_separated`] re-checks pairs retained across a point move.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Point;
//! use understory_split_tree::SplitTree;
//! use understory_wspd::Wspd;
//!
//! let tree = SplitTree::build([
//!     (0, Point::new(0.0, 0.0)),
//!     (1, Point::new(1.0, 0.0)),
//!     (2, Point::new(0.0, 1.0)),
//!     (3, Point::new(1.0, 1.0)),
//! ])
//! .unwrap();
//! let wspd = Wspd::build(&tree, 1.0).unwrap();
//! assert_eq!(wspd.interaction_count(), 6);
//!
//! // One repulsive push per pair, applied with opposite signs.
//! for pair in &wspd {
//!     let d = tree.barycenter(pair.first) - tree.barycenter(pair.second);
//!     let push = d / d.hypot2();
//!     tree.add_force(pair.first, push * tree.subtree_size(pair.second) as f64);
//!     tree.add_force(pair.second, -push * tree.subtree_size(pair.first) as f64);
//! }
//! let forces = tree.leaf_forces();
//! assert!(forces[0].x < 0.0 && forces[0].y < 0.0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod decomposition;
mod error;
mod separation;

pub use decomposition::{WellSeparatedPair, Wspd};
pub use error::{Error, Result};
pub use separation::{is_well_separated, is_well_separated_nodes, pairs_still_separated};
