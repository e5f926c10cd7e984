// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_split_tree --heading-base-level=0

//! Understory Split Tree: a fair split tree over labeled 2D points.
//!
//! A split tree recursively splits the bounding box of a point set across the midpoint
//! of its longer side until every leaf holds one point. It is the hierarchy under a
//! well-separated pair decomposition (see `understory_wspd`), which lets force-directed
//! layouts approximate all pairwise repulsion in near-linear time.
//!
//! - Build once in O(n log n) from `(payload, position)` pairs with [`SplitTree::build`].
//! - Query per-node geometry lazily: [`SplitTree::bounding_rectangle`],
//!   [`SplitTree::barycenter`], [`SplitTree::subtree_size`], [`SplitTree::subtree_points`].
//! - Accumulate one repulsive force per node with [`SplitTree::add_force`], then push the
//!   totals down to points with [`SplitTree::leaf_forces`].
//!
//! Cached geometry is never refreshed implicitly. After moving points, call
//! [`SplitTree::recompute_all_bounding_rectangles`] and
//! [`SplitTree::recompute_all_barycenters`] (or [`SplitTree::invalidate`]) before reading it.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Point, Vec2};
//! use understory_split_tree::SplitTree;
//!
//! let tree = SplitTree::build([
//!     ("a", Point::new(0.0, 0.0)),
//!     ("b", Point::new(1.0, 0.0)),
//!     ("c", Point::new(0.0, 1.0)),
//!     ("d", Point::new(1.0, 1.0)),
//! ])
//! .unwrap();
//!
//! let root = tree.root();
//! assert_eq!(tree.subtree_size(root), 4);
//! assert_eq!(tree.barycenter(root), Point::new(0.5, 0.5));
//!
//! // Forces recorded on an inner node reach every point below it.
//! let (left, _right) = tree.children(root).unwrap();
//! tree.add_force(left, Vec2::new(-1.0, 0.0));
//! let forces = tree.leaf_forces();
//! assert_eq!(forces[0], Vec2::new(-1.0, 0.0));
//! assert_eq!(tree.payload(tree.point_id(0).unwrap()), "a");
//! ```
//!
//! ### Float semantics
//!
//! Input coordinates must be finite; [`SplitTree::build`] rejects NaN and infinities.
//! Coincident points are fine and produce zero-size rectangles.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod construct;
mod error;
mod node;
mod sorted;
mod tree;
mod types;

pub use error::{Error, Result};
pub use tree::SplitTree;
pub use types::{Axis, BuildStats, Caches, NodeId, PointId, Rectangle};
