// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Split tree basics.
//!
//! Build a tree over a few labeled points, walk it, move a point, and refresh geometry.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p understory_demos --example split_tree_basics`

use kurbo::Point;
use understory_split_tree::{Caches, NodeId, SplitTree};

fn print_subtree(tree: &SplitTree<&str>, root: NodeId) {
    let mut stack = vec![(root, 0_usize)];
    while let Some((node, depth)) = stack.pop() {
        let indent = "  ".repeat(depth);
        let bounds = tree.bounding_rectangle(node);
        match tree.point(node) {
            Some(p) => println!(
                "{indent}{:?} leaf {} at {:?}",
                node,
                tree.payload(p),
                tree.position(p)
            ),
            None => println!(
                "{indent}{:?} {} points, bounds {:?}, barycenter {:?}",
                node,
                tree.subtree_size(node),
                bounds.to_rect(),
                tree.barycenter(node)
            ),
        }
        if let Some((left, right)) = tree.children(node) {
            stack.push((right, depth + 1));
            stack.push((left, depth + 1));
        }
    }
}

fn main() {
    env_logger::init();

    let mut tree = SplitTree::build([
        ("north", Point::new(0.0, 10.0)),
        ("south", Point::new(0.0, -10.0)),
        ("east", Point::new(10.0, 0.0)),
        ("west", Point::new(-10.0, 0.0)),
        ("center", Point::new(0.5, 0.5)),
        ("near-center", Point::new(1.0, 0.8)),
    ])
    .unwrap();
    println!(
        "{} points, {} nodes, depth {}, {:?}",
        tree.point_count(),
        tree.node_count(),
        tree.depth(),
        tree.stats()
    );
    print_subtree(&tree, tree.root());

    // Moving a point leaves the cached geometry alone until it is recomputed.
    let east = tree.point_id(2).unwrap();
    tree.set_position(east, Point::new(30.0, 0.0)).unwrap();
    let stale = tree.bounding_rectangle(tree.root());
    tree.invalidate(Caches::GEOMETRY);
    let fresh = tree.bounding_rectangle(tree.root());
    println!(
        "root bounds before refresh {:?}, after {:?}",
        stale.to_rect(),
        fresh.to_rect()
    );
    assert!(
        fresh.contains(Point::new(30.0, 0.0)),
        "refreshed bounds cover the moved point"
    );
}
