// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Approximate repulsion with a well-separated pair decomposition.
//!
//! Spreads a tight random cloud with one force per node pair instead of one per point
//! pair, pushes the node forces down to the points, and rebuilds the tree only when the
//! retained pairs stop being separated.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example wspd_repulsion`

use kurbo::{Point, Vec2};
use log::info;
use understory_split_tree::SplitTree;
use understory_wspd::{WellSeparatedPair, Wspd, pairs_still_separated};

const SEPARATION: f64 = 1.0;
/// Looser factor for the staleness check, so small moves do not force a rebuild.
const RECHECK: f64 = 0.5;
const STEP: f64 = 0.05;
const ROUNDS: usize = 20;

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

/// One repulsion pass: `1 / d` falloff between the barycenters, weighted by the
/// number of points on the other side.
fn repulsion(tree: &SplitTree<usize>, pairs: &[WellSeparatedPair]) -> Vec<Vec2> {
    tree.reset_all_forces();
    for pair in pairs {
        let d = tree.barycenter(pair.first) - tree.barycenter(pair.second);
        let push = d / d.hypot2().max(1e-9);
        tree.add_force(pair.first, push * tree.subtree_size(pair.second) as f64);
        tree.add_force(pair.second, -push * tree.subtree_size(pair.first) as f64);
    }
    tree.leaf_forces()
}

/// Exact `O(n²)` reference for the same force law.
fn exact_repulsion(positions: &[Point]) -> Vec<Vec2> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            positions
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &q)| {
                    let d = p - q;
                    d / d.hypot2().max(1e-9)
                })
                .fold(Vec2::ZERO, |acc, f| acc + f)
        })
        .collect()
}

fn decompose(tree: &SplitTree<usize>) -> Vec<WellSeparatedPair> {
    let wspd = Wspd::build(tree, SEPARATION).unwrap();
    info!(
        "{} pairs stand in for {} point pairs",
        wspd.len(),
        wspd.interaction_count()
    );
    wspd.into_pairs()
}

fn main() {
    env_logger::init();

    let mut rng = Rng(0x5EED_1234_ABCD_0001);
    let cloud: Vec<_> = (0..400)
        .map(|i| (i, Point::new(rng.next_f64() * 10.0, rng.next_f64() * 10.0)))
        .collect();
    let mut tree = SplitTree::build(cloud).unwrap();
    let mut pairs = decompose(&tree);
    let mut builds = 1;

    for round in 0..ROUNDS {
        // The pairs were found for this tree; they only go stale as its points move.
        if !pairs_still_separated(&tree, &pairs, RECHECK) {
            let points: Vec<_> = tree.points().map(|(_, &i, p)| (i, p)).collect();
            tree = SplitTree::build(points).unwrap();
            pairs = decompose(&tree);
            builds += 1;
            info!("round {round}: rebuilt the tree");
        }
        let forces = repulsion(&tree, &pairs);

        if round == 0 {
            let positions: Vec<_> = tree.points().map(|(_, _, p)| p).collect();
            let worst = forces
                .iter()
                .zip(exact_repulsion(&positions))
                .map(|(a, e)| (*a - e).hypot() / e.hypot().max(1e-9))
                .fold(0.0, f64::max);
            info!("worst relative error against the exact sum: {worst:.3}");
        }

        tree.update_positions(|id, _, p| p + forces[id.index()] * STEP)
            .unwrap();
        tree.recompute_all_bounding_rectangles();
        tree.recompute_all_barycenters();
    }

    let bounds = tree.bounding_rectangle(tree.root());
    println!(
        "spread to {:.1} x {:.1} after {ROUNDS} rounds with {builds} tree builds",
        bounds.width(),
        bounds.height()
    );
}
