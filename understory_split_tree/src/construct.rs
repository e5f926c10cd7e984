// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fair split tree construction.
//!
//! Each task builds a *partial* split tree for one point subset of size `n`: the
//! subset's trunk repeatedly sheds the part of its points lying on one side of the
//! midpoint of its longer bounding-box side, until at most `n / 2` points remain.
//! Every shed piece, and the final trunk, becomes a new task. The two-sided scan
//! stops as soon as either side is exhausted, so locating a piece costs time
//! proportional to the piece, and all pieces and the final trunk have at most `n / 2`
//! points. Together with the O(n) working copy per task this gives O(n log n).

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Point;
use log::trace;

use crate::node::{Kind, Node};
use crate::sorted::{PieceLists, SortedLists, Subset, TRUNK, slot};
use crate::types::{Axis, BuildStats, NodeId, PointId, Rectangle};

/// Output of [`build`].
#[derive(Debug)]
pub(crate) struct Built {
    pub(crate) nodes: Vec<Node>,
    pub(crate) stats: BuildStats,
}

/// A subset waiting for its partial split tree, rooted at an already allocated node.
#[derive(Debug)]
struct Task {
    node: NodeId,
    subset: Subset,
    cell: Rectangle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Side {
    Lower,
    Upper,
}

/// A run of the trunk's `axis` list, from `first` to `last` ascending, to shed.
#[derive(Copy, Clone, Debug)]
struct Carve {
    axis: Axis,
    at: f64,
    side: Side,
    first: u32,
    last: u32,
}

#[derive(Debug)]
struct Builder {
    lists: SortedLists,
    nodes: Vec<Node>,
    stats: BuildStats,
}

/// Build the node arena for `positions`. Returns `None` for an empty input.
///
/// Nodes are allocated parent-before-child, with the root at index 0.
pub(crate) fn build(positions: &[Point]) -> Option<Built> {
    let (lists, all) = SortedLists::new(positions)?;
    let bounds = lists.bounds(&all);
    let side = bounds.longer_side();
    // Enclosing square anchored at the minimum corner; it never has to grow.
    let root_cell = Rectangle::from_extents(
        bounds.x(),
        bounds.y(),
        (bounds.x() + side).max(bounds.max(Axis::X)),
        (bounds.y() + side).max(bounds.max(Axis::Y)),
    );

    let mut builder = Builder {
        lists,
        nodes: Vec::with_capacity(2 * positions.len() - 1),
        stats: BuildStats::default(),
    };
    let root = builder.alloc(None, root_cell);
    let mut tasks = vec![Task {
        node: root,
        subset: all,
        cell: root_cell,
    }];
    while let Some(task) = tasks.pop() {
        if task.subset.len() == 1 {
            let rec = task.subset.run(Axis::X).head;
            builder.nodes[task.node.index()].kind = Kind::Leaf(PointId(rec));
        } else {
            builder.partial(task, &mut tasks);
        }
    }

    Some(Built {
        nodes: builder.nodes,
        stats: builder.stats,
    })
}

impl Builder {
    /// Allocate a node whose kind is filled in when its task runs.
    fn alloc(&mut self, parent: Option<NodeId>, cell: Rectangle) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(parent, Kind::Leaf(PointId(TRUNK)), cell));
        id
    }

    fn partial(&mut self, task: Task, tasks: &mut Vec<Task>) {
        let n = task.subset.len();
        // Working copy of both orders; carved pieces are relinked from it afterwards.
        let order_x: Vec<u32> = self.lists.iter(&task.subset, Axis::X).collect();
        let order_y: Vec<u32> = self.lists.iter(&task.subset, Axis::Y).collect();
        self.stats.copied += 2 * n;
        for &rec in &order_x {
            self.lists.set_owner(rec, TRUNK);
        }

        let mut carved: Vec<(NodeId, Rectangle)> = Vec::new();
        let mut trunk = task.subset;
        let mut trunk_node = task.node;
        let mut trunk_cell = task.cell;

        while 2 * trunk.len() > n {
            let carve = self.locate(&trunk);
            let (lower_cell, upper_cell) = trunk_cell.split_at(carve.axis, carve.at);
            let lower = self.alloc(Some(trunk_node), lower_cell);
            let upper = self.alloc(Some(trunk_node), upper_cell);
            self.nodes[trunk_node.index()].kind = Kind::Internal {
                left: lower,
                right: upper,
            };
            let (piece_node, piece_cell, next_node, next_cell) = match carve.side {
                Side::Lower => (lower, lower_cell, upper, upper_cell),
                Side::Upper => (upper, upper_cell, lower, lower_cell),
            };

            let piece = slot(carved.len());
            carved.push((piece_node, piece_cell));
            let before = trunk.len();
            let mut rec = carve.first;
            loop {
                let next = self.lists.next(carve.axis, rec);
                self.lists.set_owner(rec, piece);
                self.lists.unlink(rec, &mut trunk);
                self.stats.relinks += 1;
                match next {
                    Some(following) if rec != carve.last => rec = following,
                    _ => break,
                }
            }
            self.stats.peels += 1;
            trace!(
                "peeled {} of {} points on the {:?} side of {:?} = {}",
                before - trunk.len(),
                before,
                carve.side,
                carve.axis,
                carve.at
            );

            trunk_node = next_node;
            trunk_cell = next_cell;
        }

        let mut pieces = vec![PieceLists::default(); carved.len()];
        self.lists.distribute(Axis::X, &order_x, &mut pieces);
        self.lists.distribute(Axis::Y, &order_y, &mut pieces);

        tasks.push(Task {
            node: trunk_node,
            subset: trunk,
            cell: trunk_cell,
        });
        for ((node, cell), piece) in carved.into_iter().zip(pieces) {
            if let Some(subset) = piece.finish() {
                tasks.push(Task { node, subset, cell });
            }
        }
    }

    /// Find the next run to shed from `trunk` (which holds at least two points).
    fn locate(&mut self, trunk: &Subset) -> Carve {
        let bounds = self.lists.bounds(trunk);
        if bounds.longer_side() <= 0.0 {
            return self.split_by_count(trunk, bounds);
        }
        // A degenerate axis has zero extent and never wins the longer side.
        let axis = bounds.longer_axis();
        let at = bounds.min(axis) + 0.5 * bounds.extent(axis);
        let run = trunk.run(axis);
        let (mut lo, mut hi) = (run.head, run.tail);
        loop {
            self.stats.scan_steps += 1;
            match self.lists.next(axis, lo) {
                Some(n) if self.lists.coord(axis, n) <= at => lo = n,
                _ => {
                    return Carve {
                        axis,
                        at,
                        side: Side::Lower,
                        first: run.head,
                        last: lo,
                    };
                }
            }
            match self.lists.prev(axis, hi) {
                Some(p) if self.lists.coord(axis, p) > at => hi = p,
                _ => {
                    return Carve {
                        axis,
                        at,
                        side: Side::Upper,
                        first: hi,
                        last: run.tail,
                    };
                }
            }
        }
    }

    /// All points of `trunk` coincide: shed the first half of the x list, which
    /// keeps input order among equal coordinates.
    fn split_by_count(&mut self, trunk: &Subset, bounds: Rectangle) -> Carve {
        self.stats.fallback_splits += 1;
        let run = trunk.run(Axis::X);
        let count = trunk.len() / 2;
        let mut last = run.head;
        for _ in 1..count {
            self.stats.scan_steps += 1;
            if let Some(n) = self.lists.next(Axis::X, last) {
                last = n;
            }
        }
        trace!(
            "all {} remaining points coincide at {:?}; splitting off the first {count}",
            trunk.len(),
            bounds.center()
        );
        Carve {
            axis: Axis::X,
            at: bounds.x(),
            side: Side::Lower,
            first: run.head,
            last,
        }
    }
}
