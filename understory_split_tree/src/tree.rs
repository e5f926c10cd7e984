// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The split tree: construction entry point, shape walk, cached queries, force accumulators.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::{Point, Vec2};
use log::debug;

use crate::construct;
use crate::error::{Error, Result};
use crate::node::{Kind, Node};
use crate::types::{BuildStats, Caches, NodeId, PointId, Rectangle};

/// A fair split tree over a fixed set of labeled points.
///
/// Leaves are in bijection with the input points; every internal node has exactly two
/// children. Derived node geometry (bounding rectangle, barycenter, size, point set) is
/// computed on first access and memoized.
///
/// ## Staleness
///
/// Moving points with [`set_position`](Self::set_position) or
/// [`update_positions`](Self::update_positions) does not touch any cache. Call
/// [`recompute_all_bounding_rectangles`](Self::recompute_all_bounding_rectangles) and
/// [`recompute_all_barycenters`](Self::recompute_all_barycenters) (or
/// [`invalidate`](Self::invalidate)) before reading geometry again. The tree shape is
/// never rebuilt; build a new tree when the configuration has changed enough.
///
/// Node ids are only valid for the tree that produced them; passing a foreign id may
/// panic or return another node's data.
pub struct SplitTree<P> {
    payloads: Vec<P>,
    positions: Vec<Point>,
    nodes: Vec<Node>,
    leaves: Vec<NodeId>,
    stats: BuildStats,
}

impl<P: Debug> Debug for SplitTree<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SplitTree")
            .field("points", &self.positions.len())
            .field("nodes", &self.nodes.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<P: Copy + Debug> SplitTree<P> {
    /// Build a split tree over `points`, each a caller payload and a position.
    ///
    /// Runs in O(n log n). Fails with [`Error::EmptyPointSet`] for an empty input and
    /// with [`Error::NonFiniteCoordinate`] if any coordinate is NaN or infinite.
    /// Coincident points are accepted.
    pub fn build(points: impl IntoIterator<Item = (P, Point)>) -> Result<Self> {
        let (payloads, positions): (Vec<P>, Vec<Point>) = points.into_iter().unzip();
        if let Some(index) = positions.iter().position(|p| !is_finite(*p)) {
            return Err(Error::NonFiniteCoordinate { index });
        }
        let construct::Built { nodes, stats } =
            construct::build(&positions).ok_or(Error::EmptyPointSet)?;

        let mut leaves = vec![NodeId::new(0); positions.len()];
        for (i, node) in nodes.iter().enumerate() {
            if let Kind::Leaf(p) = node.kind {
                leaves[p.index()] = NodeId::new(i);
            }
        }
        debug!(
            "built split tree over {} points: {} nodes, {} peels, {} fallback splits, {} work",
            positions.len(),
            nodes.len(),
            stats.peels,
            stats.fallback_splits,
            stats.total_work()
        );
        Ok(Self {
            payloads,
            positions,
            nodes,
            leaves,
            stats,
        })
    }
}

impl<P> SplitTree<P> {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// The root node.
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of input points (the root's subtree size).
    pub fn point_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of nodes, `2 * point_count() - 1`.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All node ids, parents before children.
    pub fn node_ids(
        &self,
    ) -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator + use<P> {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// The two children of an internal node, or `None` for a leaf.
    pub fn children(&self, node: NodeId) -> Option<(NodeId, NodeId)> {
        match self.node(node).kind {
            Kind::Internal { left, right } => Some((left, right)),
            Kind::Leaf(_) => None,
        }
    }

    /// The parent node, or `None` for the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// Whether `node` is a leaf.
    pub fn is_leaf(&self, node: NodeId) -> bool {
        matches!(self.node(node).kind, Kind::Leaf(_))
    }

    /// The point represented by a leaf, or `None` for an internal node.
    pub fn point(&self, node: NodeId) -> Option<PointId> {
        match self.node(node).kind {
            Kind::Leaf(p) => Some(p),
            Kind::Internal { .. } => None,
        }
    }

    /// The id of the `index`-th input point, if there is one.
    pub fn point_id(&self, index: usize) -> Option<PointId> {
        (index < self.positions.len()).then_some(PointId::new(index))
    }

    /// The leaf representing `point`.
    pub fn leaf(&self, point: PointId) -> NodeId {
        self.leaves[point.index()]
    }

    /// Current position of `point`.
    pub fn position(&self, point: PointId) -> Point {
        self.positions[point.index()]
    }

    /// All points in input order with their payloads and current positions.
    pub fn points(&self) -> impl ExactSizeIterator<Item = (PointId, &P, Point)> + '_ {
        self.payloads
            .iter()
            .zip(&self.positions)
            .enumerate()
            .map(|(i, (payload, pos))| (PointId::new(i), payload, *pos))
    }

    /// Construction counters for this tree.
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// The construction cell of `node`.
    ///
    /// The root's cell is the enclosing square of the input; each split halves a cell at
    /// the split coordinate. Cells are fixed at construction and contain every point the
    /// node held at that time.
    pub fn cell(&self, node: NodeId) -> Rectangle {
        self.node(node).cell
    }

    /// Length of the longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        let mut depth = vec![0_usize; self.nodes.len()];
        let mut deepest = 0;
        for (i, node) in self.nodes.iter().enumerate().skip(1) {
            let d = node.parent.map_or(0, |p| depth[p.index()] + 1);
            depth[i] = d;
            deepest = deepest.max(d);
        }
        deepest
    }

    /// Move `point` to `pos` without touching any cache.
    pub fn set_position(&mut self, point: PointId, pos: Point) -> Result<()> {
        let index = point.index();
        let slot = self
            .positions
            .get_mut(index)
            .ok_or(Error::UnknownPoint { index })?;
        if !is_finite(pos) {
            return Err(Error::NonFiniteCoordinate { index });
        }
        *slot = pos;
        Ok(())
    }

    /// Replace every position with `f(id, payload, old_position)`, without touching any cache.
    ///
    /// Positions are validated before any is written; on error nothing changes.
    pub fn update_positions(
        &mut self,
        mut f: impl FnMut(PointId, &P, Point) -> Point,
    ) -> Result<()> {
        let moved: Vec<Point> = self
            .payloads
            .iter()
            .zip(&self.positions)
            .enumerate()
            .map(|(i, (payload, pos))| f(PointId::new(i), payload, *pos))
            .collect();
        if let Some(index) = moved.iter().position(|p| !is_finite(*p)) {
            return Err(Error::NonFiniteCoordinate { index });
        }
        self.positions = moved;
        Ok(())
    }

    /// Clear the selected memoized fields on every node. They recompute lazily.
    pub fn invalidate(&mut self, caches: Caches) {
        for node in &mut self.nodes {
            node.clear(caches);
        }
    }

    /// Visit the not-yet-cached part of `start`'s subtree in post-order.
    fn fill_post_order(
        &self,
        start: NodeId,
        cached: impl Fn(&Node) -> bool,
        mut fill: impl FnMut(NodeId),
    ) {
        let mut stack = vec![(start, false)];
        while let Some((id, expanded)) = stack.pop() {
            let node = self.node(id);
            if cached(node) {
                continue;
            }
            match node.kind {
                Kind::Internal { left, right } if !expanded => {
                    stack.push((id, true));
                    stack.push((right, false));
                    stack.push((left, false));
                }
                _ => fill(id),
            }
        }
    }

    /// Tight bounding rectangle of the points below `node`.
    ///
    /// A leaf's rectangle has zero size at its point.
    pub fn bounding_rectangle(&self, node: NodeId) -> Rectangle {
        if let Some(bounds) = self.node(node).bounds.get() {
            return *bounds;
        }
        let compute = |id: NodeId| match self.node(id).kind {
            Kind::Leaf(p) => Rectangle::point(self.position(p)),
            Kind::Internal { left, right } => self
                .bounding_rectangle(left)
                .union(&self.bounding_rectangle(right)),
        };
        self.fill_post_order(
            node,
            |n| n.bounds.get().is_some(),
            |id| {
                self.node(id).bounds.get_or_init(|| compute(id));
            },
        );
        *self.node(node).bounds.get_or_init(|| compute(node))
    }

    /// Number of points below `node`.
    pub fn subtree_size(&self, node: NodeId) -> usize {
        if let Some(size) = self.node(node).size.get() {
            return *size;
        }
        let compute = |id: NodeId| match self.node(id).kind {
            Kind::Leaf(_) => 1,
            Kind::Internal { left, right } => self.subtree_size(left) + self.subtree_size(right),
        };
        self.fill_post_order(
            node,
            |n| n.size.get().is_some(),
            |id| {
                self.node(id).size.get_or_init(|| compute(id));
            },
        );
        *self.node(node).size.get_or_init(|| compute(node))
    }

    /// Size-weighted mean position of the points below `node`.
    pub fn barycenter(&self, node: NodeId) -> Point {
        if let Some(center) = self.node(node).barycenter.get() {
            return *center;
        }
        let compute = |id: NodeId| match self.node(id).kind {
            Kind::Leaf(p) => self.position(p),
            Kind::Internal { left, right } => {
                let weighted = |child: NodeId| {
                    self.barycenter(child).to_vec2() * self.subtree_size(child) as f64
                };
                let total = (weighted(left) + weighted(right)) / self.subtree_size(id) as f64;
                total.to_point()
            }
        };
        self.fill_post_order(
            node,
            |n| n.barycenter.get().is_some(),
            |id| {
                self.node(id).barycenter.get_or_init(|| compute(id));
            },
        );
        *self.node(node).barycenter.get_or_init(|| compute(node))
    }

    /// Ids of the points below `node`, in left-to-right leaf order.
    pub fn subtree_point_ids(&self, node: NodeId) -> &[PointId] {
        if let Some(points) = self.node(node).points.get() {
            return points;
        }
        let compute = |id: NodeId| match self.node(id).kind {
            Kind::Leaf(p) => vec![p],
            Kind::Internal { left, right } => {
                let (l, r) = (self.subtree_point_ids(left), self.subtree_point_ids(right));
                let mut all = Vec::with_capacity(l.len() + r.len());
                all.extend_from_slice(l);
                all.extend_from_slice(r);
                all
            }
        };
        self.fill_post_order(
            node,
            |n| n.points.get().is_some(),
            |id| {
                self.node(id).points.get_or_init(|| compute(id));
            },
        );
        self.node(node).points.get_or_init(|| compute(node))
    }

    /// Current positions of the points below `node`.
    pub fn subtree_points(&self, node: NodeId) -> impl ExactSizeIterator<Item = Point> + '_ {
        self.subtree_point_ids(node)
            .iter()
            .map(|&p| self.position(p))
    }

    /// Drop every cached bounding rectangle and recompute all of them. O(n).
    pub fn recompute_all_bounding_rectangles(&mut self) {
        self.invalidate(Caches::BOUNDS);
        // Children have larger ids, so a reverse sweep sees them first.
        for id in self.node_ids().rev() {
            self.bounding_rectangle(id);
        }
    }

    /// Drop every cached barycenter and recompute all of them. O(n).
    pub fn recompute_all_barycenters(&mut self) {
        self.invalidate(Caches::BARYCENTER);
        for id in self.node_ids().rev() {
            self.barycenter(id);
        }
    }

    /// Add `delta` to the repulsive-force accumulator of `node`.
    pub fn add_force(&self, node: NodeId, delta: Vec2) {
        let cell = &self.node(node).force;
        cell.set(cell.get() + delta);
    }

    /// The accumulated repulsive force of `node`.
    pub fn force(&self, node: NodeId) -> Vec2 {
        self.node(node).force.get()
    }

    /// Zero the accumulator of `node`.
    pub fn reset_force(&self, node: NodeId) {
        self.node(node).force.set(Vec2::ZERO);
    }

    /// Zero every accumulator. O(n).
    pub fn reset_all_forces(&self) {
        for node in &self.nodes {
            node.force.set(Vec2::ZERO);
        }
    }

    /// Per point, in [`PointId`] order: the sum of the accumulators on its leaf and on all
    /// of the leaf's ancestors. O(n).
    ///
    /// This pushes forces recorded on internal nodes down to the points; applying them is
    /// up to the caller.
    pub fn leaf_forces(&self) -> Vec<Vec2> {
        let mut inherited = vec![Vec2::ZERO; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            let above = node.parent.map_or(Vec2::ZERO, |p| inherited[p.index()]);
            inherited[i] = above + node.force.get();
        }
        self.leaves.iter().map(|leaf| inherited[leaf.index()]).collect()
    }
}

impl<P: Copy> SplitTree<P> {
    /// Caller payload of `point`.
    pub fn payload(&self, point: PointId) -> P {
        self.payloads[point.index()]
    }
}

fn is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
