// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena node storage with memoized geometry.

use alloc::vec::Vec;
use core::cell::{Cell, OnceCell};

use kurbo::{Point, Vec2};

use crate::types::{Caches, NodeId, PointId, Rectangle};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Kind {
    Leaf(PointId),
    Internal { left: NodeId, right: NodeId },
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: Kind,
    pub(crate) cell: Rectangle,
    pub(crate) bounds: OnceCell<Rectangle>,
    pub(crate) barycenter: OnceCell<Point>,
    pub(crate) size: OnceCell<usize>,
    pub(crate) points: OnceCell<Vec<PointId>>,
    pub(crate) force: Cell<Vec2>,
}

impl Node {
    pub(crate) fn new(parent: Option<NodeId>, kind: Kind, cell: Rectangle) -> Self {
        Self {
            parent,
            kind,
            cell,
            bounds: OnceCell::new(),
            barycenter: OnceCell::new(),
            size: OnceCell::new(),
            points: OnceCell::new(),
            force: Cell::new(Vec2::ZERO),
        }
    }

    pub(crate) fn clear(&mut self, caches: Caches) {
        if caches.contains(Caches::BOUNDS) {
            self.bounds.take();
        }
        if caches.contains(Caches::BARYCENTER) {
            self.barycenter.take();
        }
        if caches.contains(Caches::SIZE) {
            self.size.take();
        }
        if caches.contains(Caches::POINTS) {
            self.points.take();
        }
    }
}
