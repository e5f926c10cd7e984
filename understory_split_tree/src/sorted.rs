// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-sorted, cross-linked point records used while building a split tree.
//!
//! Every input point owns one record slot. The slot carries a doubly linked
//! position in the x-sorted list and another in the y-sorted list, so the record's
//! counterpart in the other axis is the same slot and either list can drop it in O(1).
//! Each slot also remembers which carved piece it was last assigned to.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Point;

use crate::types::{Axis, Rectangle};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct Link {
    prev: Option<u32>,
    next: Option<u32>,
}

/// First and last record of one non-empty axis list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Run {
    pub(crate) head: u32,
    pub(crate) tail: u32,
}

/// A point subset, held as one sorted list per axis.
///
/// Both lists are standalone: the head has no predecessor and the tail no successor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Subset {
    runs: [Run; 2],
    len: usize,
}

impl Subset {
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn run(&self, axis: Axis) -> Run {
        self.runs[axis.index()]
    }
}

/// Piece marker for records that stay in the trunk.
pub(crate) const TRUNK: u32 = u32::MAX;

/// Record storage shared by all subsets during one construction.
#[derive(Debug)]
pub(crate) struct SortedLists {
    coords: [Vec<f64>; 2],
    links: [Vec<Link>; 2],
    owner: Vec<u32>,
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Record slots mirror 32-bit point ids."
)]
pub(crate) const fn slot(i: usize) -> u32 {
    i as u32
}

impl SortedLists {
    /// Sort `positions` along both axes and link every record into the full subset.
    ///
    /// Equal coordinates keep input order. Returns `None` for an empty input.
    pub(crate) fn new(positions: &[Point]) -> Option<(Self, Subset)> {
        if positions.is_empty() {
            return None;
        }
        let n = positions.len();
        let coords = [
            positions.iter().map(|p| p.x).collect::<Vec<_>>(),
            positions.iter().map(|p| p.y).collect::<Vec<_>>(),
        ];
        let mut lists = Self {
            coords,
            links: [vec![Link::default(); n], vec![Link::default(); n]],
            owner: vec![TRUNK; n],
        };
        let mut runs = [Run { head: 0, tail: 0 }; 2];
        for axis in Axis::BOTH {
            let a = axis.index();
            let mut order: Vec<u32> = (0..n).map(slot).collect();
            // Stable sort: ties keep input order.
            order.sort_by(|&i, &j| {
                let ci = lists.coords[a][i as usize];
                let cj = lists.coords[a][j as usize];
                ci.total_cmp(&cj)
            });
            runs[a] = lists.link_in_order(axis, &order);
        }
        Some((lists, Subset { runs, len: n }))
    }

    /// Link `order` into one standalone list along `axis`. `order` must be non-empty.
    fn link_in_order(&mut self, axis: Axis, order: &[u32]) -> Run {
        let a = axis.index();
        let mut prev = None;
        for &rec in order {
            self.links[a][rec as usize] = Link { prev, next: None };
            if let Some(p) = prev {
                self.links[a][p as usize].next = Some(rec);
            }
            prev = Some(rec);
        }
        Run {
            head: order[0],
            tail: order[order.len() - 1],
        }
    }

    pub(crate) fn coord(&self, axis: Axis, rec: u32) -> f64 {
        self.coords[axis.index()][rec as usize]
    }

    pub(crate) fn next(&self, axis: Axis, rec: u32) -> Option<u32> {
        self.links[axis.index()][rec as usize].next
    }

    pub(crate) fn prev(&self, axis: Axis, rec: u32) -> Option<u32> {
        self.links[axis.index()][rec as usize].prev
    }

    pub(crate) fn owner(&self, rec: u32) -> u32 {
        self.owner[rec as usize]
    }

    pub(crate) fn set_owner(&mut self, rec: u32, piece: u32) {
        self.owner[rec as usize] = piece;
    }

    /// Tight bounding box of `subset`, read off the list ends.
    pub(crate) fn bounds(&self, subset: &Subset) -> Rectangle {
        let x = subset.run(Axis::X);
        let y = subset.run(Axis::Y);
        Rectangle::from_extents(
            self.coord(Axis::X, x.head),
            self.coord(Axis::Y, y.head),
            self.coord(Axis::X, x.tail),
            self.coord(Axis::Y, y.tail),
        )
    }

    /// Iterate `subset` along `axis`, ascending from the front and descending from the back.
    pub(crate) fn iter(&self, subset: &Subset, axis: Axis) -> Iter<'_> {
        let run = subset.run(axis);
        Iter {
            lists: self,
            axis,
            front: run.head,
            back: run.tail,
            remaining: subset.len,
        }
    }

    /// Drop `rec` from both axis lists of `subset`.
    pub(crate) fn unlink(&mut self, rec: u32, subset: &mut Subset) {
        debug_assert!(subset.len > 1, "a subset never drops its last record");
        for axis in Axis::BOTH {
            let a = axis.index();
            let Link { prev, next } = self.links[a][rec as usize];
            match prev {
                Some(p) => self.links[a][p as usize].next = next,
                None => {
                    if let Some(n) = next {
                        subset.runs[a].head = n;
                    }
                }
            }
            match next {
                Some(n) => self.links[a][n as usize].prev = prev,
                None => {
                    if let Some(p) = prev {
                        subset.runs[a].tail = p;
                    }
                }
            }
            self.links[a][rec as usize] = Link::default();
        }
        subset.len -= 1;
    }

    /// Relink every record of `order` whose owner is a carved piece into that piece's lists.
    ///
    /// `order` is the working copy of one axis, ascending; appending in that order keeps
    /// each piece sorted. Trunk records are skipped.
    pub(crate) fn distribute(&mut self, axis: Axis, order: &[u32], pieces: &mut [PieceLists]) {
        let a = axis.index();
        for &rec in order {
            let owner = self.owner(rec);
            if owner == TRUNK {
                continue;
            }
            let piece = &mut pieces[owner as usize];
            let ends = &mut piece.ends[a];
            match *ends {
                None => {
                    self.links[a][rec as usize] = Link::default();
                    *ends = Some(Run {
                        head: rec,
                        tail: rec,
                    });
                }
                Some(ref mut run) => {
                    self.links[a][run.tail as usize].next = Some(rec);
                    self.links[a][rec as usize] = Link {
                        prev: Some(run.tail),
                        next: None,
                    };
                    run.tail = rec;
                }
            }
            if axis == Axis::X {
                piece.len += 1;
            }
        }
    }
}

/// Accumulates the lists of one carved piece during [`SortedLists::distribute`].
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct PieceLists {
    ends: [Option<Run>; 2],
    len: usize,
}

impl PieceLists {
    /// The finished subset, or `None` if no record was distributed to it.
    pub(crate) fn finish(self) -> Option<Subset> {
        match self.ends {
            [Some(x), Some(y)] if self.len > 0 => Some(Subset {
                runs: [x, y],
                len: self.len,
            }),
            _ => None,
        }
    }
}

/// Double-ended walk over one axis list of a subset.
#[derive(Debug)]
pub(crate) struct Iter<'a> {
    lists: &'a SortedLists,
    axis: Axis,
    front: u32,
    back: u32,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        let rec = self.front;
        self.remaining -= 1;
        if let Some(n) = self.lists.next(self.axis, rec) {
            self.front = n;
        }
        Some(rec)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        let rec = self.back;
        self.remaining -= 1;
        if let Some(p) = self.lists.prev(self.axis, rec) {
            self.back = p;
        }
        Some(rec)
    }
}

impl ExactSizeIterator for Iter<'_> {}
