// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public value types: axes, rectangles, handles, cache selectors, and build counters.

use kurbo::{Point, Rect, Vec2};

use crate::error::{Error, Result};

/// A coordinate axis of the plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The horizontal axis.
    X,
    /// The vertical axis.
    Y,
}

impl Axis {
    /// Both axes, `X` first.
    pub const BOTH: [Self; 2] = [Self::X, Self::Y];

    /// The perpendicular axis.
    pub const fn other(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    /// The coordinate of `p` along this axis.
    pub const fn coord(self, p: Point) -> f64 {
        match self {
            Self::X => p.x,
            Self::Y => p.y,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
        }
    }
}

/// Axis-aligned rectangle with a non-negative size.
///
/// Constructed from a minimum corner and a size; stored as its extents so unions are
/// exact. Zero width and/or height is valid: the bounding rectangle of a single point,
/// or of coincident points, is a rectangle of size zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rectangle {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Rectangle {
    /// The zero-size rectangle at the origin.
    pub const ZERO: Self = Self::point(Point::ORIGIN);

    /// Create a rectangle from its minimum corner and size.
    ///
    /// Fails with [`Error::NegativeExtent`] if `width` or `height` is negative or not finite.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        if !(width >= 0.0 && height >= 0.0 && width.is_finite() && height.is_finite()) {
            return Err(Error::NegativeExtent { width, height });
        }
        Ok(Self {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        })
    }

    /// The zero-size rectangle located at `p`.
    pub const fn point(p: Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    /// Build from min/max extents; callers guarantee `min <= max` on both axes.
    pub(crate) fn from_extents(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        debug_assert!(min_x <= max_x && min_y <= max_y, "inverted extents");
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The tight bounding rectangle of `points`, or `None` if there are none.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = Self::point(it.next()?);
        Some(it.fold(first, |acc, p| acc.union(&Self::point(p))))
    }

    /// Minimum x.
    pub const fn x(&self) -> f64 {
        self.min_x
    }

    /// Minimum y.
    pub const fn y(&self) -> f64 {
        self.min_y
    }

    /// Width (never negative).
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height (never negative).
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Lower bound along `axis`.
    pub const fn min(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.min_x,
            Axis::Y => self.min_y,
        }
    }

    /// Upper bound along `axis`.
    pub const fn max(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.max_x,
            Axis::Y => self.max_y,
        }
    }

    /// Size along `axis`.
    pub fn extent(&self, axis: Axis) -> f64 {
        self.max(axis) - self.min(axis)
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(
            self.min_x + 0.5 * self.width(),
            self.min_y + 0.5 * self.height(),
        )
    }

    /// Length of the diagonal.
    pub fn diagonal(&self) -> f64 {
        Vec2::new(self.width(), self.height()).hypot()
    }

    /// The larger of width and height.
    pub fn longer_side(&self) -> f64 {
        self.width().max(self.height())
    }

    /// The axis of the longer side. Ties go to [`Axis::X`].
    pub fn longer_axis(&self) -> Axis {
        if self.width() >= self.height() {
            Axis::X
        } else {
            Axis::Y
        }
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Partition into the parts below and above `at` along `axis`.
    ///
    /// `at` is clamped into the rectangle, so both halves stay inside it.
    pub fn split_at(&self, axis: Axis, at: f64) -> (Self, Self) {
        let at = at.max(self.min(axis)).min(self.max(axis));
        let mut lower = *self;
        let mut upper = *self;
        match axis {
            Axis::X => {
                lower.max_x = at;
                upper.min_x = at;
            }
            Axis::Y => {
                lower.max_y = at;
                upper.min_y = at;
            }
        }
        (lower, upper)
    }

    /// Whether `p` lies inside or on the boundary.
    pub fn contains(&self, p: Point) -> bool {
        self.min_x <= p.x && p.x <= self.max_x && self.min_y <= p.y && p.y <= self.max_y
    }

    /// Convert to a Kurbo rectangle.
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl From<Rect> for Rectangle {
    fn from(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::from_extents(rect.x0, rect.y0, rect.x1, rect.y1)
    }
}

impl From<Rectangle> for Rect {
    fn from(rect: Rectangle) -> Self {
        rect.to_rect()
    }
}

/// Handle of an input point: its position in the sequence given to
/// [`SplitTree::build`](crate::SplitTree::build).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(pub(crate) u32);

impl PointId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Point ids are 32-bit; trees never hold more than u32::MAX points."
    )]
    pub(crate) const fn new(idx: usize) -> Self {
        Self(idx as u32)
    }

    /// Position of this point in the input sequence.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a node in a [`SplitTree`](crate::SplitTree).
///
/// Ids are only meaningful for the tree that produced them. Parents always have
/// smaller ids than their children, and the root is the smallest id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Node ids are 32-bit; a tree over n points has 2n - 1 nodes."
    )]
    pub(crate) const fn new(idx: usize) -> Self {
        Self(idx as u32)
    }

    /// Arena index of this node.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Selects memoized node fields for [`SplitTree::invalidate`](crate::SplitTree::invalidate).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Caches: u8 {
        /// Bounding rectangles.
        const BOUNDS     = 0b0000_0001;
        /// Barycenters.
        const BARYCENTER = 0b0000_0010;
        /// Subtree sizes.
        const SIZE       = 0b0000_0100;
        /// Subtree point sets.
        const POINTS     = 0b0000_1000;
        /// Fields that depend on point coordinates.
        const GEOMETRY   = Self::BOUNDS.bits() | Self::BARYCENTER.bits();
    }
}

/// Work counters recorded while building a tree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Subtrees carved off a shrinking trunk.
    pub peels: usize,
    /// Rounds of the two-sided scan that locates each carved run.
    pub scan_steps: usize,
    /// Records unlinked from a trunk and relinked into a carved piece.
    pub relinks: usize,
    /// Records copied into per-call working orders.
    pub copied: usize,
    /// Peels that found every remaining point coincident and split by count.
    pub fallback_splits: usize,
}

impl BuildStats {
    /// Sum of all counted operations.
    pub fn total_work(&self) -> usize {
        self.peels + self.scan_steps + self.relinks + self.copied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn derived_geometry() {
        let r = Rectangle::new(1.0, 2.0, 3.0, 4.0).unwrap();
        assert_eq!(r.center(), Point::new(2.5, 4.0));
        assert_abs_diff_eq!(r.diagonal(), 5.0, epsilon = 1e-12);
        assert_eq!(r.longer_side(), 4.0);
        assert_eq!(r.longer_axis(), Axis::Y);
        assert_eq!(r.max(Axis::X), 4.0);
        assert_eq!(r.max(Axis::Y), 6.0);
    }

    #[test]
    fn zero_extent_is_valid() {
        let r = Rectangle::new(3.0, -1.0, 0.0, 0.0).unwrap();
        assert_eq!(r, Rectangle::point(Point::new(3.0, -1.0)));
        assert_eq!(r.diagonal(), 0.0);
        assert_eq!(r.longer_side(), 0.0);
        assert!(r.contains(Point::new(3.0, -1.0)));
    }

    #[test]
    fn negative_or_nan_extent_is_rejected() {
        assert_eq!(
            Rectangle::new(0.0, 0.0, -1.0, 2.0),
            Err(Error::NegativeExtent {
                width: -1.0,
                height: 2.0
            })
        );
        assert!(Rectangle::new(0.0, 0.0, 1.0, f64::NAN).is_err());
        assert!(Rectangle::new(0.0, 0.0, f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn union_and_from_points() {
        let a = Rectangle::point(Point::new(0.0, 5.0));
        let b = Rectangle::new(2.0, 1.0, 1.0, 1.0).unwrap();
        let u = a.union(&b);
        assert_eq!(u, Rectangle::new(0.0, 1.0, 3.0, 4.0).unwrap());

        let pts = [Point::new(1.0, 1.0), Point::new(-2.0, 3.0), Point::new(0.5, -4.0)];
        let bb = Rectangle::from_points(pts).unwrap();
        assert_eq!(bb, Rectangle::new(-2.0, -4.0, 3.0, 7.0).unwrap());
        assert!(Rectangle::from_points([]).is_none());
    }

    #[test]
    fn split_at_partitions_and_clamps() {
        let r = Rectangle::new(0.0, 0.0, 4.0, 2.0).unwrap();
        let (lo, hi) = r.split_at(Axis::X, 1.0);
        assert_eq!(lo, Rectangle::new(0.0, 0.0, 1.0, 2.0).unwrap());
        assert_eq!(hi, Rectangle::new(1.0, 0.0, 3.0, 2.0).unwrap());

        let (lo, hi) = r.split_at(Axis::Y, 10.0);
        assert_eq!(lo, r);
        assert_eq!(hi.height(), 0.0);
        assert_eq!(hi.y(), 2.0);
    }

    #[test]
    fn kurbo_round_trip_normalizes() {
        let r: Rectangle = Rect::new(4.0, 3.0, 1.0, -1.0).into();
        assert_eq!(r, Rectangle::new(1.0, -1.0, 3.0, 4.0).unwrap());
        let back: Rect = r.into();
        assert_eq!(back, Rect::new(1.0, -1.0, 4.0, 3.0));
    }

    #[test]
    fn axis_helpers() {
        assert_eq!(Axis::X.other(), Axis::Y);
        assert_eq!(Axis::Y.other(), Axis::X);
        assert_eq!(Axis::Y.coord(Point::new(1.0, 2.0)), 2.0);
    }

    #[test]
    fn cache_groups() {
        assert!(Caches::GEOMETRY.contains(Caches::BOUNDS));
        assert!(!Caches::GEOMETRY.contains(Caches::SIZE));
    }
}
