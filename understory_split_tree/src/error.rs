// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for split tree construction and point updates.

/// Errors reported by [`SplitTree`](crate::SplitTree) and [`Rectangle`](crate::Rectangle).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// A split tree needs at least one point.
    #[error("cannot build a split tree from an empty point set")]
    EmptyPointSet,
    /// A point has a NaN or infinite coordinate.
    #[error("point {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Input position of the offending point.
        index: usize,
    },
    /// A rectangle was given a negative or non-finite width or height.
    #[error("rectangle extents must be finite and non-negative (width {width}, height {height})")]
    NegativeExtent {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },
    /// A [`PointId`](crate::PointId) that does not belong to this tree.
    #[error("point {index} does not belong to this tree")]
    UnknownPoint {
        /// Index carried by the rejected id.
        index: usize,
    },
}

/// Result alias for split tree operations.
pub type Result<T> = core::result::Result<T, Error>;
