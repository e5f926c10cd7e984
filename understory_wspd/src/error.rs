// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for decomposition construction.

/// Errors reported by [`Wspd::build`](crate::Wspd::build).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// The separation factor must be finite and strictly positive.
    #[error("separation factor must be finite and positive, got {0}")]
    InvalidSeparation(f64),
}

/// Result alias for decomposition operations.
pub type Result<T> = core::result::Result<T, Error>;
