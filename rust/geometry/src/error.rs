// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing or processing geometry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid hull: {0}")]
    InvalidHull(String),

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Boolean operation failed: {0}")]
    Boolean(String),
}

impl Error {
    pub(crate) fn hull(msg: impl Into<String>) -> Self {
        Error::InvalidHull(msg.into())
    }
}
