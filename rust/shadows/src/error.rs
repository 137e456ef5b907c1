// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for shadow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced at light/hull construction time
///
/// A build pass itself never fails; degenerate geometry falls back locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid light: {0}")]
    InvalidLight(String),

    #[error("Unknown light key")]
    UnknownLight,

    #[error("Unknown hull key")]
    UnknownHull,

    #[error("Geometry error: {0}")]
    Geometry(#[from] umbra2d_geometry::Error),
}
