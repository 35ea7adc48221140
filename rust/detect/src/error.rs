// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for detection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running a scan.
#[derive(Error, Debug)]
pub enum Error {
    /// The run tolerance must be a finite, non-negative distance.
    #[error("invalid tolerance {0}: must be finite and non-negative")]
    InvalidTolerance(f64),

    /// A geometry record failed to decode; the scan is aborted rather than
    /// silently skipping the element.
    #[error("malformed geometry for element {id}: {source}")]
    MalformedGeometry {
        id: clash_lite_core::ElementId,
        source: clash_lite_core::Error,
    },
}
