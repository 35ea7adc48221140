// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Clash-Lite Core
//!
//! Building element data model and raw geometry buffer decoding.
//!
//! The geometry store hands over one [`GeometryRecord`] per element: packed
//! little-endian index, vertex, and transform buffers plus a precomputed
//! world-space bounding box. This crate decodes those buffers into validated
//! numeric form ([`DecodedGeometry`]) so the detection algorithms can work
//! with plain arrays and never touch byte-level concerns.

pub mod bounds;
pub mod buffers;
pub mod error;
pub mod model;

pub use bounds::Aabb;
pub use error::{Error, Result};
pub use model::{DecodedGeometry, Element, ElementId, GeometryRecord};

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};
