// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Clash-Lite Detect
//!
//! Tolerance-aware triangle-mesh clash detection between building
//! elements.
//!
//! The scan walks every unordered pair of elements, filters pairs whose
//! types are exempt (a wall and the opening cut into it never clash),
//! prunes pairs whose bounding boxes cannot meet, and runs an exact
//! triangle-triangle intersection test on the rest. Pairs whose surfaces
//! intersect within the run tolerance are reported once each.
//!
//! ```rust,ignore
//! use clash_lite_detect::{ClashDetector, ClashRules};
//!
//! let detector = ClashDetector::new(ClashRules::default(), 0.001)?;
//! let report = detector.find_clashes(&elements)?;
//! for clash in &report.clashes {
//!     println!("clash between #{} and #{}", clash.a, clash.b);
//! }
//! ```

pub mod detector;
pub mod error;
pub mod progress;
pub mod rules;
pub mod triangle;

pub use detector::{Clash, ClashDetector, ClashReport, ScanStats};
pub use error::{Error, Result};
pub use progress::{CancelToken, NullProgress, ProgressSink, TracingProgress};
pub use rules::{ClashRules, Combination};
pub use triangle::Triangle;

// Re-export the core data model so callers need only one crate.
pub use clash_lite_core::{Aabb, DecodedGeometry, Element, ElementId, GeometryRecord};
