// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pairwise clash scanning.
//!
//! The detector walks every unordered pair of elements with geometry and
//! funnels each pair through three stages: the type-based pair filter, a
//! strict bounding-box overlap test, and the triangle-level intersection
//! test. The first intersecting triangle pair marks the element pair as
//! clashing; intersection regions are not enumerated.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use clash_lite_core::{DecodedGeometry, Element, ElementId};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::progress::{CancelToken, NullProgress, ProgressSink};
use crate::rules::ClashRules;
use crate::triangle::Triangle;

/// Report one progress update per this many enumerated pairs.
const PROGRESS_INTERVAL: u64 = 4096;

/// A pair of elements whose meshes intersect within tolerance.
///
/// Unordered: `a` comes from the outer scan position and `b` from the
/// inner, so the order is consistent but not canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clash {
    pub a: ElementId,
    pub b: ElementId,
}

/// Diagnostics accumulated over one scan.
///
/// Observability only; no correctness hangs on these numbers.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanStats {
    /// Elements skipped because they carry no geometry record.
    pub without_geometry: usize,
    /// Pairs that survived the type filter and the bounding-box prune.
    pub pairs_tested: u64,
    /// Clashes found.
    pub clashes: usize,
    /// Wall time of the scan.
    pub elapsed: Duration,
    /// True when the scan stopped early at a cancellation checkpoint.
    pub cancelled: bool,
}

/// Result of one scan: the clash list plus diagnostics.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClashReport {
    /// Clashing element pairs, in discovery order, each pair at most once.
    pub clashes: Vec<Clash>,
    /// Scan diagnostics.
    pub stats: ScanStats,
}

/// Per-worker scan results, merged after the parallel pass.
#[derive(Default)]
struct Partial {
    clashes: Vec<Clash>,
    pairs_tested: u64,
}

/// One element with its geometry decoded, ready for scanning.
struct Prepared<'a> {
    element: &'a Element,
    geometry: DecodedGeometry,
}

/// Detects clashes between the elements of a building model.
///
/// Holds the exemption rules and the run tolerance; cheap to construct and
/// reusable across element sets.
#[derive(Debug, Clone)]
pub struct ClashDetector {
    rules: ClashRules,
    tolerance: f64,
}

impl ClashDetector {
    /// Creates a detector.
    ///
    /// The tolerance thickens every triangle symmetrically during
    /// intersection tests, in model units; it must be finite and
    /// non-negative.
    pub fn new(rules: ClashRules, tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(Error::InvalidTolerance(tolerance));
        }
        Ok(Self { rules, tolerance })
    }

    /// The run tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// The exemption rules.
    pub fn rules(&self) -> &ClashRules {
        &self.rules
    }

    /// Scans every unordered element pair and reports the clashing ones.
    pub fn find_clashes(&self, elements: &[Element]) -> Result<ClashReport> {
        self.find_clashes_with(elements, &CancelToken::new(), &NullProgress)
    }

    /// Scan with cooperative cancellation and progress reporting.
    ///
    /// A cancelled scan returns the clashes found so far with
    /// `stats.cancelled` set; partial results stay valid. Malformed
    /// geometry aborts the run with an error before any pair is tested.
    pub fn find_clashes_with(
        &self,
        elements: &[Element],
        cancel: &CancelToken,
        progress: &dyn ProgressSink,
    ) -> Result<ClashReport> {
        let start = Instant::now();

        let mut without_geometry = 0usize;
        let mut prepared = Vec::with_capacity(elements.len());
        for element in elements {
            match &element.geometry {
                Some(record) => {
                    let geometry = DecodedGeometry::decode(record).map_err(|source| {
                        Error::MalformedGeometry {
                            id: element.id,
                            source,
                        }
                    })?;
                    prepared.push(Prepared { element, geometry });
                }
                None => without_geometry += 1,
            }
        }
        debug!(
            elements = elements.len(),
            without_geometry, "scan input prepared"
        );

        let n = prepared.len();
        let total_pairs = n as u64 * n.saturating_sub(1) as u64 / 2;
        let scanned = AtomicU64::new(0);

        // Outer elements are partitioned across the worker pool. Each task
        // owns a private clash list and counters; pairs (i, j) with i < j
        // are covered exactly once, so duplicates cannot occur and the
        // merged set does not depend on worker scheduling.
        let partials: Vec<Partial> = (0..n)
            .into_par_iter()
            .map(|i| {
                let mut partial = Partial::default();
                if cancel.is_cancelled() {
                    return partial;
                }
                let first = &prepared[i];
                let first_bounds = first.geometry.bounds.inflated(self.tolerance);
                for second in &prepared[i + 1..] {
                    if !self
                        .rules
                        .should_check(&first.element.ifc_type, &second.element.ifc_type)
                    {
                        continue;
                    }
                    if !first_bounds.intersects(&second.geometry.bounds.inflated(self.tolerance)) {
                        continue;
                    }
                    partial.pairs_tested += 1;
                    if meshes_intersect(&first.geometry, &second.geometry, self.tolerance) {
                        partial.clashes.push(Clash {
                            a: first.element.id,
                            b: second.element.id,
                        });
                    }
                }

                let batch = (n - i - 1) as u64;
                let done = scanned.fetch_add(batch, Ordering::Relaxed) + batch;
                if batch > 0 && done / PROGRESS_INTERVAL != (done - batch) / PROGRESS_INTERVAL {
                    progress.report(done.min(total_pairs), total_pairs);
                }
                partial
            })
            .collect();

        let mut clashes = Vec::new();
        let mut pairs_tested = 0;
        for partial in partials {
            pairs_tested += partial.pairs_tested;
            clashes.extend(partial.clashes);
        }

        let stats = ScanStats {
            without_geometry,
            pairs_tested,
            clashes: clashes.len(),
            elapsed: start.elapsed(),
            cancelled: cancel.is_cancelled(),
        };
        info!(
            clashes = stats.clashes,
            pairs_tested = stats.pairs_tested,
            without_geometry = stats.without_geometry,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            cancelled = stats.cancelled,
            "clash scan finished"
        );
        Ok(ClashReport { clashes, stats })
    }
}

/// Triangle-level test for one candidate pair; the first intersecting
/// triangle pair wins.
///
/// A triangle of `a` is only tested when at least one of its vertices lies
/// inside `b`'s bounding box inflated by the combined tolerance. The prune
/// keeps any triangle with a vertex in that box and drops the rest.
fn meshes_intersect(a: &DecodedGeometry, b: &DecodedGeometry, tolerance: f64) -> bool {
    let prune = b.bounds.inflated(tolerance + tolerance);
    for i in 0..a.triangle_count() {
        let t1 = Triangle::from_mesh(a, i);
        if !t1.vertices().iter().any(|v| prune.contains_point(v)) {
            continue;
        }
        for j in 0..b.triangle_count() {
            let t2 = Triangle::from_mesh(b, j);
            if t1.intersects(&t2, tolerance, tolerance) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_tolerance_is_rejected() {
        let err = ClashDetector::new(ClashRules::default(), -0.5).unwrap_err();
        assert!(matches!(err, Error::InvalidTolerance(t) if t == -0.5));
        assert!(matches!(
            ClashDetector::new(ClashRules::default(), f64::NAN),
            Err(Error::InvalidTolerance(_))
        ));
    }

    #[test]
    fn zero_tolerance_is_accepted() {
        let detector = ClashDetector::new(ClashRules::default(), 0.0).unwrap();
        assert_eq!(detector.tolerance(), 0.0);
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let detector = ClashDetector::new(ClashRules::default(), 0.0).unwrap();
        let report = detector.find_clashes(&[]).unwrap();
        assert!(report.clashes.is_empty());
        assert_eq!(report.stats.without_geometry, 0);
        assert_eq!(report.stats.pairs_tested, 0);
    }

    #[test]
    fn elements_without_geometry_are_counted() {
        let detector = ClashDetector::new(ClashRules::default(), 0.0).unwrap();
        let elements = vec![
            Element::without_geometry(1, "IfcWall"),
            Element::without_geometry(2, "IfcDoor"),
        ];
        let report = detector.find_clashes(&elements).unwrap();
        assert!(report.clashes.is_empty());
        assert_eq!(report.stats.without_geometry, 2);
    }
}
