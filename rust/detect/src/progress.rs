// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scan observability: progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

/// Receives progress updates from a running scan.
///
/// Invoked from worker threads at a bounded cadence, never per triangle.
/// Implementations should stay cheap and must not block.
pub trait ProgressSink: Sync {
    /// `scanned` of `total` element pairs have been enumerated.
    fn report(&self, scanned: u64, total: u64);
}

/// Discards all progress updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _scanned: u64, _total: u64) {}
}

/// Logs progress ratios through `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, scanned: u64, total: u64) {
        let percent = if total == 0 {
            100.0
        } else {
            scanned as f64 * 100.0 / total as f64
        };
        debug!(scanned, total, percent, "scan progress");
    }
}

/// Cooperative cancellation flag shared between a caller and a running
/// scan.
///
/// Cloning shares the flag. Cancellation does not interrupt a triangle
/// test in flight: workers observe the flag between outer elements, and
/// the scan returns the clashes found so far.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the scan stop at its next checkpoint.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// True once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
