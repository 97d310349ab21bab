//! Process-wide counters for formatted batches.

use std::sync::atomic::{AtomicU64, Ordering};

static FORMAT_BATCHES: AtomicU64 = AtomicU64::new(0);
static FORMAT_ROWS: AtomicU64 = AtomicU64::new(0);
static FORMAT_BYTES: AtomicU64 = AtomicU64::new(0);

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatMetricsSnapshot {
    pub batches: u64,
    pub rows: u64,
    pub bytes: u64,
}

/// Record one finished batch.
pub fn record_formatted_batch(rows: u64, bytes: u64) {
    FORMAT_BATCHES.fetch_add(1, Ordering::Relaxed);
    FORMAT_ROWS.fetch_add(rows, Ordering::Relaxed);
    FORMAT_BYTES.fetch_add(bytes, Ordering::Relaxed);
}

#[must_use]
pub fn format_metrics_snapshot() -> FormatMetricsSnapshot {
    FormatMetricsSnapshot {
        batches: FORMAT_BATCHES.load(Ordering::Relaxed),
        rows: FORMAT_ROWS.load(Ordering::Relaxed),
        bytes: FORMAT_BYTES.load(Ordering::Relaxed),
    }
}
