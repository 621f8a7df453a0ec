//! End-of-run progress reporting.
//!
//! `snapvault` is a single-threaded, non-interactive batch tool, so
//! "progress" here means the summary counts a caller would want from a
//! log, not a live terminal bar: one gated [`logging::info_log!`] line,
//! using the `stats` [`logging::InfoFlags`] bit reserved for it.

use orchestrator::RunStats;

/// Logs a one-line summary of `stats` at the `stats` info level.
pub fn report(stats: &RunStats) {
    logging::info_log!(
        logging::InfoFlags::STATS,
        "written={} unchanged={} deltas={} removed={} errors={}",
        stats.written,
        stats.unchanged,
        stats.deltas,
        stats.removed,
        stats.file_errors,
    );
}
