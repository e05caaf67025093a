//! Console progress rendering

use drivebatch_batch::{ProgressCallback, ProgressEvent};
use drivebatch_core::format_duration;
use std::io::Write;
use std::sync::Arc;

/// One progress line, e.g. `[ 40%] ✓ report.pdf (2/5) - ETA: 3s`
pub fn format_progress_line(event: &ProgressEvent<'_>) -> String {
    let status = if event.success { "✓" } else { "✗" };
    format!(
        "[{:>3}%] {} {} ({}/{}) - ETA: {}",
        event.percent,
        status,
        event.label,
        event.completed,
        event.total,
        format_duration(event.eta)
    )
}

/// Progress callback that rewrites a single stderr line and ends it on the
/// last item.
///
/// The engine never runs two callbacks at once, so writes do not interleave.
pub fn console_progress() -> ProgressCallback {
    Arc::new(|event: &ProgressEvent<'_>| {
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r{}", format_progress_line(event));
        if event.completed == event.total {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    })
}
