//! Last-resort diagnostics for bookkeeping paths that must never raise.
//!
//! Handler rebuilds and guard restores run inside emission, where propagating
//! an error would turn a logging call into a crash. These helpers write to the
//! real stderr directly and swallow every failure.
//!
//! Uses `OnceLock` so the `SAFE_TRACE` environment variable is read exactly
//! once, even when multiple threads race the first trace.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

static TRACE_ENABLED: OnceLock<bool> = OnceLock::new();
static STARTED: OnceLock<Instant> = OnceLock::new();

fn trace_enabled() -> bool {
    *TRACE_ENABLED.get_or_init(|| {
        matches!(
            std::env::var("SAFE_TRACE").map(|v| v.to_lowercase()).as_deref(),
            Ok("1" | "true" | "yes")
        )
    })
}

/// Emergency logger that never fails.
pub fn safe_log(msg: &str) {
    let _ = writeln!(std::io::stderr(), "[INTERNAL] {msg}");
}

/// Flush-safe diagnostic line, visible only when `SAFE_TRACE` is set.
///
/// Stamps seconds since the first trace so interleaved rebuild decisions can
/// be ordered when debugging stream-identity churn.
pub fn safe_trace(label: &str, detail: &str) {
    if !trace_enabled() {
        return;
    }
    let elapsed = STARTED.get_or_init(Instant::now).elapsed().as_secs_f64();
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "[SAFE TRACE {elapsed:.6}] {label} {detail}");
    let _ = stderr.flush();
}
