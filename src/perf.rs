//! Timing for the board engine.
//!
//! Hot paths (hit testing, pointer handling, the render walk, board IO) are
//! wrapped in `profile_scope!`, which only emits a timer when the crate is
//! built with `--features profiling`. Decodes and board IO are also timed
//! unconditionally: slow ones are logged, and the controller keeps a rolling
//! [`PerfStats`] table the host can read through `perf_stats()`.
//!
//! ```ignore
//! use refboard::profile_scope;
//!
//! fn topmost_at(&self, p: Point) -> Option<ItemId> {
//!     profile_scope!("topmost_at");
//!     // ...
//! }
//! ```

use crate::constants::PROFILE_SCOPE_THRESHOLD_MS;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::warn;

/// Samples kept per operation for the rolling average.
const WINDOW: usize = 64;

/// Time the rest of the enclosing scope. Expands to nothing unless the
/// `profiling` feature is on.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        $crate::profile_scope!($name, $crate::constants::PROFILE_SCOPE_THRESHOLD_MS);
    };
    ($name:expr, $threshold_ms:expr) => {
        #[cfg(feature = "profiling")]
        let _profile_guard = $crate::perf::ScopedTimer::new($name, $threshold_ms);
        #[cfg(not(feature = "profiling"))]
        let _ = ($name, $threshold_ms);
    };
}

pub use profile_scope;

/// Warns on drop if the scope outlived `threshold_ms`.
pub struct ScopedTimer {
    name: &'static str,
    threshold_ms: f64,
    started: Instant,
}

impl ScopedTimer {
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            threshold_ms,
            started: Instant::now(),
        }
    }

    /// Timer with the default profiling threshold.
    pub fn start(name: &'static str) -> Self {
        Self::new(name, PROFILE_SCOPE_THRESHOLD_MS)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn elapsed_ms(&self) -> f64 {
        millis_since(self.started)
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        log_if_slow(self.name, self.elapsed_ms(), self.threshold_ms);
    }
}

fn millis_since(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Run `f` and return its value with the time it took in milliseconds.
#[inline]
pub fn measure<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let started = Instant::now();
    let value = f();
    (value, millis_since(started))
}

/// [`measure`], logging a warning when `f` exceeds `threshold_ms`.
#[inline]
pub fn measure_and_log<T>(name: &str, threshold_ms: f64, f: impl FnOnce() -> T) -> T {
    let (value, elapsed_ms) = measure(f);
    log_if_slow(name, elapsed_ms, threshold_ms);
    value
}

/// For timings taken on another thread, such as a decode worker.
pub fn log_if_slow(name: &str, elapsed_ms: f64, threshold_ms: f64) {
    if elapsed_ms > threshold_ms {
        warn!(operation = name, elapsed_ms = %format!("{:.1}", elapsed_ms), threshold_ms, "Slow operation");
    }
}

/// Rolling timings for one operation: the last [`WINDOW`] samples plus
/// lifetime count and maximum.
#[derive(Clone, Debug)]
pub struct OperationStats {
    window: [f64; WINDOW],
    next: usize,
    filled: usize,
    count: u64,
    max_ms: f64,
}

impl Default for OperationStats {
    fn default() -> Self {
        Self {
            window: [0.0; WINDOW],
            next: 0,
            filled: 0,
            count: 0,
            max_ms: 0.0,
        }
    }
}

impl OperationStats {
    pub fn record(&mut self, ms: f64) {
        self.window[self.next] = ms;
        self.next = (self.next + 1) % WINDOW;
        self.filled = (self.filled + 1).min(WINDOW);
        self.count += 1;
        self.max_ms = self.max_ms.max(ms);
    }

    /// Mean of the samples still in the window; 0 before the first one.
    pub fn average(&self) -> f64 {
        if self.filled == 0 {
            return 0.0;
        }
        self.window[..self.filled].iter().sum::<f64>() / self.filled as f64
    }

    /// Most recent sample.
    pub fn last_ms(&self) -> Option<f64> {
        (self.filled > 0).then(|| self.window[(self.next + WINDOW - 1) % WINDOW])
    }

    pub fn max_ms(&self) -> f64 {
        self.max_ms
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Timings keyed by operation name (`"decode"`, `"board_save"`, `"board_load"`).
#[derive(Debug, Default)]
pub struct PerfStats {
    by_name: BTreeMap<&'static str, OperationStats>,
}

impl PerfStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &'static str, elapsed_ms: f64) {
        self.by_name.entry(name).or_default().record(elapsed_ms);
    }

    pub fn get(&self, name: &str) -> Option<&OperationStats> {
        self.by_name.get(name)
    }

    /// Operations in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &OperationStats)> + '_ {
        self.by_name.iter().map(|(name, stats)| (*name, stats))
    }

    pub fn reset(&mut self) {
        self.by_name.clear();
    }
}
