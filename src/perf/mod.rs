/// Performance measurement utilities
/// Frame timing plus the optional per-ray counters in `profiling`
pub mod profiling;

pub use profiling::{CounterSnapshot, MarchCounters, MARCH_COUNTERS};

use log::debug;
use std::time::{Duration, Instant};

/// Logs the lifetime of a scope at debug level when dropped.
pub struct PerfTimer {
    name: &'static str,
    start: Instant,
}

impl PerfTimer {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        debug!("[perf] {}: {}us", self.name, self.elapsed().as_micros());
    }
}

/// Rolling frame-time accumulator for the viewer's once-per-second report.
#[derive(Debug, Default)]
pub struct FrameStats {
    frames: u32,
    render_time: Duration,
    worst: Duration,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, render_time: Duration) {
        self.frames += 1;
        self.render_time += render_time;
        self.worst = self.worst.max(render_time);
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Mean render time in milliseconds, 0 when nothing was recorded.
    pub fn average_ms(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.render_time.as_secs_f64() * 1000.0 / self.frames as f64
    }

    pub fn worst_ms(&self) -> f64 {
        self.worst.as_secs_f64() * 1000.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Macro for easy performance measurement
#[macro_export]
macro_rules! perf_scope {
    ($name:expr) => {
        let _timer = $crate::perf::PerfTimer::new($name);
    };
}
