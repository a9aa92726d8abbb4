/// Instrumentation for the marching hot loop.
/// Counters are plain atomics; the macros compile to nothing unless the
/// `profiling` feature is enabled, so release builds pay no cost.
use log::info;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters shared by every render worker.
pub struct MarchCounters {
    // Ray counts
    pub rays_cast: AtomicU64,
    pub reflection_rays: AtomicU64,
    pub shadow_rays: AtomicU64,

    // Marching loop
    pub boundary_steps: AtomicU64,
    pub distance_skips: AtomicU64,
    pub iteration_cap_hits: AtomicU64,
    pub world_misses: AtomicU64,
}

impl MarchCounters {
    pub const fn new() -> Self {
        Self {
            rays_cast: AtomicU64::new(0),
            reflection_rays: AtomicU64::new(0),
            shadow_rays: AtomicU64::new(0),
            boundary_steps: AtomicU64::new(0),
            distance_skips: AtomicU64::new(0),
            iteration_cap_hits: AtomicU64::new(0),
            world_misses: AtomicU64::new(0),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.rays_cast.store(0, Ordering::Relaxed);
        self.reflection_rays.store(0, Ordering::Relaxed);
        self.shadow_rays.store(0, Ordering::Relaxed);
        self.boundary_steps.store(0, Ordering::Relaxed);
        self.distance_skips.store(0, Ordering::Relaxed);
        self.iteration_cap_hits.store(0, Ordering::Relaxed);
        self.world_misses.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            rays_cast: self.rays_cast.load(Ordering::Relaxed),
            reflection_rays: self.reflection_rays.load(Ordering::Relaxed),
            shadow_rays: self.shadow_rays.load(Ordering::Relaxed),
            boundary_steps: self.boundary_steps.load(Ordering::Relaxed),
            distance_skips: self.distance_skips.load(Ordering::Relaxed),
            iteration_cap_hits: self.iteration_cap_hits.load(Ordering::Relaxed),
            world_misses: self.world_misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for MarchCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub rays_cast: u64,
    pub reflection_rays: u64,
    pub shadow_rays: u64,
    pub boundary_steps: u64,
    pub distance_skips: u64,
    pub iteration_cap_hits: u64,
    pub world_misses: u64,
}

impl CounterSnapshot {
    /// Average marching iterations per ray, skips and steps combined.
    pub fn iterations_per_ray(&self) -> f64 {
        if self.rays_cast == 0 {
            return 0.0;
        }
        (self.boundary_steps + self.distance_skips) as f64 / self.rays_cast as f64
    }

    pub fn log_report(&self) {
        info!(
            "rays: {} (reflection {}, shadow {}) | steps: {} | skips: {} | cap hits: {} | world misses: {} | iter/ray: {:.2}",
            self.rays_cast,
            self.reflection_rays,
            self.shadow_rays,
            self.boundary_steps,
            self.distance_skips,
            self.iteration_cap_hits,
            self.world_misses,
            self.iterations_per_ray()
        );
    }
}

pub static MARCH_COUNTERS: MarchCounters = MarchCounters::new();

/// Macro for incrementing a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($counter:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Macro for adding to a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_add {
    ($counter:expr, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add($value, std::sync::atomic::Ordering::Relaxed);
        }
    };
}
