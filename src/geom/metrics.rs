//! Opt-in timing hooks for surface construction and queries.
//!
//! Timing is only collected with the `metrics` feature on non-wasm targets;
//! everywhere else [`GeomMetrics::time`] just runs the closure and
//! [`GeomMetrics::end`] returns `None`.
//!
//! ```ignore
//! let mut metrics = GeomMetrics::default();
//! metrics.begin();
//! let grid = metrics.time(TimingBucket::SurfaceTessellation, || sample_grid());
//! if let Some(report) = metrics.end() {
//!     println!("tessellation: {} ns", report.surface_tessellation_ns);
//! }
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Knot synthesis plus kernel surface construction.
    SurfaceConstruction,
    /// Isocurve evaluation.
    IsocurveSampling,
    /// Grid resolution search and surface sampling.
    SurfaceTessellation,
    /// Quad-to-triangle splitting.
    Triangulation,
    /// Vertex welding and degenerate triangle culling.
    Welding,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeomTimingReport {
    pub surface_construction_ns: u64,
    pub isocurve_sampling_ns: u64,
    pub surface_tessellation_ns: u64,
    pub triangulation_ns: u64,
    pub welding_ns: u64,
}

impl GeomTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.surface_construction_ns
            .saturating_add(self.isocurve_sampling_ns)
            .saturating_add(self.surface_tessellation_ns)
            .saturating_add(self.triangulation_ns)
            .saturating_add(self.welding_ns)
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    /// Adds every bucket of `other` into `self`.
    pub fn accumulate(&mut self, other: &Self) {
        self.surface_construction_ns = self
            .surface_construction_ns
            .saturating_add(other.surface_construction_ns);
        self.isocurve_sampling_ns = self
            .isocurve_sampling_ns
            .saturating_add(other.isocurve_sampling_ns);
        self.surface_tessellation_ns = self
            .surface_tessellation_ns
            .saturating_add(other.surface_tessellation_ns);
        self.triangulation_ns = self.triangulation_ns.saturating_add(other.triangulation_ns);
        self.welding_ns = self.welding_ns.saturating_add(other.welding_ns);
    }
}

/// Timing accumulator. A no-op unless the `metrics` feature is enabled.
#[derive(Debug, Default)]
pub struct GeomMetrics {
    #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
    report: GeomTimingReport,
}

impl GeomMetrics {
    pub fn begin(&mut self) {
        #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
        {
            self.report = GeomTimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<GeomTimingReport> {
        #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.add_to_bucket(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::SurfaceConstruction => &mut self.report.surface_construction_ns,
            TimingBucket::IsocurveSampling => &mut self.report.isocurve_sampling_ns,
            TimingBucket::SurfaceTessellation => &mut self.report.surface_tessellation_ns,
            TimingBucket::Triangulation => &mut self.report.triangulation_ns,
            TimingBucket::Welding => &mut self.report.welding_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}
