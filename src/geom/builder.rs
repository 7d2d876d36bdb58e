//! Surface construction from a point grid.
//!
//! The grid's columns become poles along U and its rows poles along V. Each
//! requested degree is capped at `pole_count - 1`, a clamped uniform knot
//! vector is synthesized per direction, and the assembled request goes to a
//! [`GeometryKernel`]. The resulting [`GridSurface`] owns the kernel surface
//! and answers control-point, isocurve and mesh queries.

use super::diagnostics::MeshDiagnostics;
use super::error::GridSurfaceError;
use super::grid::PointGrid;
use super::isocurve::{Isocurve, IsocurveDirection, IsocurveOptions, sample_isocurves};
use super::kernel::{GeometryKernel, KernelSurface, NativeKernel, SurfaceRequest};
use super::knots::{KnotVector, resolve_degree, synthesize_knots};
use super::mesh::{MeshOptions, SurfaceMesh, extract_mesh};
use super::metrics::{GeomMetrics, TimingBucket};

/// Requested degrees. Both default to 3 (bicubic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceBuildOptions {
    pub degree_u: usize,
    pub degree_v: usize,
}

impl Default for SurfaceBuildOptions {
    fn default() -> Self {
        Self {
            degree_u: 3,
            degree_v: 3,
        }
    }
}

impl SurfaceBuildOptions {
    #[must_use]
    pub const fn new(degree_u: usize, degree_v: usize) -> Self {
        Self { degree_u, degree_v }
    }
}

/// Queries available on a constructed surface, independent of the kernel behind it.
pub trait SurfaceHandle: Send + Sync {
    fn rows(&self) -> usize;

    fn cols(&self) -> usize;

    /// Control points, ascending row then ascending column.
    fn control_points(&self) -> Vec<[f64; 3]>;

    fn isocurves(
        &self,
        direction: IsocurveDirection,
        options: &IsocurveOptions,
    ) -> Result<Vec<Isocurve>, GridSurfaceError>;

    fn mesh_with_diagnostics(
        &self,
        options: &MeshOptions,
    ) -> Result<(SurfaceMesh, MeshDiagnostics), GridSurfaceError>;

    fn mesh(&self, options: &MeshOptions) -> Result<SurfaceMesh, GridSurfaceError> {
        self.mesh_with_diagnostics(options).map(|(mesh, _)| mesh)
    }

    /// `(degree_u, degree_v)` after capping against the grid size.
    fn resolved_degrees(&self) -> (usize, usize);

    /// `(u, v)` knot vectors the surface was built with.
    fn knot_vectors(&self) -> (&KnotVector, &KnotVector);

    /// `(u_min, u_max, v_min, v_max)`.
    fn bounds(&self) -> (f64, f64, f64, f64);
}

/// A surface built from a [`PointGrid`], owned together with its kernel.
pub struct GridSurface<K: GeometryKernel = NativeKernel> {
    kernel: K,
    surface: K::Surface,
    rows: usize,
    cols: usize,
    requested: SurfaceBuildOptions,
    knots_u: KnotVector,
    knots_v: KnotVector,
}

impl<K: GeometryKernel> std::fmt::Debug for GridSurface<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridSurface")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("requested", &self.requested)
            .field("knots_u", &self.knots_u)
            .field("knots_v", &self.knots_v)
            .finish_non_exhaustive()
    }
}

impl<K: GeometryKernel> GridSurface<K> {
    #[must_use]
    pub fn surface(&self) -> &K::Surface {
        &self.surface
    }

    #[must_use]
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Degrees as originally requested, before capping.
    #[must_use]
    pub const fn requested_degrees(&self) -> (usize, usize) {
        (self.requested.degree_u, self.requested.degree_v)
    }
}

impl<K: GeometryKernel> SurfaceHandle for GridSurface<K> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn control_points(&self) -> Vec<[f64; 3]> {
        self.surface.poles().iter().map(|p| p.to_array()).collect()
    }

    fn isocurves(
        &self,
        direction: IsocurveDirection,
        options: &IsocurveOptions,
    ) -> Result<Vec<Isocurve>, GridSurfaceError> {
        let mut metrics = GeomMetrics::default();
        metrics.begin();
        let curves = metrics.time(TimingBucket::IsocurveSampling, || {
            sample_isocurves(&self.surface, direction, options)
        });
        if let Some(report) = metrics.end() {
            log::debug!("isocurve sampling took {} ns", report.isocurve_sampling_ns);
        }
        curves
    }

    fn mesh_with_diagnostics(
        &self,
        options: &MeshOptions,
    ) -> Result<(SurfaceMesh, MeshDiagnostics), GridSurfaceError> {
        extract_mesh(&self.kernel, &self.surface, options)
    }

    fn resolved_degrees(&self) -> (usize, usize) {
        (self.knots_u.degree(), self.knots_v.degree())
    }

    fn knot_vectors(&self) -> (&KnotVector, &KnotVector) {
        (&self.knots_u, &self.knots_v)
    }

    fn bounds(&self) -> (f64, f64, f64, f64) {
        self.surface.bounds()
    }
}

/// Builds a surface with the [`NativeKernel`].
pub fn build_surface(
    grid: &PointGrid,
    options: &SurfaceBuildOptions,
) -> Result<GridSurface<NativeKernel>, GridSurfaceError> {
    build_surface_with_kernel(NativeKernel::default(), grid, options)
}

/// Validates a flat `x, y, z` buffer and builds a surface with the [`NativeKernel`].
pub fn build_surface_from_flat(
    coords: &[f64],
    rows: usize,
    cols: usize,
    options: &SurfaceBuildOptions,
) -> Result<GridSurface<NativeKernel>, GridSurfaceError> {
    let grid = PointGrid::from_flat(coords, rows, cols)?;
    build_surface(&grid, options)
}

pub fn build_surface_with_kernel<K: GeometryKernel>(
    kernel: K,
    grid: &PointGrid,
    options: &SurfaceBuildOptions,
) -> Result<GridSurface<K>, GridSurfaceError> {
    let mut metrics = GeomMetrics::default();
    metrics.begin();

    let (rows, cols) = (grid.rows(), grid.cols());
    let degree_u = resolve_degree(cols, options.degree_u);
    let degree_v = resolve_degree(rows, options.degree_v);
    if degree_u != options.degree_u || degree_v != options.degree_v {
        log::debug!(
            "reduced surface degree from {}x{} to {degree_u}x{degree_v} for a {rows}x{cols} grid",
            options.degree_u,
            options.degree_v
        );
    }

    let knots_u = synthesize_knots(cols, degree_u)?;
    let knots_v = synthesize_knots(rows, degree_v)?;

    let request = SurfaceRequest {
        u_count: cols,
        v_count: rows,
        poles: grid.points().to_vec(),
        weights: vec![1.0; grid.len()],
        knots_u: knots_u.knots().to_vec(),
        mults_u: knots_u.multiplicities().to_vec(),
        knots_v: knots_v.knots().to_vec(),
        mults_v: knots_v.multiplicities().to_vec(),
        degree_u,
        degree_v,
        periodic_u: false,
        periodic_v: false,
    };

    let surface = metrics
        .time(TimingBucket::SurfaceConstruction, || kernel.build_surface(&request))
        .inspect_err(|err| log::warn!("kernel rejected {rows}x{cols} surface: {err}"))?;
    if let Some(report) = metrics.end() {
        log::debug!("surface construction took {} ns", report.surface_construction_ns);
    }

    log::debug!(
        "built {rows}x{cols} surface, degree {degree_u}x{degree_v}, {} u knots, {} v knots",
        knots_u.knots().len(),
        knots_v.knots().len()
    );

    Ok(GridSurface {
        kernel,
        surface,
        rows,
        cols,
        requested: *options,
        knots_u,
        knots_v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::core::Point3;

    fn grid(rows: usize, cols: usize) -> PointGrid {
        let points = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| Point3::new(c as f64, r as f64, 0.0)))
            .collect();
        PointGrid::from_points(points, rows, cols).unwrap()
    }

    #[test]
    fn degrees_follow_columns_for_u_and_rows_for_v() {
        let surface = build_surface(&grid(3, 6), &SurfaceBuildOptions::default()).unwrap();
        assert_eq!(surface.resolved_degrees(), (3, 2));
        assert_eq!(surface.requested_degrees(), (3, 3));

        let (ku, kv) = surface.knot_vectors();
        assert_eq!(ku.knots(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(kv.knots(), &[0.0, 1.0]);
        assert_eq!(surface.bounds(), (0.0, 3.0, 0.0, 1.0));
    }

    #[test]
    fn degree_zero_request_is_a_construction_error() {
        let err = build_surface(&grid(3, 3), &SurfaceBuildOptions::new(0, 2)).unwrap_err();
        assert!(matches!(err, GridSurfaceError::SurfaceConstruction(_)));
        assert!(!err.is_input_error());
    }

    #[test]
    fn handle_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GridSurface>();
        assert_send_sync::<Box<dyn SurfaceHandle>>();
    }
}
