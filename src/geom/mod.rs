mod builder;
mod cache;
mod core;
mod diagnostics;
mod error;
mod grid;
mod isocurve;
mod kernel;
mod knots;
mod mesh;
mod metrics;
mod surface;
mod tessellation;
mod triangulation;

pub use builder::{
    GridSurface, SurfaceBuildOptions, SurfaceHandle,
    build_surface, build_surface_from_flat, build_surface_with_kernel,
};
pub use cache::{SurfaceCache, SurfaceCacheStats, SurfaceFingerprint};
pub use core::{Point3, Tolerance, Transform, Vec3};
pub use diagnostics::MeshDiagnostics;
pub use error::{GridShapeIssue, GridSurfaceError};
pub use grid::PointGrid;
pub use isocurve::{Isocurve, IsocurveDirection, IsocurveOptions, sample_isocurves};
pub use kernel::{
    GeometryKernel, KernelError, KernelSurface, NativeKernel, SurfaceRequest, Triangulation,
};
pub use knots::{KnotVector, resolve_degree, synthesize_knots};
pub use mesh::{MeshOptions, SurfaceMesh, extract_mesh};
pub use metrics::{GeomMetrics, GeomTimingReport, TimingBucket};
pub use surface::{NurbsSurface, Surface};
pub use tessellation::{
    GridResolution, SurfaceTessellationOptions, choose_surface_grid_counts,
    tessellate_surface_grid,
};
pub use triangulation::triangulate_grid;

#[cfg(test)]
mod tests;
