//! Boundary between knot/degree bookkeeping and the surface evaluator.
//!
//! A [`GeometryKernel`] turns a fully specified [`SurfaceRequest`] into an
//! evaluable surface and triangulates that surface within a deflection.
//! Triangulations follow the usual kernel convention: node and triangle
//! indices are 1-based and nodes live in a local frame given by `location`.
//!
//! [`NativeKernel`] is the in-crate implementation.

use super::core::{Point3, Tolerance, Transform};
use super::diagnostics::MeshDiagnostics;
use super::mesh::{cull_degenerate_triangles, drop_unreferenced_vertices, weld_vertices};
use super::metrics::{GeomMetrics, TimingBucket};
use super::surface::{NurbsSurface, Surface};
use super::tessellation::{
    SurfaceTessellationOptions, choose_surface_grid_counts, tessellate_surface_grid,
};
use super::triangulation::triangulate_grid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("periodic surfaces are not supported")]
    PeriodicUnsupported,
    #[error("{what} length mismatch: expected {expected}, got {provided}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        provided: usize,
    },
    #[error("{direction} degree {degree} is out of range for {pole_count} poles")]
    DegreeOutOfRange {
        direction: &'static str,
        degree: usize,
        pole_count: usize,
    },
    #[error("{direction} knots must be finite and strictly increasing")]
    NonIncreasingKnots { direction: &'static str },
    #[error("{direction} multiplicities sum to {provided}, expected {expected}")]
    MultiplicitySum {
        direction: &'static str,
        expected: usize,
        provided: usize,
    },
    #[error("{direction} end multiplicity {multiplicity} exceeds order {order}")]
    MultiplicityTooHigh {
        direction: &'static str,
        multiplicity: usize,
        order: usize,
    },
    #[error("pole {index} is not finite")]
    NonFinitePole { index: usize },
    #[error("weight {index} must be finite and > 0")]
    InvalidWeight { index: usize },
    #[error("invalid surface: {0}")]
    InvalidSurface(String),
    #[error("triangulation failed: {0}")]
    TriangulationFailed(String),
}

/// Everything a kernel needs to construct a non-periodic NURBS surface.
///
/// Poles and weights are row-major with U varying fastest:
/// `poles[v_index * u_count + u_index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceRequest {
    pub u_count: usize,
    pub v_count: usize,
    pub poles: Vec<Point3>,
    pub weights: Vec<f64>,
    pub knots_u: Vec<f64>,
    pub mults_u: Vec<usize>,
    pub knots_v: Vec<f64>,
    pub mults_v: Vec<usize>,
    pub degree_u: usize,
    pub degree_v: usize,
    pub periodic_u: bool,
    pub periodic_v: bool,
}

/// Read-back access to a constructed kernel surface.
pub trait KernelSurface {
    /// Poles in the same row-major layout they were requested in.
    fn poles(&self) -> &[Point3];

    /// `(u_count, v_count)`.
    fn pole_counts(&self) -> (usize, usize);

    /// `(u_min, u_max, v_min, v_max)`.
    fn bounds(&self) -> (f64, f64, f64, f64);
}

/// Kernel output for a tessellated surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    pub nodes: Vec<Point3>,
    /// 1-based indices into `nodes`.
    pub triangles: Vec<[u32; 3]>,
    /// Maps `nodes` into world space.
    pub location: Transform,
    /// Whatever the kernel can report about its own tessellation.
    pub diagnostics: MeshDiagnostics,
}

pub trait GeometryKernel: Send + Sync {
    type Surface: Surface + KernelSurface + Send + Sync;

    fn build_surface(&self, request: &SurfaceRequest) -> Result<Self::Surface, KernelError>;

    fn triangulate(
        &self,
        surface: &Self::Surface,
        deflection: f64,
    ) -> Result<Triangulation, KernelError>;
}

impl KernelSurface for NurbsSurface {
    fn poles(&self) -> &[Point3] {
        &self.control_points
    }

    fn pole_counts(&self) -> (usize, usize) {
        (self.u_count, self.v_count)
    }

    fn bounds(&self) -> (f64, f64, f64, f64) {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();
        (u0, u1, v0, v1)
    }
}

/// In-crate kernel: de Boor evaluation and adaptive grid tessellation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeKernel {
    /// Weld and degeneracy tolerance applied to tessellation nodes.
    pub tolerance: Tolerance,
    /// Cap on tessellation grid points per direction.
    pub max_grid_count: usize,
    /// Starting tessellation grid points per direction.
    pub initial_grid_count: usize,
}

impl Default for NativeKernel {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::FACE,
            max_grid_count: 256,
            initial_grid_count: 8,
        }
    }
}

impl NativeKernel {
    #[must_use]
    pub const fn with_max_grid_count(mut self, count: usize) -> Self {
        self.max_grid_count = count;
        self
    }

    #[must_use]
    pub const fn with_initial_grid_count(mut self, count: usize) -> Self {
        self.initial_grid_count = count;
        self
    }

    fn tessellation_options(&self, deflection: f64) -> SurfaceTessellationOptions {
        SurfaceTessellationOptions::new(deflection)
            .with_initial_counts(self.initial_grid_count, self.initial_grid_count)
            .with_max_counts(self.max_grid_count, self.max_grid_count)
    }
}

fn validate_direction(
    direction: &'static str,
    knots: &[f64],
    mults: &[usize],
    degree: usize,
    pole_count: usize,
) -> Result<(), KernelError> {
    if knots.len() != mults.len() {
        return Err(KernelError::LengthMismatch {
            what: if direction == "u" { "u multiplicities" } else { "v multiplicities" },
            expected: knots.len(),
            provided: mults.len(),
        });
    }
    if degree == 0 || degree >= pole_count {
        return Err(KernelError::DegreeOutOfRange {
            direction,
            degree,
            pole_count,
        });
    }
    if knots.len() < 2
        || knots.iter().any(|k| !k.is_finite())
        || knots.windows(2).any(|w| w[0] >= w[1])
    {
        return Err(KernelError::NonIncreasingKnots { direction });
    }

    let order = degree + 1;
    let expected = pole_count + order;
    let provided: usize = mults.iter().sum();
    if provided != expected {
        return Err(KernelError::MultiplicitySum {
            direction,
            expected,
            provided,
        });
    }
    for multiplicity in [mults[0], mults[mults.len() - 1]] {
        if multiplicity > order {
            return Err(KernelError::MultiplicityTooHigh {
                direction,
                multiplicity,
                order,
            });
        }
    }
    Ok(())
}

fn expand_knots(knots: &[f64], mults: &[usize]) -> Vec<f64> {
    knots
        .iter()
        .zip(mults)
        .flat_map(|(&k, &m)| std::iter::repeat_n(k, m))
        .collect()
}

impl GeometryKernel for NativeKernel {
    type Surface = NurbsSurface;

    fn build_surface(&self, request: &SurfaceRequest) -> Result<NurbsSurface, KernelError> {
        if request.periodic_u || request.periodic_v {
            return Err(KernelError::PeriodicUnsupported);
        }

        let pole_count = request.u_count * request.v_count;
        if request.poles.len() != pole_count {
            return Err(KernelError::LengthMismatch {
                what: "poles",
                expected: pole_count,
                provided: request.poles.len(),
            });
        }
        if request.weights.len() != pole_count {
            return Err(KernelError::LengthMismatch {
                what: "weights",
                expected: pole_count,
                provided: request.weights.len(),
            });
        }

        validate_direction(
            "u",
            &request.knots_u,
            &request.mults_u,
            request.degree_u,
            request.u_count,
        )?;
        validate_direction(
            "v",
            &request.knots_v,
            &request.mults_v,
            request.degree_v,
            request.v_count,
        )?;

        if let Some(index) = request.poles.iter().position(|p| !p.is_finite()) {
            return Err(KernelError::NonFinitePole { index });
        }
        if let Some(index) = request
            .weights
            .iter()
            .position(|w| !w.is_finite() || *w <= 0.0)
        {
            return Err(KernelError::InvalidWeight { index });
        }

        NurbsSurface::new(
            request.degree_u,
            request.degree_v,
            request.u_count,
            request.v_count,
            request.poles.clone(),
            expand_knots(&request.knots_u, &request.mults_u),
            expand_knots(&request.knots_v, &request.mults_v),
            request.weights.clone(),
        )
        .map_err(KernelError::InvalidSurface)
    }

    fn triangulate(
        &self,
        surface: &NurbsSurface,
        deflection: f64,
    ) -> Result<Triangulation, KernelError> {
        if !deflection.is_finite() || deflection <= 0.0 {
            return Err(KernelError::TriangulationFailed(format!(
                "deflection must be finite and > 0, got {deflection}"
            )));
        }

        let mut metrics = GeomMetrics::default();
        metrics.begin();

        let options = self.tessellation_options(deflection);
        let (resolution, points) = metrics.time(TimingBucket::SurfaceTessellation, || {
            let resolution = choose_surface_grid_counts(surface, options);
            let points = tessellate_surface_grid(surface, resolution.u_count, resolution.v_count);
            (resolution, points)
        });
        let triangles = metrics.time(TimingBucket::Triangulation, || {
            triangulate_grid(resolution.u_count, resolution.v_count)
        });

        let tol = self.tolerance;
        let (points, triangles, welded, culled) = metrics.time(TimingBucket::Welding, || {
            let (points, triangles, welded) = weld_vertices(points, triangles, tol);
            let (triangles, culled) = cull_degenerate_triangles(&points, triangles, tol);
            let (points, triangles) = drop_unreferenced_vertices(points, triangles);
            (points, triangles, welded, culled)
        });

        if triangles.is_empty() {
            return Err(KernelError::TriangulationFailed(
                "surface is degenerate: every triangle collapsed".to_string(),
            ));
        }

        let mut diagnostics = MeshDiagnostics {
            grid_u_count: resolution.u_count,
            grid_v_count: resolution.v_count,
            welded_vertex_count: welded,
            degenerate_triangle_count: culled,
            deflection,
            estimated_deviation: resolution.deviation,
            timing: metrics.end(),
            ..MeshDiagnostics::default()
        };
        if !resolution.converged {
            diagnostics.add_warning(format!(
                "deflection {deflection} not reached within grid cap {}x{} (estimated deviation {:.3e})",
                resolution.u_count, resolution.v_count, resolution.deviation
            ));
        }

        Ok(Triangulation {
            nodes: points,
            triangles: triangles
                .into_iter()
                .map(|tri| tri.map(|i| i + 1))
                .collect(),
            location: Transform::identity(),
            diagnostics,
        })
    }
}
