//! Adaptive grid sampling of open parametric surfaces.
//!
//! [`choose_surface_grid_counts`] starts from a coarse `u_count x v_count` grid
//! and doubles the count in whichever direction shows the larger chordal error
//! until the bilinear approximation of every sampled cell is within
//! `max_deviation`, or the counts hit their caps. [`tessellate_surface_grid`]
//! then evaluates the surface on that grid.
//!
//! Each cell is later split into two triangles along its `(u1, v0)-(u0, v1)`
//! diagonal, so error is measured per cell as the distance between the true
//! surface and
//! - the chord of each U edge at its midpoint,
//! - the chord of each V edge at its midpoint,
//! - the chord of the split diagonal at its midpoint,
//! - the centroid of each of the two triangles,
//! - the bilinear interpolation of the four corners at the cell centre.

use super::core::Point3;
use super::surface::Surface;

/// Upper bound on cells sampled per direction when estimating error.
const MAX_SAMPLED_CELLS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceTessellationOptions {
    /// Maximum allowed distance between the sampled grid and the true surface.
    pub max_deviation: f64,
    pub max_u_count: usize,
    pub max_v_count: usize,
    pub initial_u_count: usize,
    pub initial_v_count: usize,
    pub max_iterations: usize,
}

impl Default for SurfaceTessellationOptions {
    fn default() -> Self {
        Self {
            max_deviation: 0.01,
            max_u_count: 256,
            max_v_count: 256,
            initial_u_count: 8,
            initial_v_count: 8,
            max_iterations: 16,
        }
    }
}

impl SurfaceTessellationOptions {
    #[must_use]
    pub fn new(max_deviation: f64) -> Self {
        Self {
            max_deviation,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_max_counts(mut self, max_u_count: usize, max_v_count: usize) -> Self {
        self.max_u_count = max_u_count;
        self.max_v_count = max_v_count;
        self
    }

    #[must_use]
    pub const fn with_initial_counts(mut self, u_count: usize, v_count: usize) -> Self {
        self.initial_u_count = u_count;
        self.initial_v_count = v_count;
        self
    }
}

/// Grid resolution picked by [`choose_surface_grid_counts`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridResolution {
    pub u_count: usize,
    pub v_count: usize,
    /// Largest deviation measured at this resolution.
    pub deviation: f64,
    /// False when the caps stopped refinement before `max_deviation` was met.
    pub converged: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct GridError {
    along_u: f64,
    along_v: f64,
    /// Diagonal midpoints, triangle centroids and the bilinear centre.
    interior: f64,
}

impl GridError {
    fn max(self) -> f64 {
        self.along_u.max(self.along_v).max(self.interior)
    }
}

#[must_use]
pub fn choose_surface_grid_counts(
    surface: &impl Surface,
    options: SurfaceTessellationOptions,
) -> GridResolution {
    let mut u_count = options.initial_u_count.max(2);
    let mut v_count = options.initial_v_count.max(2);
    let u_max = options.max_u_count.max(u_count);
    let v_max = options.max_v_count.max(v_count);

    let tol = options.max_deviation;
    let mut error = estimate_surface_grid_error(surface, u_count, v_count);

    if !tol.is_finite() || tol <= 0.0 {
        return GridResolution {
            u_count,
            v_count,
            deviation: error.max(),
            converged: false,
        };
    }

    for _ in 0..options.max_iterations.max(1) {
        if error.max() <= tol {
            break;
        }

        let prev = (u_count, v_count);

        let mut refine_u = error.along_u > tol;
        let mut refine_v = error.along_v > tol;
        if !refine_u && !refine_v {
            // Only the interior (twist) terms fail; they shrink with both directions.
            refine_u = true;
            refine_v = true;
        }

        if refine_u && u_count < u_max {
            u_count = u_count.saturating_mul(2).saturating_sub(1).min(u_max);
        }
        if refine_v && v_count < v_max {
            v_count = v_count.saturating_mul(2).saturating_sub(1).min(v_max);
        }

        // A capped direction hands its share of refinement to the other one.
        if (u_count, v_count) == prev {
            if u_count < u_max {
                u_count = u_count.saturating_mul(2).saturating_sub(1).min(u_max);
            } else if v_count < v_max {
                v_count = v_count.saturating_mul(2).saturating_sub(1).min(v_max);
            } else {
                break;
            }
        }

        error = estimate_surface_grid_error(surface, u_count, v_count);
    }

    let deviation = error.max();
    GridResolution {
        u_count,
        v_count,
        deviation,
        converged: deviation <= tol,
    }
}

/// Evaluates `surface` on a `u_count x v_count` grid spanning its full domain.
///
/// Points are row-major with U varying fastest. Both ends of each domain are
/// hit exactly.
#[must_use]
pub fn tessellate_surface_grid(
    surface: &impl Surface,
    u_count: usize,
    v_count: usize,
) -> Vec<Point3> {
    let u_count = u_count.max(2);
    let v_count = v_count.max(2);
    let us = grid_params(surface.domain_u(), u_count);
    let vs = grid_params(surface.domain_v(), v_count);

    let mut points = Vec::with_capacity(u_count * v_count);
    for &v in &vs {
        for &u in &us {
            points.push(surface.point_at(u, v));
        }
    }
    points
}

/// `count` evenly spaced parameters over `(start, end)`, ends exact.
pub(crate) fn grid_params((start, end): (f64, f64), count: usize) -> Vec<f64> {
    let span = end - start;
    if count < 2 || !span.is_finite() || span == 0.0 {
        return vec![start; count.max(1)];
    }
    let denom = (count - 1) as f64;
    (0..count)
        .map(|i| {
            if i + 1 == count {
                end
            } else {
                start + span * (i as f64 / denom)
            }
        })
        .collect()
}

fn estimate_surface_grid_error(surface: &impl Surface, u_count: usize, v_count: usize) -> GridError {
    let us = grid_params(surface.domain_u(), u_count);
    let vs = grid_params(surface.domain_v(), v_count);

    let quad_u = us.len().saturating_sub(1);
    let quad_v = vs.len().saturating_sub(1);
    let step_u = (quad_u / quad_u.min(MAX_SAMPLED_CELLS).max(1)).max(1);
    let step_v = (quad_v / quad_v.min(MAX_SAMPLED_CELLS).max(1)).max(1);

    let mut error = GridError::default();
    for j in (0..quad_v).step_by(step_v) {
        let (va, vb) = (vs[j], vs[j + 1]);
        let vm = 0.5 * (va + vb);
        for i in (0..quad_u).step_by(step_u) {
            let (ua, ub) = (us[i], us[i + 1]);
            let um = 0.5 * (ua + ub);

            let p00 = surface.point_at(ua, va);
            let p10 = surface.point_at(ub, va);
            let p01 = surface.point_at(ua, vb);
            let p11 = surface.point_at(ub, vb);

            let du0 = surface.point_at(um, va).distance_to(p00.lerp(p10, 0.5));
            let du1 = surface.point_at(um, vb).distance_to(p01.lerp(p11, 0.5));
            let dv0 = surface.point_at(ua, vm).distance_to(p00.lerp(p01, 0.5));
            let dv1 = surface.point_at(ub, vm).distance_to(p10.lerp(p11, 0.5));

            let centre = surface.point_at(um, vm);
            let bilinear = p00.lerp(p10, 0.5).lerp(p01.lerp(p11, 0.5), 0.5);
            let dc = centre.distance_to(bilinear);
            let dd = centre.distance_to(p10.lerp(p01, 0.5));

            let (u_third, v_third) = ((ub - ua) / 3.0, (vb - va) / 3.0);
            let lower = surface
                .point_at(ua + u_third, va + v_third)
                .distance_to(centroid(p00, p10, p01));
            let upper = surface
                .point_at(ub - u_third, vb - v_third)
                .distance_to(centroid(p01, p10, p11));

            error.along_u = error.along_u.max(du0).max(du1);
            error.along_v = error.along_v.max(dv0).max(dv1);
            error.interior = error.interior.max(dc).max(dd).max(lower).max(upper);
        }
    }
    error
}

fn centroid(a: Point3, b: Point3, c: Point3) -> Point3 {
    Point3::new(
        (a.x + b.x + c.x) / 3.0,
        (a.y + b.y + c.y) / 3.0,
        (a.z + b.z + c.z) / 3.0,
    )
}
