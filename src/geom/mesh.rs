use std::collections::HashMap;

use serde::Serialize;

use super::core::{Point3, Tolerance};
use super::diagnostics::MeshDiagnostics;
use super::error::GridSurfaceError;
use super::kernel::{GeometryKernel, Triangulation};

/// Triangle mesh of a surface: world-space vertices and 0-based triangle indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SurfaceMesh {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

impl SurfaceMesh {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.vertices.iter().flatten().any(|c| !c.is_finite())
    }

    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let count = self.vertices.len();
        self.triangles.iter().flatten().all(|&i| (i as usize) < count)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.has_invalid_vertices() {
            return Err("mesh contains non-finite vertices".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh contains out-of-range indices".to_string());
        }
        Ok(())
    }

    #[must_use]
    pub fn positions_flat(&self) -> Vec<f64> {
        self.vertices.iter().flatten().copied().collect()
    }

    #[must_use]
    pub fn indices_flat(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

/// Mesh query settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshOptions {
    /// Maximum allowed distance between the mesh and the surface. Must be finite and > 0.
    pub deflection: f64,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self { deflection: 0.01 }
    }
}

impl MeshOptions {
    #[must_use]
    pub const fn new(deflection: f64) -> Self {
        Self { deflection }
    }
}

/// Tessellates `surface` with `kernel` and repackages the result.
///
/// The kernel reports 1-based node and triangle indices plus a location
/// transform; the returned mesh has the transform applied and 0-based indices.
/// Triangle winding is kept as the kernel produced it.
pub fn extract_mesh<K: GeometryKernel>(
    kernel: &K,
    surface: &K::Surface,
    options: &MeshOptions,
) -> Result<(SurfaceMesh, MeshDiagnostics), GridSurfaceError> {
    let deflection = options.deflection;
    if !deflection.is_finite() || deflection <= 0.0 {
        return Err(GridSurfaceError::mesh(format!(
            "deflection must be finite and > 0, got {deflection}"
        )));
    }

    let triangulation = kernel.triangulate(surface, deflection).map_err(|err| {
        log::warn!("kernel triangulation failed: {err}");
        GridSurfaceError::mesh(err.to_string())
    })?;

    let (mesh, mut diagnostics) = repackage(triangulation)?;

    diagnostics.vertex_count = mesh.vertex_count();
    diagnostics.triangle_count = mesh.triangle_count();
    diagnostics.boundary_edge_count = count_boundary_edges(&mesh.triangles);
    diagnostics.deflection = deflection;
    if !diagnostics.deflection_reached() {
        log::warn!(
            "mesh deviation {:.3e} exceeds deflection {deflection:.3e}",
            diagnostics.estimated_deviation
        );
    }

    log::debug!("extracted mesh {}", diagnostics.summary());
    Ok((mesh, diagnostics))
}

fn repackage(triangulation: Triangulation) -> Result<(SurfaceMesh, MeshDiagnostics), GridSurfaceError> {
    let Triangulation {
        nodes,
        triangles,
        location,
        diagnostics,
    } = triangulation;

    if nodes.is_empty() || triangles.is_empty() {
        return Err(GridSurfaceError::mesh("triangulation is empty"));
    }

    let mut vertices = Vec::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        let p = location.apply_point(*node);
        if !p.is_finite() {
            return Err(GridSurfaceError::mesh(format!(
                "node {} is not finite",
                i + 1
            )));
        }
        vertices.push(p.to_array());
    }

    let node_count = nodes.len() as u32;
    let mut out = Vec::with_capacity(triangles.len());
    for (t, tri) in triangles.iter().enumerate() {
        let mut zero_based = [0u32; 3];
        for (slot, &index) in zero_based.iter_mut().zip(tri) {
            if index == 0 || index > node_count {
                return Err(GridSurfaceError::mesh(format!(
                    "triangle {} references node {index} outside 1..={node_count}",
                    t + 1
                )));
            }
            *slot = index - 1;
        }
        out.push(zero_based);
    }

    Ok((
        SurfaceMesh {
            vertices,
            triangles: out,
        },
        diagnostics,
    ))
}

/// Edges referenced by exactly one triangle.
pub(crate) fn count_boundary_edges(triangles: &[[u32; 3]]) -> usize {
    let mut edges: HashMap<(u32, u32), usize> = HashMap::with_capacity(triangles.len() * 3);
    for &[a, b, c] in triangles {
        for (x, y) in [(a, b), (b, c), (c, a)] {
            *edges.entry((x.min(y), x.max(y))).or_default() += 1;
        }
    }
    edges.values().filter(|&&n| n == 1).count()
}

/// Merges vertices closer than `tol` using a quantised spatial hash.
///
/// Returns the welded points, remapped triangles and the number of merged vertices.
pub(crate) fn weld_vertices(
    points: Vec<Point3>,
    triangles: Vec<[u32; 3]>,
    tol: Tolerance,
) -> (Vec<Point3>, Vec<[u32; 3]>, usize) {
    if !tol.eps.is_finite() || tol.eps <= 0.0 {
        return (points, triangles, 0);
    }

    let inv = 1.0 / tol.eps;
    let quantize =
        |value: f64| (value * inv).floor().clamp(i64::MIN as f64, i64::MAX as f64) as i64;

    let mut buckets: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    let mut remap = Vec::with_capacity(points.len());
    let mut out_points: Vec<Point3> = Vec::with_capacity(points.len());

    for p in points.iter().copied() {
        if !p.is_finite() {
            remap.push(out_points.len() as u32);
            out_points.push(p);
            continue;
        }

        let key = (quantize(p.x), quantize(p.y), quantize(p.z));
        let mut found = None;
        'search: for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                for dz in -1i64..=1 {
                    let Some(candidates) = buckets.get(&(key.0 + dx, key.1 + dy, key.2 + dz)) else {
                        continue;
                    };
                    if let Some(&cand) = candidates
                        .iter()
                        .find(|&&c| tol.approx_eq_point3(out_points[c as usize], p))
                    {
                        found = Some(cand);
                        break 'search;
                    }
                }
            }
        }

        let index = found.unwrap_or_else(|| {
            let new_index = out_points.len() as u32;
            out_points.push(p);
            buckets.entry(key).or_default().push(new_index);
            new_index
        });
        remap.push(index);
    }

    let triangles = triangles
        .into_iter()
        .map(|tri| tri.map(|i| remap.get(i as usize).copied().unwrap_or(i)))
        .collect();

    let welded = points.len().saturating_sub(out_points.len());
    (out_points, triangles, welded)
}

/// Drops triangles with repeated indices, coincident corners or near-zero area.
pub(crate) fn cull_degenerate_triangles(
    points: &[Point3],
    triangles: Vec<[u32; 3]>,
    tol: Tolerance,
) -> (Vec<[u32; 3]>, usize) {
    let before = triangles.len();
    let kept: Vec<[u32; 3]> = triangles
        .into_iter()
        .filter(|&[i0, i1, i2]| {
            if i0 == i1 || i1 == i2 || i0 == i2 {
                return false;
            }
            let (Some(&a), Some(&b), Some(&c)) = (
                points.get(i0 as usize),
                points.get(i1 as usize),
                points.get(i2 as usize),
            ) else {
                return false;
            };
            if tol.approx_eq_point3(a, b) || tol.approx_eq_point3(b, c) || tol.approx_eq_point3(a, c) {
                return false;
            }
            let area2 = b.sub_point(a).cross(c.sub_point(a)).length_squared();
            area2.is_finite() && area2 > tol.eps_squared() * tol.eps_squared()
        })
        .collect();

    let removed = before - kept.len();
    (kept, removed)
}

/// Removes vertices no triangle references and renumbers the triangles.
pub(crate) fn drop_unreferenced_vertices(
    points: Vec<Point3>,
    triangles: Vec<[u32; 3]>,
) -> (Vec<Point3>, Vec<[u32; 3]>) {
    let mut used = vec![false; points.len()];
    for &i in triangles.iter().flatten() {
        if let Some(flag) = used.get_mut(i as usize) {
            *flag = true;
        }
    }
    if used.iter().all(|&u| u) {
        return (points, triangles);
    }

    let mut remap = vec![u32::MAX; points.len()];
    let mut kept = Vec::with_capacity(points.len());
    for (i, p) in points.into_iter().enumerate() {
        if used[i] {
            remap[i] = kept.len() as u32;
            kept.push(p);
        }
    }
    let triangles = triangles
        .into_iter()
        .map(|tri| tri.map(|i| remap[i as usize]))
        .collect();
    (kept, triangles)
}
