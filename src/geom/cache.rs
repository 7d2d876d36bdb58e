//! Explicit, caller-owned cache of constructed surfaces and their meshes.
//!
//! Surfaces are keyed by a [`SurfaceFingerprint`] of the grid (dimensions and
//! exact coordinate bits) plus the requested degrees. Meshes are keyed by the
//! surface fingerprint and the exact deflection bits.
//!
//! ```ignore
//! let mut cache = SurfaceCache::new();
//! let surface = cache.get_or_build(&grid, &SurfaceBuildOptions::default())?;
//! let mesh = cache.get_or_mesh(&grid, &SurfaceBuildOptions::default(), &MeshOptions::default())?;
//! println!("hit rate: {:.2}", cache.stats().hit_rate());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::builder::{GridSurface, SurfaceBuildOptions, SurfaceHandle, build_surface};
use super::error::GridSurfaceError;
use super::grid::PointGrid;
use super::mesh::{MeshOptions, SurfaceMesh};

/// Identity of a build request: grid dimensions, coordinate bits and requested degrees.
///
/// Two fingerprints are equal only when every coordinate is bit-identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceFingerprint {
    rows: usize,
    cols: usize,
    degree_u: usize,
    degree_v: usize,
    coord_bits: Vec<u64>,
}

impl SurfaceFingerprint {
    #[must_use]
    pub fn new(grid: &PointGrid, options: &SurfaceBuildOptions) -> Self {
        let coord_bits = grid
            .points()
            .iter()
            .flat_map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
            .collect();
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            degree_u: options.degree_u,
            degree_v: options.degree_v,
            coord_bits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MeshKey {
    surface: SurfaceFingerprint,
    deflection_bits: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceCacheStats {
    pub surface_entries: usize,
    pub mesh_entries: usize,
    pub surface_hits: usize,
    pub surface_misses: usize,
    pub mesh_hits: usize,
    pub mesh_misses: usize,
}

impl SurfaceCacheStats {
    #[must_use]
    pub const fn total_hits(&self) -> usize {
        self.surface_hits + self.mesh_hits
    }

    #[must_use]
    pub const fn total_misses(&self) -> usize {
        self.surface_misses + self.mesh_misses
    }

    /// Hit rate in `[0, 1]`; 0 when nothing has been looked up yet.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_hits() + self.total_misses();
        if total == 0 {
            0.0
        } else {
            self.total_hits() as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct SurfaceCache {
    surfaces: HashMap<SurfaceFingerprint, Arc<GridSurface>>,
    meshes: HashMap<MeshKey, Arc<SurfaceMesh>>,
    surface_hits: usize,
    surface_misses: usize,
    mesh_hits: usize,
    mesh_misses: usize,
}

impl SurfaceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stats(&self) -> SurfaceCacheStats {
        SurfaceCacheStats {
            surface_entries: self.surfaces.len(),
            mesh_entries: self.meshes.len(),
            surface_hits: self.surface_hits,
            surface_misses: self.surface_misses,
            mesh_hits: self.mesh_hits,
            mesh_misses: self.mesh_misses,
        }
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&mut self) {
        self.surfaces.clear();
        self.meshes.clear();
        self.reset_counters();
    }

    pub fn reset_counters(&mut self) {
        self.surface_hits = 0;
        self.surface_misses = 0;
        self.mesh_hits = 0;
        self.mesh_misses = 0;
    }

    #[must_use]
    pub fn contains(&self, fingerprint: &SurfaceFingerprint) -> bool {
        self.surfaces.contains_key(fingerprint)
    }

    /// Returns the cached surface for `grid` and `options`, building it on a miss.
    ///
    /// Failed builds are not cached.
    pub fn get_or_build(
        &mut self,
        grid: &PointGrid,
        options: &SurfaceBuildOptions,
    ) -> Result<Arc<GridSurface>, GridSurfaceError> {
        let key = SurfaceFingerprint::new(grid, options);
        if let Some(cached) = self.surfaces.get(&key) {
            self.surface_hits += 1;
            return Ok(Arc::clone(cached));
        }
        self.surface_misses += 1;
        let surface = Arc::new(build_surface(grid, options)?);
        self.surfaces.insert(key, Arc::clone(&surface));
        Ok(surface)
    }

    /// Returns the cached mesh of the surface for `grid` and `options` at the
    /// requested deflection, building the surface and/or mesh on a miss.
    pub fn get_or_mesh(
        &mut self,
        grid: &PointGrid,
        options: &SurfaceBuildOptions,
        mesh_options: &MeshOptions,
    ) -> Result<Arc<SurfaceMesh>, GridSurfaceError> {
        let key = MeshKey {
            surface: SurfaceFingerprint::new(grid, options),
            deflection_bits: mesh_options.deflection.to_bits(),
        };
        if let Some(cached) = self.meshes.get(&key) {
            self.mesh_hits += 1;
            return Ok(Arc::clone(cached));
        }
        self.mesh_misses += 1;
        let surface = self.get_or_build(grid, options)?;
        let mesh = Arc::new(surface.mesh(mesh_options)?);
        self.meshes.insert(key, Arc::clone(&mesh));
        Ok(mesh)
    }
}
