//! Diagnostics collected while tessellating a grid surface.

use std::fmt;

use super::metrics::GeomTimingReport;

/// Counts and warnings produced alongside a [`super::mesh::SurfaceMesh`].
///
/// Kernels fill in what they know about their own tessellation (grid
/// resolution, welds, culls, deviation estimate); the mesh extractor adds
/// the final counts and timing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshDiagnostics {
    pub vertex_count: usize,
    pub triangle_count: usize,

    /// Sampling grid chosen by the tessellator, if it used one.
    pub grid_u_count: usize,
    pub grid_v_count: usize,

    /// Vertices merged during tolerance-based welding.
    pub welded_vertex_count: usize,

    /// Zero-area or collapsed triangles removed.
    pub degenerate_triangle_count: usize,

    /// Edges used by exactly one triangle. An open surface patch always has some.
    pub boundary_edge_count: usize,

    /// Requested deflection.
    pub deflection: f64,

    /// Largest chordal deviation the tessellator measured at its final resolution.
    pub estimated_deviation: f64,

    pub timing: Option<GeomTimingReport>,

    pub warnings: Vec<String>,
}

impl MeshDiagnostics {
    /// True when the estimated deviation is within the requested deflection.
    #[must_use]
    pub fn deflection_reached(&self) -> bool {
        self.estimated_deviation <= self.deflection
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    #[must_use]
    pub fn repair_count(&self) -> usize {
        self.welded_vertex_count + self.degenerate_triangle_count
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Short single-line form for log output: `"V:{vertices} T:{triangles} [extras]"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("V:{} T:{}", self.vertex_count, self.triangle_count)];

        if self.grid_u_count > 0 && self.grid_v_count > 0 {
            parts.push(format!("grid:{}x{}", self.grid_u_count, self.grid_v_count));
        }
        if self.welded_vertex_count > 0 {
            parts.push(format!("welded:{}", self.welded_vertex_count));
        }
        if self.degenerate_triangle_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_triangle_count));
        }
        if !self.warnings.is_empty() {
            parts.push(format!("warnings:{}", self.warnings.len()));
        }

        parts.join(" ")
    }
}

impl fmt::Display for MeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        if self.grid_u_count > 0 && self.grid_v_count > 0 {
            writeln!(f, "  Grid: {}x{}", self.grid_u_count, self.grid_v_count)?;
        }
        writeln!(
            f,
            "  Deviation: {:.6} (deflection {:.6})",
            self.estimated_deviation, self.deflection
        )?;

        if self.repair_count() > 0 {
            writeln!(f, "  Repairs:")?;
            if self.welded_vertex_count > 0 {
                writeln!(f, "    - Welded vertices: {}", self.welded_vertex_count)?;
            }
            if self.degenerate_triangle_count > 0 {
                writeln!(
                    f,
                    "    - Degenerate triangles removed: {}",
                    self.degenerate_triangle_count
                )?;
            }
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        if let Some(ref timing) = self.timing {
            writeln!(f, "  Timing: {} ms total", timing.total_ms())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_warnings() {
        let diag = MeshDiagnostics::default();
        assert!(!diag.has_warnings());
        assert_eq!(diag.repair_count(), 0);
        assert!(diag.deflection_reached());
    }

    #[test]
    fn test_summary() {
        let diag = MeshDiagnostics {
            vertex_count: 81,
            triangle_count: 128,
            grid_u_count: 9,
            grid_v_count: 9,
            welded_vertex_count: 2,
            ..Default::default()
        };

        let summary = diag.summary();
        assert!(summary.contains("V:81"));
        assert!(summary.contains("T:128"));
        assert!(summary.contains("grid:9x9"));
        assert!(summary.contains("welded:2"));
    }

    #[test]
    fn test_display_lists_warnings() {
        let mut diag = MeshDiagnostics {
            vertex_count: 4,
            triangle_count: 2,
            deflection: 0.01,
            estimated_deviation: 0.5,
            ..Default::default()
        };
        diag.add_warning("deflection not reached within grid cap");

        let output = diag.to_string();
        assert!(output.contains("Vertices: 4"));
        assert!(output.contains("deflection not reached"));
        assert!(!diag.deflection_reached());
    }
}
