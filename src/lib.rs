#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;

use std::fmt;

use geom::{
    GridSurface, Isocurve, IsocurveDirection, IsocurveOptions, MeshOptions, SurfaceBuildOptions,
    SurfaceHandle, build_surface_from_flat,
};
use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("failed to start rayon thread pool: {err}")))
}

const DEFAULT_DEGREE: u32 = 3;

#[derive(Debug, Serialize)]
struct MeshExport {
    vertices: Vec<[f64; 3]>,
    triangles: Vec<[u32; 3]>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

/// NURBS surface through a rows x cols grid of points.
#[wasm_bindgen]
pub struct NurbsGridSurface {
    inner: GridSurface,
}

#[wasm_bindgen]
impl NurbsGridSurface {
    /// `points` is a flat `x, y, z` buffer, row-major with columns fastest.
    /// Degrees default to 3 and are capped by the grid size.
    #[wasm_bindgen(constructor)]
    pub fn new(
        points: &[f64],
        rows: usize,
        cols: usize,
        degree_u: Option<u32>,
        degree_v: Option<u32>,
    ) -> Result<NurbsGridSurface, JsValue> {
        Self::build(points, rows, cols, degree_u, degree_v).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn rows(&self) -> usize {
        self.inner.rows()
    }

    #[wasm_bindgen]
    pub fn cols(&self) -> usize {
        self.inner.cols()
    }

    #[wasm_bindgen]
    pub fn degree_u(&self) -> usize {
        self.inner.resolved_degrees().0
    }

    #[wasm_bindgen]
    pub fn degree_v(&self) -> usize {
        self.inner.resolved_degrees().1
    }

    /// Control points as a flat `x, y, z` buffer in grid order.
    #[wasm_bindgen]
    pub fn control_points(&self) -> Vec<f64> {
        self.inner.control_points().into_iter().flatten().collect()
    }

    /// Samples `divisions + 1` isocurves; `u_direction` selects curves running along U.
    ///
    /// U follows the grid columns and V the rows, so a U isocurve runs across
    /// the columns at a fixed row parameter, and `u_direction = false` gives
    /// curves running down the rows at a fixed column parameter.
    #[wasm_bindgen]
    pub fn isocurves(
        &self,
        u_direction: bool,
        divisions: u32,
        points_per_curve: Option<u32>,
    ) -> Result<JsValue, JsValue> {
        let curves = self
            .isocurve_export(u_direction, divisions, points_per_curve)
            .map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&curves).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Triangle mesh with 0-based indices. `deflection` defaults to 0.01.
    #[wasm_bindgen]
    pub fn mesh(&self, deflection: Option<f64>) -> Result<JsValue, JsValue> {
        let mesh = self.mesh_export(deflection).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&mesh).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl NurbsGridSurface {
    fn build(
        points: &[f64],
        rows: usize,
        cols: usize,
        degree_u: Option<u32>,
        degree_v: Option<u32>,
    ) -> Result<Self, geom::GridSurfaceError> {
        let options = SurfaceBuildOptions::new(
            degree_u.unwrap_or(DEFAULT_DEGREE) as usize,
            degree_v.unwrap_or(DEFAULT_DEGREE) as usize,
        );
        let inner = build_surface_from_flat(points, rows, cols, &options)?;
        Ok(Self { inner })
    }

    fn isocurve_export(
        &self,
        u_direction: bool,
        divisions: u32,
        points_per_curve: Option<u32>,
    ) -> Result<Vec<Isocurve>, geom::GridSurfaceError> {
        let mut options = IsocurveOptions::default().with_divisions(divisions as usize);
        if let Some(count) = points_per_curve {
            options = options.with_points_per_curve(count as usize);
        }
        self.inner
            .isocurves(IsocurveDirection::from_u_direction(u_direction), &options)
    }

    fn mesh_export(&self, deflection: Option<f64>) -> Result<MeshExport, geom::GridSurfaceError> {
        let options = deflection.map_or_else(MeshOptions::default, MeshOptions::new);
        let (mesh, diagnostics) = self.inner.mesh_with_diagnostics(&options)?;
        Ok(MeshExport {
            vertices: mesh.vertices,
            triangles: mesh.triangles,
            warnings: diagnostics.warnings,
        })
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::NurbsGridSurface;
    use crate::geom::{GridShapeIssue, GridSurfaceError};

    fn plane(rows: usize, cols: usize) -> Vec<f64> {
        (0..rows)
            .flat_map(|r| (0..cols).flat_map(move |c| [c as f64, r as f64, 0.0]))
            .collect()
    }

    #[test]
    fn degrees_default_to_cubic_and_are_capped() {
        let surface = NurbsGridSurface::build(&plane(4, 5), 4, 5, None, None).unwrap();
        assert_eq!((surface.degree_u(), surface.degree_v()), (3, 3));

        let surface = NurbsGridSurface::build(&plane(2, 5), 2, 5, None, Some(2)).unwrap();
        assert_eq!((surface.degree_u(), surface.degree_v()), (3, 1));
        assert_eq!((surface.rows(), surface.cols()), (2, 5));
    }

    #[test]
    fn control_points_are_returned_flat() {
        let coords = plane(3, 3);
        let surface = NurbsGridSurface::build(&coords, 3, 3, Some(2), Some(2)).unwrap();
        assert_eq!(surface.control_points(), coords);
    }

    #[test]
    fn build_reports_grid_errors() {
        let err = NurbsGridSurface::build(&plane(3, 3), 3, 4, None, None)
            .err()
            .unwrap();
        assert_eq!(
            err,
            GridSurfaceError::InvalidGridDimensions {
                rows: 3,
                cols: 4,
                issue: GridShapeIssue::LengthMismatch {
                    expected: 36,
                    provided: 27
                }
            }
        );
    }

    #[test]
    fn isocurve_export_uses_default_sampling() {
        let surface = NurbsGridSurface::build(&plane(3, 3), 3, 3, None, None).unwrap();
        let curves = surface.isocurve_export(true, 3, None).unwrap();
        assert_eq!(curves.len(), 4);
        assert!(curves.iter().all(|c| c.points.len() == 50));

        let curves = surface.isocurve_export(false, 0, Some(2)).unwrap();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].points.len(), 2);
    }

    #[test]
    fn u_direction_curves_run_across_columns() {
        let surface = NurbsGridSurface::build(&plane(3, 4), 3, 4, None, None).unwrap();

        let across = surface.isocurve_export(true, 2, Some(4)).unwrap();
        assert_eq!(across.len(), 3);
        for curve in &across {
            let first = curve.points[0];
            let last = curve.points[3];
            assert!(curve.points.iter().all(|p| (p[1] - first[1]).abs() < 1e-12));
            assert!(first[0].abs() < 1e-12 && (last[0] - 3.0).abs() < 1e-12);
        }

        let down = surface.isocurve_export(false, 3, Some(4)).unwrap();
        assert_eq!(down.len(), 4);
        for curve in &down {
            let first = curve.points[0];
            let last = curve.points[3];
            assert!(curve.points.iter().all(|p| (p[0] - first[0]).abs() < 1e-12));
            assert!(first[1].abs() < 1e-12 && (last[1] - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn mesh_export_is_zero_based() {
        let surface = NurbsGridSurface::build(&plane(3, 3), 3, 3, None, None).unwrap();
        let mesh = surface.mesh_export(None).unwrap();
        let count = mesh.vertices.len() as u32;
        assert!(!mesh.triangles.is_empty());
        assert!(mesh.triangles.iter().flatten().all(|&i| i < count));
        assert!(surface.mesh_export(Some(0.0)).is_err());
    }
}
