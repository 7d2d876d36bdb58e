use super::core::Point3;
use super::error::{GridShapeIssue, GridSurfaceError};

/// Row-major rectangular grid of points.
///
/// Columns are the fastest-varying index and map to the surface U direction;
/// rows map to V. Once constructed the grid is always at least 2x2 and every
/// coordinate is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct PointGrid {
    rows: usize,
    cols: usize,
    points: Vec<Point3>,
}

impl PointGrid {
    /// Builds a grid from an interleaved `x, y, z` buffer of length `rows * cols * 3`.
    pub fn from_flat(coords: &[f64], rows: usize, cols: usize) -> Result<Self, GridSurfaceError> {
        let expected = coordinate_count(rows, cols)?;
        if coords.len() != expected {
            return Err(GridSurfaceError::grid(
                rows,
                cols,
                GridShapeIssue::LengthMismatch {
                    expected,
                    provided: coords.len(),
                },
            ));
        }

        let points = coords
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        Self::from_points(points, rows, cols)
    }

    pub fn from_points(points: Vec<Point3>, rows: usize, cols: usize) -> Result<Self, GridSurfaceError> {
        let expected = coordinate_count(rows, cols)?;
        if points.len() != expected / 3 {
            return Err(GridSurfaceError::grid(
                rows,
                cols,
                GridShapeIssue::LengthMismatch {
                    expected,
                    provided: points.len().saturating_mul(3),
                },
            ));
        }

        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(GridSurfaceError::NonFinitePoint { index });
        }

        Ok(Self { rows, cols, points })
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn point(&self, row: usize, col: usize) -> Option<Point3> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.points.get(row * self.cols + col).copied()
    }

    /// Flattened `x, y, z` coordinates in row-major order.
    #[must_use]
    pub fn to_flat(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| p.to_array()).collect()
    }
}

/// Number of `f64` coordinates a `rows x cols` grid holds.
fn coordinate_count(rows: usize, cols: usize) -> Result<usize, GridSurfaceError> {
    if rows < 2 || cols < 2 {
        return Err(GridSurfaceError::grid(rows, cols, GridShapeIssue::TooSmall));
    }
    rows.checked_mul(cols)
        .and_then(|count| count.checked_mul(3))
        .ok_or_else(|| GridSurfaceError::grid(rows, cols, GridShapeIssue::TooLarge))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_flat_is_row_major() {
        let coords = [
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 2.0, 1.0, 0.5,
        ];
        let grid = PointGrid::from_flat(&coords, 2, 3).unwrap();

        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.point(1, 2), Some(Point3::new(2.0, 1.0, 0.5)));
        assert_eq!(grid.point(0, 1), Some(Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(grid.point(2, 0), None);
        assert_eq!(grid.to_flat(), coords.to_vec());
    }

    #[test]
    fn single_row_is_rejected_before_length_check() {
        let err = PointGrid::from_flat(&[0.0; 4], 1, 5).unwrap_err();
        assert_eq!(
            err,
            GridSurfaceError::InvalidGridDimensions {
                rows: 1,
                cols: 5,
                issue: GridShapeIssue::TooSmall
            }
        );
    }

    #[test]
    fn buffer_length_mismatch() {
        let err = PointGrid::from_flat(&[0.0; 11], 2, 2).unwrap_err();
        assert_eq!(
            err,
            GridSurfaceError::InvalidGridDimensions {
                rows: 2,
                cols: 2,
                issue: GridShapeIssue::LengthMismatch {
                    expected: 12,
                    provided: 11
                }
            }
        );
        assert!(err.is_input_error());

        let err = PointGrid::from_points(vec![Point3::ORIGIN; 3], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            GridSurfaceError::InvalidGridDimensions {
                issue: GridShapeIssue::LengthMismatch {
                    expected: 12,
                    provided: 9
                },
                ..
            }
        ));
    }

    #[test]
    fn oversized_dimensions_are_rejected_without_overflow() {
        let err = PointGrid::from_flat(&[0.0; 12], usize::MAX / 2, 4).unwrap_err();
        assert_eq!(
            err,
            GridSurfaceError::InvalidGridDimensions {
                rows: usize::MAX / 2,
                cols: 4,
                issue: GridShapeIssue::TooLarge
            }
        );
        assert!(err.is_input_error());

        let err = PointGrid::from_points(vec![Point3::ORIGIN; 4], usize::MAX, usize::MAX).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn non_finite_coordinate_is_rejected() {
        let mut coords = vec![0.0; 12];
        coords[7] = f64::NAN;
        let err = PointGrid::from_flat(&coords, 2, 2).unwrap_err();
        assert_eq!(err, GridSurfaceError::NonFinitePoint { index: 2 });
    }
}
