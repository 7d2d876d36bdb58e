use super::kernel::KernelError;

/// Errors raised while building or querying a grid surface.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridSurfaceError {
    #[error("invalid grid dimensions: {rows}x{cols} ({issue})")]
    InvalidGridDimensions {
        rows: usize,
        cols: usize,
        issue: GridShapeIssue,
    },
    #[error("grid point {index} has a non-finite coordinate")]
    NonFinitePoint { index: usize },
    #[error("cannot build a knot vector for {point_count} points at degree {degree}")]
    DegenerateKnotVector { point_count: usize, degree: usize },
    #[error("isocurves need at least 2 points per curve, got {points_per_curve}")]
    InvalidSampling { points_per_curve: usize },
    #[error("surface construction failed: {0}")]
    SurfaceConstruction(#[from] KernelError),
    #[error("mesh extraction failed: {reason}")]
    MeshExtractionFailed { reason: String },
}

/// Why a `rows x cols` grid was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GridShapeIssue {
    #[error("minimum 2x2")]
    TooSmall,
    #[error("expected {expected} coordinates, got {provided}")]
    LengthMismatch { expected: usize, provided: usize },
    #[error("coordinate count does not fit in memory")]
    TooLarge,
}

impl GridSurfaceError {
    /// True when the caller can fix the failure by changing the request
    /// (grid, degrees, sampling or deflection), false for kernel-side failures.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidGridDimensions { .. }
                | Self::NonFinitePoint { .. }
                | Self::InvalidSampling { .. }
        )
    }

    pub(crate) fn grid(rows: usize, cols: usize, issue: GridShapeIssue) -> Self {
        Self::InvalidGridDimensions { rows, cols, issue }
    }

    pub(crate) fn mesh(reason: impl Into<String>) -> Self {
        Self::MeshExtractionFailed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_classified() {
        assert!(GridSurfaceError::grid(1, 5, GridShapeIssue::TooSmall).is_input_error());
        let mismatch = GridShapeIssue::LengthMismatch {
            expected: 12,
            provided: 9,
        };
        assert!(GridSurfaceError::grid(2, 2, mismatch).is_input_error());
        assert!(GridSurfaceError::grid(2, 2, GridShapeIssue::TooLarge).is_input_error());
        assert!(GridSurfaceError::InvalidSampling { points_per_curve: 1 }.is_input_error());
        assert!(!GridSurfaceError::mesh("empty triangulation").is_input_error());
        assert!(
            !GridSurfaceError::DegenerateKnotVector {
                point_count: 2,
                degree: 3
            }
            .is_input_error()
        );
    }

    #[test]
    fn messages_name_the_failure() {
        let err = GridSurfaceError::grid(1, 5, GridShapeIssue::TooSmall);
        assert_eq!(err.to_string(), "invalid grid dimensions: 1x5 (minimum 2x2)");

        let err = GridSurfaceError::grid(
            2,
            2,
            GridShapeIssue::LengthMismatch {
                expected: 12,
                provided: 11,
            },
        );
        assert_eq!(
            err.to_string(),
            "invalid grid dimensions: 2x2 (expected 12 coordinates, got 11)"
        );

        let err = GridSurfaceError::from(KernelError::DegreeOutOfRange {
            direction: "u",
            degree: 0,
            pole_count: 4,
        });
        assert!(err.to_string().starts_with("surface construction failed:"));
    }
}
