//! Clamped, integer-uniform knot vectors for grid surfaces.
//!
//! For `n` control points at degree `p` (order `k = p + 1`) the distinct knots are
//! `0, 1, ..., n - k + 1`. The end knots carry multiplicity `k` and every interior
//! knot carries multiplicity 1, so the multiplicities always sum to `n + k`.

use super::error::{GridShapeIssue, GridSurfaceError};

/// Caps a requested degree at `point_count - 1`.
///
/// A zero point count saturates to degree 0; callers reject such grids earlier.
#[must_use]
pub fn resolve_degree(point_count: usize, requested: usize) -> usize {
    requested.min(point_count.saturating_sub(1))
}

/// Distinct knot values with their multiplicities.
#[derive(Debug, Clone, PartialEq)]
pub struct KnotVector {
    knots: Vec<f64>,
    multiplicities: Vec<usize>,
    degree: usize,
}

impl KnotVector {
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    #[must_use]
    pub fn multiplicities(&self) -> &[usize] {
        &self.multiplicities
    }

    #[must_use]
    pub const fn degree(&self) -> usize {
        self.degree
    }

    #[must_use]
    pub const fn order(&self) -> usize {
        self.degree + 1
    }

    /// Number of control points this knot vector was built for.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.multiplicities.iter().sum::<usize>() - self.order()
    }

    /// Parameter range `(first knot, last knot)`.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        let start = self.knots.first().copied().unwrap_or(0.0);
        let end = self.knots.last().copied().unwrap_or(start);
        (start, end)
    }

    /// Flat knot sequence with every value repeated by its multiplicity.
    #[must_use]
    pub fn expanded(&self) -> Vec<f64> {
        self.knots
            .iter()
            .zip(&self.multiplicities)
            .flat_map(|(&knot, &mult)| std::iter::repeat_n(knot, mult))
            .collect()
    }
}

/// Builds the clamped uniform knot vector for `point_count` control points at `degree`.
pub fn synthesize_knots(point_count: usize, degree: usize) -> Result<KnotVector, GridSurfaceError> {
    if point_count < 2 {
        return Err(GridSurfaceError::grid(
            point_count,
            point_count,
            GridShapeIssue::TooSmall,
        ));
    }

    let order = degree + 1;
    let Some(interior) = point_count.checked_sub(order) else {
        return Err(GridSurfaceError::DegenerateKnotVector { point_count, degree });
    };

    let mut knots = Vec::with_capacity(interior + 2);
    let mut multiplicities = Vec::with_capacity(interior + 2);

    knots.push(0.0);
    multiplicities.push(order);
    for i in 1..=interior {
        knots.push(i as f64);
        multiplicities.push(1);
    }
    knots.push((interior + 1) as f64);
    multiplicities.push(order);

    Ok(KnotVector {
        knots,
        multiplicities,
        degree,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn cubic_four_points_has_no_interior_knots() {
        let kv = synthesize_knots(4, 3).unwrap();
        assert_eq!(kv.knots(), &[0.0, 1.0]);
        assert_eq!(kv.multiplicities(), &[4, 4]);
        assert_eq!(kv.expanded(), vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(kv.domain(), (0.0, 1.0));
        assert_eq!(kv.point_count(), 4);
    }

    #[test]
    fn quadratic_six_points() {
        let kv = synthesize_knots(6, 2).unwrap();
        assert_eq!(kv.knots(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(kv.multiplicities(), &[3, 1, 1, 1, 3]);
        assert_eq!(kv.domain(), (0.0, 4.0));
    }

    #[test]
    fn degree_too_high_is_degenerate() {
        let err = synthesize_knots(3, 3).unwrap_err();
        assert_eq!(
            err,
            GridSurfaceError::DegenerateKnotVector {
                point_count: 3,
                degree: 3
            }
        );
    }

    #[test]
    fn single_point_is_rejected() {
        assert!(matches!(
            synthesize_knots(1, 0),
            Err(GridSurfaceError::InvalidGridDimensions { .. })
        ));
    }

    #[test]
    fn resolve_degree_clamps() {
        assert_eq!(resolve_degree(4, 3), 3);
        assert_eq!(resolve_degree(2, 3), 1);
        assert_eq!(resolve_degree(10, 5), 5);
        assert_eq!(resolve_degree(0, 3), 0);
    }

    proptest! {
        #[test]
        fn multiplicities_sum_to_points_plus_order(
            (point_count, degree) in (2usize..64).prop_flat_map(|n| (Just(n), 0..n))
        ) {
            let kv = synthesize_knots(point_count, degree).unwrap();
            let sum: usize = kv.multiplicities().iter().sum();
            prop_assert_eq!(sum, point_count + degree + 1);
            prop_assert_eq!(kv.expanded().len(), sum);
        }

        #[test]
        fn end_multiplicities_equal_order_interior_are_one(
            (point_count, degree) in (2usize..64).prop_flat_map(|n| (Just(n), 0..n))
        ) {
            let kv = synthesize_knots(point_count, degree).unwrap();
            let mults = kv.multiplicities();
            prop_assert_eq!(mults[0], degree + 1);
            prop_assert_eq!(mults[mults.len() - 1], degree + 1);
            prop_assert!(mults[1..mults.len() - 1].iter().all(|&m| m == 1));
            prop_assert!(kv.knots().windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn resolve_degree_is_idempotent(point_count in 1usize..128, requested in 0usize..16) {
            let once = resolve_degree(point_count, requested);
            prop_assert_eq!(resolve_degree(point_count, once), once);
            prop_assert!(once < point_count);
        }
    }
}
