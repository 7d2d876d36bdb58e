use serde::Serialize;

use super::error::GridSurfaceError;
use super::surface::Surface;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Which parameter an isocurve runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsocurveDirection {
    /// Curves at constant `v`, each sampled across the full `u` range.
    U,
    /// Curves at constant `u`, each sampled across the full `v` range.
    V,
}

impl IsocurveDirection {
    /// Maps the boolean `u_direction` flag used by the bindings.
    #[must_use]
    pub const fn from_u_direction(u_direction: bool) -> Self {
        if u_direction { Self::U } else { Self::V }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsocurveOptions {
    /// Number of intervals between curves; `divisions + 1` curves are produced.
    pub divisions: usize,
    /// Samples per curve, both ends included. Must be at least 2.
    pub points_per_curve: usize,
}

impl Default for IsocurveOptions {
    fn default() -> Self {
        Self {
            divisions: 10,
            points_per_curve: 50,
        }
    }
}

impl IsocurveOptions {
    #[must_use]
    pub const fn new(divisions: usize, points_per_curve: usize) -> Self {
        Self {
            divisions,
            points_per_curve,
        }
    }

    #[must_use]
    pub const fn with_divisions(mut self, divisions: usize) -> Self {
        self.divisions = divisions;
        self
    }

    #[must_use]
    pub const fn with_points_per_curve(mut self, points_per_curve: usize) -> Self {
        self.points_per_curve = points_per_curve;
        self
    }
}

/// One isoparametric polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Isocurve {
    /// The fixed parameter value (`v` for [`IsocurveDirection::U`], `u` otherwise).
    pub parameter: f64,
    pub points: Vec<[f64; 3]>,
}

/// `i`-th of `divisions + 1` evenly spaced values over `[min, max]`.
fn station(min: f64, max: f64, i: usize, divisions: usize) -> f64 {
    if divisions == 0 || i == 0 {
        min
    } else if i == divisions {
        max
    } else {
        min + (max - min) * i as f64 / divisions as f64
    }
}

/// Samples `divisions + 1` isocurves of `surface`.
///
/// Curves are ordered by ascending fixed parameter and each curve's points by
/// ascending running parameter. With `divisions == 0` a single curve at the
/// minimum of the fixed parameter is returned.
pub fn sample_isocurves<S>(
    surface: &S,
    direction: IsocurveDirection,
    options: &IsocurveOptions,
) -> Result<Vec<Isocurve>, GridSurfaceError>
where
    S: Surface + Sync + ?Sized,
{
    let samples = options.points_per_curve;
    if samples < 2 {
        return Err(GridSurfaceError::InvalidSampling {
            points_per_curve: samples,
        });
    }

    let divisions = options.divisions;
    let (u_min, u_max) = surface.domain_u();
    let (v_min, v_max) = surface.domain_v();
    let ((fixed_min, fixed_max), (run_min, run_max)) = match direction {
        IsocurveDirection::U => ((v_min, v_max), (u_min, u_max)),
        IsocurveDirection::V => ((u_min, u_max), (v_min, v_max)),
    };

    let curve_at = |i: usize| {
        let fixed = station(fixed_min, fixed_max, i, divisions);
        let points = (0..samples)
            .map(|j| {
                let run = station(run_min, run_max, j, samples - 1);
                let p = match direction {
                    IsocurveDirection::U => surface.point_at(run, fixed),
                    IsocurveDirection::V => surface.point_at(fixed, run),
                };
                p.to_array()
            })
            .collect();
        Isocurve {
            parameter: fixed,
            points,
        }
    };

    #[cfg(feature = "parallel")]
    let curves: Vec<Isocurve> = (0..=divisions).into_par_iter().map(curve_at).collect();
    #[cfg(not(feature = "parallel"))]
    let curves: Vec<Isocurve> = (0..=divisions).map(curve_at).collect();

    log::debug!(
        "sampled {} {:?} isocurves x {samples} points",
        curves.len(),
        direction
    );
    Ok(curves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::core::Point3;

    /// Non-square domain so the two directions are distinguishable.
    struct Sheet;

    impl Surface for Sheet {
        fn point_at(&self, u: f64, v: f64) -> Point3 {
            Point3::new(u, v, u * v)
        }

        fn domain_u(&self) -> (f64, f64) {
            (0.0, 3.0)
        }

        fn domain_v(&self) -> (f64, f64) {
            (1.0, 2.0)
        }
    }

    #[test]
    fn u_direction_holds_v_fixed() {
        let curves =
            sample_isocurves(&Sheet, IsocurveDirection::U, &IsocurveOptions::new(2, 4)).unwrap();
        let params: Vec<f64> = curves.iter().map(|c| c.parameter).collect();
        assert_eq!(params, vec![1.0, 1.5, 2.0]);
        for curve in &curves {
            assert_eq!(curve.points.len(), 4);
            assert!(curve.points.iter().all(|p| p[1] == curve.parameter));
            assert_eq!(curve.points[0][0], 0.0);
            assert_eq!(curve.points[3][0], 3.0);
            assert_eq!(curve.points[1][0], 1.0);
        }
    }

    #[test]
    fn v_direction_holds_u_fixed() {
        let curves =
            sample_isocurves(&Sheet, IsocurveDirection::V, &IsocurveOptions::new(3, 2)).unwrap();
        let params: Vec<f64> = curves.iter().map(|c| c.parameter).collect();
        assert_eq!(params, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(curves[2].points, vec![[2.0, 1.0, 2.0], [2.0, 2.0, 4.0]]);
    }

    #[test]
    fn zero_divisions_gives_single_curve_at_minimum() {
        let curves =
            sample_isocurves(&Sheet, IsocurveDirection::U, &IsocurveOptions::new(0, 5)).unwrap();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].parameter, 1.0);
        assert!(curves[0].points.iter().all(|p| p[1].is_finite()));
    }

    #[test]
    fn fewer_than_two_points_is_rejected() {
        let err = sample_isocurves(&Sheet, IsocurveDirection::U, &IsocurveOptions::new(4, 1))
            .unwrap_err();
        assert_eq!(err, GridSurfaceError::InvalidSampling { points_per_curve: 1 });
    }

    #[test]
    fn direction_from_flag() {
        assert_eq!(IsocurveDirection::from_u_direction(true), IsocurveDirection::U);
        assert_eq!(IsocurveDirection::from_u_direction(false), IsocurveDirection::V);
        assert_eq!(IsocurveOptions::default().points_per_curve, 50);
    }
}
