use super::core::Point3;

fn is_non_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

/// Parametric surface evaluated over a rectangular `(u, v)` domain.
pub trait Surface {
    fn point_at(&self, u: f64, v: f64) -> Point3;

    #[must_use]
    fn domain_u(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn domain_v(&self) -> (f64, f64) {
        (0.0, 1.0)
    }
}

impl<S: Surface + ?Sized> Surface for &S {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        (**self).point_at(u, v)
    }

    fn domain_u(&self) -> (f64, f64) {
        (**self).domain_u()
    }

    fn domain_v(&self) -> (f64, f64) {
        (**self).domain_v()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HPoint4 {
    x: f64,
    y: f64,
    z: f64,
    w: f64,
}

impl HPoint4 {
    const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    fn weighted(p: Point3, w: f64) -> Self {
        Self::new(p.x * w, p.y * w, p.z * w, w)
    }

    fn lerp(self, rhs: Self, t: f64) -> Self {
        let s = 1.0 - t;
        Self::new(
            self.x * s + rhs.x * t,
            self.y * s + rhs.y * t,
            self.z * s + rhs.z * t,
            self.w * s + rhs.w * t,
        )
    }

    fn project(self) -> Option<Point3> {
        if !self.w.is_finite() || self.w == 0.0 {
            return None;
        }
        let inv = 1.0 / self.w;
        Some(Point3::new(self.x * inv, self.y * inv, self.z * inv))
    }
}

/// Index of the knot span containing `u` for a curve with `n + 1` control points.
fn find_span(n: usize, p: usize, u: f64, knots: &[f64]) -> usize {
    if u >= knots[n + 1] {
        return n;
    }
    if u <= knots[p] {
        return p;
    }

    let mut low = p;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

fn de_boor(d: &mut [HPoint4], span: usize, p: usize, u: f64, knots: &[f64]) {
    for r in 1..=p {
        for j in (r..=p).rev() {
            let i = span - p + j;
            let denom = knots[i + p + 1 - r] - knots[i];
            let alpha = if denom == 0.0 { 0.0 } else { (u - knots[i]) / denom };
            d[j] = d[j - 1].lerp(d[j], alpha);
        }
    }
}

/// Non-periodic tensor-product NURBS surface.
///
/// Control points are stored with U as the fastest-varying index:
/// `control_points[v_index * u_count + u_index]`. Knot vectors are the
/// expanded (repeated) sequences of length `count + degree + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct NurbsSurface {
    pub degree_u: usize,
    pub degree_v: usize,
    pub u_count: usize,
    pub v_count: usize,
    pub control_points: Vec<Point3>,
    pub knots_u: Vec<f64>,
    pub knots_v: Vec<f64>,
    pub weights: Vec<f64>,
}

impl NurbsSurface {
    /// Validates and assembles a surface. Errors are short descriptions of the
    /// first violated constraint.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        u_count: usize,
        v_count: usize,
        control_points: Vec<Point3>,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        weights: Vec<f64>,
    ) -> Result<Self, String> {
        if u_count < 2 || v_count < 2 {
            return Err("nurbs surface requires at least a 2x2 control net".to_string());
        }
        if degree_u == 0 || degree_v == 0 {
            return Err("nurbs surface degrees must be >= 1".to_string());
        }
        if degree_u >= u_count || degree_v >= v_count {
            return Err("nurbs surface degrees must be < control point counts".to_string());
        }
        if control_points.len() != u_count * v_count {
            return Err("nurbs surface control point count must match u_count*v_count".to_string());
        }

        let expected_u_knots = u_count + degree_u + 1;
        if knots_u.len() != expected_u_knots {
            return Err(format!(
                "nurbs surface u knot length must be {expected_u_knots}, got {}",
                knots_u.len()
            ));
        }
        let expected_v_knots = v_count + degree_v + 1;
        if knots_v.len() != expected_v_knots {
            return Err(format!(
                "nurbs surface v knot length must be {expected_v_knots}, got {}",
                knots_v.len()
            ));
        }
        if !is_non_decreasing(&knots_u) || !is_non_decreasing(&knots_v) {
            return Err("nurbs surface knots must be non-decreasing".to_string());
        }

        if weights.len() != control_points.len() {
            return Err("nurbs surface weights length must match control point count".to_string());
        }
        if weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err("nurbs surface weights must be finite and > 0".to_string());
        }

        Ok(Self {
            degree_u,
            degree_v,
            u_count,
            v_count,
            control_points,
            knots_u,
            knots_v,
            weights,
        })
    }

    fn control_hpoint(&self, u_index: usize, v_index: usize) -> HPoint4 {
        let idx = v_index * self.u_count + u_index;
        HPoint4::weighted(self.control_points[idx], self.weights[idx])
    }

    fn point_at_clamped(&self, u: f64, v: f64) -> Point3 {
        let p = self.degree_u;
        let q = self.degree_v;

        let span_u = find_span(self.u_count - 1, p, u, &self.knots_u);
        let span_v = find_span(self.v_count - 1, q, v, &self.knots_v);

        let mut column = vec![HPoint4::ZERO; q + 1];
        let mut row = Vec::with_capacity(p + 1);
        for (l, slot) in column.iter_mut().enumerate() {
            let v_index = span_v - q + l;
            row.clear();
            row.extend((0..=p).map(|j| self.control_hpoint(span_u - p + j, v_index)));
            de_boor(&mut row, span_u, p, u, &self.knots_u);
            *slot = row[p];
        }

        de_boor(&mut column, span_v, q, v, &self.knots_v);
        column[q].project().unwrap_or(self.control_points[0])
    }
}

impl Surface for NurbsSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();
        self.point_at_clamped(u.clamp(u0, u1), v.clamp(v0, v1))
    }

    fn domain_u(&self) -> (f64, f64) {
        (self.knots_u[self.degree_u], self.knots_u[self.u_count])
    }

    fn domain_v(&self) -> (f64, f64) {
        (self.knots_v[self.degree_v], self.knots_v[self.v_count])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bilinear_patch() -> NurbsSurface {
        NurbsSurface::new(
            1,
            1,
            2,
            2,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
                Point3::new(2.0, 2.0, 2.0),
            ],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![1.0; 4],
        )
        .unwrap()
    }

    #[test]
    fn bilinear_patch_interpolates_corners() {
        let s = bilinear_patch();
        assert_eq!(s.domain_u(), (0.0, 1.0));
        assert_eq!(s.point_at(0.0, 0.0), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(s.point_at(1.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        assert_eq!(s.point_at(0.0, 1.0), Point3::new(0.0, 2.0, 0.0));
        assert_eq!(s.point_at(1.0, 1.0), Point3::new(2.0, 2.0, 2.0));

        let mid = s.point_at(0.5, 0.5);
        assert!((mid.x - 1.0).abs() < 1e-12);
        assert!((mid.y - 1.0).abs() < 1e-12);
        assert!((mid.z - 0.5).abs() < 1e-12);
    }

    #[test]
    fn parameters_outside_domain_are_clamped() {
        let s = bilinear_patch();
        assert_eq!(s.point_at(-3.0, -1.0), s.point_at(0.0, 0.0));
        assert_eq!(s.point_at(4.0, 9.0), s.point_at(1.0, 1.0));
    }

    #[test]
    fn rejects_degree_zero_and_bad_weights() {
        let pts = vec![Point3::ORIGIN; 4];
        let knots = vec![0.0, 0.0, 1.0, 1.0];
        assert!(
            NurbsSurface::new(0, 1, 2, 2, pts.clone(), knots.clone(), knots.clone(), vec![1.0; 4])
                .is_err()
        );
        assert!(
            NurbsSurface::new(1, 1, 2, 2, pts, knots.clone(), knots, vec![1.0, 1.0, 0.0, 1.0])
                .is_err()
        );
    }

    #[test]
    fn cubic_domain_uses_clamped_ends() {
        let pts = (0..16)
            .map(|i| Point3::new((i % 4) as f64, (i / 4) as f64, 0.0))
            .collect();
        let knots = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let s = NurbsSurface::new(3, 3, 4, 4, pts, knots.clone(), knots, vec![1.0; 16]).unwrap();
        assert_eq!(s.domain_u(), (0.0, 1.0));
        assert_eq!(s.domain_v(), (0.0, 1.0));

        // A planar, evenly spaced control net reproduces a linear map.
        let p = s.point_at(0.25, 0.75);
        assert!((p.x - 0.75).abs() < 1e-12);
        assert!((p.y - 2.25).abs() < 1e-12);
    }
}
