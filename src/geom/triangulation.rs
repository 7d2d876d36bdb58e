/// Splits a `u_count x v_count` row-major point grid into triangles.
///
/// Each quad `(i0, i1, i2, i3)` (bottom-left, bottom-right, top-left,
/// top-right) becomes `[i0, i1, i2]` and `[i2, i1, i3]`, so all triangles
/// share the orientation of the parametric `(u, v)` frame.
#[must_use]
pub fn triangulate_grid(u_count: usize, v_count: usize) -> Vec<[u32; 3]> {
    if u_count < 2 || v_count < 2 {
        return Vec::new();
    }

    let quad_u = u_count - 1;
    let quad_v = v_count - 1;
    let mut triangles = Vec::with_capacity(quad_u * quad_v * 2);

    for v in 0..quad_v {
        for u in 0..quad_u {
            let i0 = (v * u_count + u) as u32;
            let i1 = i0 + 1;
            let i2 = ((v + 1) * u_count + u) as u32;
            let i3 = i2 + 1;

            triangles.push([i0, i1, i2]);
            triangles.push([i2, i1, i3]);
        }
    }

    triangles
}
