use nalgebra as na;

/// Ray-casting point-in-polygon test.
///
/// The polygon is an ordered vertex list with an implicit closing edge from
/// the last vertex back to the first. Degenerate polygons (fewer than three
/// vertices) contain nothing.
pub fn point_in_polygon(p: na::Point2<f32>, poly: &[na::Point2<f32>]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = poly[i];
        let pj = poly[j];

        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}
