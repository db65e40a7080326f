use crate::{
    geometry::{Ray, Triangle},
    plane::Plane,
    Pos,
};

/// Intersects a plane with a triangle.
///
/// Only edges whose endpoints lie strictly on opposite sides of the plane are
/// cut. Vertices exactly on the plane are not handled, so a triangle touching
/// the plane with one vertex, or lying in it, yields nothing.
pub fn plane_triangle_intersection(plane: &Plane, face: &Triangle) -> Option<[Pos; 2]> {
    let [v0, v1, v2] = *face;
    let (a, b, c) = (
        plane.signed_distance(&v0),
        plane.signed_distance(&v1),
        plane.signed_distance(&v2),
    );

    let mut out = [Pos::zeros(); 2];
    let mut n = 0;

    // Going around a closed triangle the sign can only flip an even number of
    // times, so at most two edges push.
    let mut push_intersection = |a: f64, b: f64, v0: Pos, v1: Pos| {
        if a * b < 0.0 {
            let t = a.abs() / (a.abs() + b.abs());
            out[n] = v0.lerp(&v1, t);
            n += 1;
        }
    };

    push_intersection(a, b, v0, v1);
    push_intersection(b, c, v1, v2);
    push_intersection(c, a, v2, v0);

    (n == 2).then_some(out)
}

// References:
//  - https://www.scratchapixel.com/lessons/3d-basic-rendering/ray-tracing-rendering-a-triangle/ray-triangle-intersection-geometric-solution.html
//  - https://math.stackexchange.com/questions/4322/check-whether-a-point-is-within-a-3d-triangle
/// Returns the distance along the ray to where it crosses the triangle. Hits
/// behind the origin are rejected. Both windings are accepted.
pub fn ray_triangle_intersection(face: &Triangle, ray: &Ray) -> Option<f64> {
    let [v0, v1, v2] = *face;
    let normal = (v1 - v0).cross(&(v2 - v0));

    // Parallel to the triangle, or the triangle has no area
    let denominator = normal.dot(&ray.direction);
    if denominator == 0.0 {
        return None;
    }

    let t = normal.dot(&(v0 - ray.origin)) / denominator;
    if !(t >= 0.0) {
        return None;
    }

    // Check if the point of intersection is actually inside triangle.
    let intersection = ray.at(t);
    let c0 = (v1 - v0).cross(&(intersection - v0));
    let c1 = (v2 - v1).cross(&(intersection - v1));
    let c2 = (v0 - v2).cross(&(intersection - v2));

    let inside_triangle =
        normal.dot(&c0) >= 0.0 && normal.dot(&c1) >= 0.0 && normal.dot(&c2) >= 0.0;

    inside_triangle.then_some(t)
}
