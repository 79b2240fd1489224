use bevy::math::{bounding::RayCast3d, Vec3};

/// Below this determinant the ray is treated as lying in the triangle plane.
const PARALLEL_EPSILON: f32 = 1e-10;

/// Slack on the barycentric bounds so that rays through a shared edge hit at least one face.
const EDGE_EPSILON: f32 = 1e-6;

/// Möller–Trumbore intersection, double sided.
///
/// Returns the distance along the ray, limited to `0..=ray.max`.
pub fn ray_intersects_triangle_at(ray: &RayCast3d, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let direction: Vec3 = ray.ray.direction.into();

    let edge1 = b - a;
    let edge2 = c - a;

    let p = direction.cross(edge2);
    let determinant = edge1.dot(p);

    if determinant.abs() < PARALLEL_EPSILON {
        return None;
    }

    let inverse_determinant = 1.0 / determinant;

    let s = ray.ray.origin - a;
    let u = s.dot(p) * inverse_determinant;
    if u < -EDGE_EPSILON || u > 1.0 + EDGE_EPSILON {
        return None;
    }

    let q = s.cross(edge1);
    let v = direction.dot(q) * inverse_determinant;
    if v < -EDGE_EPSILON || u + v > 1.0 + EDGE_EPSILON {
        return None;
    }

    let t = edge2.dot(q) * inverse_determinant;

    (0.0..=ray.max).contains(&t).then_some(t)
}

/// Nearest hit of the ray against a polygon, fan triangulated from its first corner.
pub fn ray_intersects_polygon_at(ray: &RayCast3d, vertices: &[Vec3]) -> Option<f32> {
    let (&anchor, rest) = vertices.split_first()?;

    rest.windows(2)
        .filter_map(|pair| ray_intersects_triangle_at(ray, anchor, pair[0], pair[1]))
        .min_by(|a, b| a.total_cmp(b))
}

/// Unnormalized polygon normal by Newell's method. Its length is twice the polygon area.
pub fn newell_normal(vertices: &[Vec3]) -> Vec3 {
    if vertices.is_empty() {
        return Vec3::ZERO;
    }

    let centroid = centroid(vertices);

    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .fold(Vec3::ZERO, |normal, (&current, &next)| {
            normal + (current - centroid).cross(next - centroid)
        })
}

pub fn centroid(vertices: &[Vec3]) -> Vec3 {
    if vertices.is_empty() {
        return Vec3::ZERO;
    }

    vertices
        .iter()
        .fold(Vec3::ZERO, |accumulator, position| accumulator + *position)
        / vertices.len() as f32
}
