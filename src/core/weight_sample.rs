//! Interpolated sampling of vertex-group weights at a point on a face.
//!
//! Triangles use area-ratio barycentric coordinates. Larger polygons use mean value
//! coordinates on the polygon plane, which agree with the area ratios on triangles and
//! reproduce linear fields exactly on convex polygons.

use bevy::math::Vec3;
use lox::FaceHandle;
use thiserror::Error;

use crate::core::{
    dim3::{centroid, newell_normal},
    editable_mesh::{vertex_groups::VertexGroups, EditableMesh},
};

/// Relative distance under which a point is snapped onto a corner or an edge.
const ON_ELEMENT_EPSILON: f32 = 1e-6;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidFaceError {
    #[error("a face needs at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },
    #[error("face has {positions} vertex positions but {weights} weights")]
    LengthMismatch { positions: usize, weights: usize },
    #[error("face has no area")]
    Degenerate,
}

/// Interpolates `weights` at `hit_point`. A corner without a weight contributes 0.
///
/// `weights[i]` belongs to `positions[i]`. The result is a convex combination of the
/// weights when the point lies inside a convex face.
pub fn sample_weight(
    positions: &[Vec3],
    weights: &[Option<f32>],
    hit_point: Vec3,
) -> Result<f32, InvalidFaceError> {
    if positions.len() < 3 {
        return Err(InvalidFaceError::TooFewVertices {
            count: positions.len(),
        });
    }

    if positions.len() != weights.len() {
        return Err(InvalidFaceError::LengthMismatch {
            positions: positions.len(),
            weights: weights.len(),
        });
    }

    let coordinates = poly_barycentric(positions, hit_point)?;

    Ok(coordinates
        .iter()
        .zip(weights)
        .map(|(coordinate, weight)| coordinate * weight.unwrap_or(0.0))
        .sum())
}

/// Samples the active vertex group on `face` at the mesh-local `hit_point`.
///
/// `Ok(None)` means there is no active group to sample.
pub fn sample_face(
    mesh: &EditableMesh,
    vertex_groups: &VertexGroups,
    face: FaceHandle,
    hit_point: Vec3,
) -> Result<Option<f32>, InvalidFaceError> {
    let Some(group) = vertex_groups.active() else {
        return Ok(None);
    };

    let (vertices, positions) = mesh.face_corners(face);

    let weights: Vec<Option<f32>> = vertices
        .iter()
        .map(|vertex| vertex_groups.weight(*vertex, group))
        .collect();

    sample_weight(&positions, &weights, hit_point).map(Some)
}

/// Generalized barycentric coordinates of `point` with respect to a planar polygon.
pub fn poly_barycentric(positions: &[Vec3], point: Vec3) -> Result<Vec<f32>, InvalidFaceError> {
    match positions {
        [] | [_] | [_, _] => Err(InvalidFaceError::TooFewVertices {
            count: positions.len(),
        }),
        [a, b, c] => triangle_barycentric(*a, *b, *c, point).map(|coordinates| coordinates.to_vec()),
        _ => mean_value_coordinates(positions, point),
    }
}

fn extent(positions: &[Vec3]) -> f32 {
    let first = positions[0];
    positions
        .iter()
        .map(|position| position.distance(first))
        .fold(0.0, f32::max)
}

fn triangle_barycentric(a: Vec3, b: Vec3, c: Vec3, point: Vec3) -> Result<[f32; 3], InvalidFaceError> {
    let normal = (b - a).cross(c - a);
    let area_squared = normal.length_squared();

    let extent = extent(&[a, b, c]);
    if !area_squared.is_finite() || area_squared.sqrt() <= ON_ELEMENT_EPSILON * extent * extent {
        return Err(InvalidFaceError::Degenerate);
    }

    let point = point - normal * (point - a).dot(normal) / area_squared;

    if let Some(snapped) = snap_to_boundary(&[a, b, c], point, ON_ELEMENT_EPSILON * extent) {
        return Ok([snapped[0], snapped[1], snapped[2]]);
    }

    let u = (c - b).cross(point - b).dot(normal) / area_squared;
    let v = (a - c).cross(point - c).dot(normal) / area_squared;

    Ok([u, v, 1.0 - u - v])
}

/// Coordinates of a point lying on a corner (one-hot) or on an edge (linear between its
/// two endpoints), within `tolerance`. `point` must already be on the polygon plane.
fn snap_to_boundary(positions: &[Vec3], point: Vec3, tolerance: f32) -> Option<Vec<f32>> {
    let count = positions.len();

    if let Some(corner) = positions
        .iter()
        .position(|position| position.distance(point) <= tolerance)
    {
        let mut coordinates = vec![0.0; count];
        coordinates[corner] = 1.0;
        return Some(coordinates);
    }

    for current in 0..count {
        let next = (current + 1) % count;

        let edge = positions[next] - positions[current];
        let length_squared = edge.length_squared();
        if length_squared <= 0.0 {
            continue;
        }

        let t = (point - positions[current]).dot(edge) / length_squared;
        if !(0.0..=1.0).contains(&t) {
            continue;
        }

        if (positions[current] + edge * t).distance(point) <= tolerance {
            let mut coordinates = vec![0.0; count];
            coordinates[current] = 1.0 - t;
            coordinates[next] = t;
            return Some(coordinates);
        }
    }

    None
}

fn mean_value_coordinates(positions: &[Vec3], point: Vec3) -> Result<Vec<f32>, InvalidFaceError> {
    let count = positions.len();

    let extent = extent(positions);
    let normal = newell_normal(positions);
    let normal_length = normal.length();

    if !normal_length.is_finite() || normal_length <= ON_ELEMENT_EPSILON * extent * extent {
        return Err(InvalidFaceError::Degenerate);
    }

    let normal = normal / normal_length;
    let point = point - normal * (point - centroid(positions)).dot(normal);

    if let Some(snapped) = snap_to_boundary(positions, point, ON_ELEMENT_EPSILON * extent) {
        return Ok(snapped);
    }

    let spokes: Vec<Vec3> = positions.iter().map(|position| *position - point).collect();
    let lengths: Vec<f32> = spokes.iter().map(|spoke| spoke.length()).collect();

    // tan(α/2) for the angle α between consecutive spokes, signed by the polygon winding
    let mut half_angle_tangents = Vec::with_capacity(count);

    for current in 0..count {
        let next = (current + 1) % count;

        let sine_area = spokes[current].cross(spokes[next]).dot(normal);
        let cosine_area = spokes[current].dot(spokes[next]);

        half_angle_tangents.push(sine_area / (lengths[current] * lengths[next] + cosine_area));
    }

    let mut coordinates: Vec<f32> = (0..count)
        .map(|current| {
            let previous = (current + count - 1) % count;
            (half_angle_tangents[previous] + half_angle_tangents[current]) / lengths[current]
        })
        .collect();

    let total: f32 = coordinates.iter().sum();

    if !total.is_finite() || total.abs() <= f32::EPSILON {
        return Err(InvalidFaceError::Degenerate);
    }

    for coordinate in &mut coordinates {
        *coordinate /= total;
    }

    Ok(coordinates)
}
