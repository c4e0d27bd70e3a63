//! The unit cube shared by the container crates and the lamps.

use crate::data_structures::model::ModelVertex;

/// Position, normal and texture coordinate for each of the 36 corners,
/// counter-clockwise when seen from outside. The tex coords use a top-left
/// origin.
#[rustfmt::skip]
const CUBE_VERTICES: [[f32; 8]; 36] = [
    // -Z
    [-0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 1.0],
    [ 0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 0.0],
    [ 0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 1.0],
    [ 0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 0.0],
    [-0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 1.0],
    [-0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 0.0],
    // +Z
    [-0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 1.0],
    [ 0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 1.0],
    [ 0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 0.0],
    [ 0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 0.0],
    [-0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 0.0],
    [-0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 1.0],
    // -X
    [-0.5,  0.5,  0.5, -1.0,  0.0,  0.0,  1.0, 1.0],
    [-0.5,  0.5, -0.5, -1.0,  0.0,  0.0,  1.0, 0.0],
    [-0.5, -0.5, -0.5, -1.0,  0.0,  0.0,  0.0, 0.0],
    [-0.5, -0.5, -0.5, -1.0,  0.0,  0.0,  0.0, 0.0],
    [-0.5, -0.5,  0.5, -1.0,  0.0,  0.0,  0.0, 1.0],
    [-0.5,  0.5,  0.5, -1.0,  0.0,  0.0,  1.0, 1.0],
    // +X
    [ 0.5,  0.5,  0.5,  1.0,  0.0,  0.0,  1.0, 1.0],
    [ 0.5, -0.5, -0.5,  1.0,  0.0,  0.0,  0.0, 0.0],
    [ 0.5,  0.5, -0.5,  1.0,  0.0,  0.0,  1.0, 0.0],
    [ 0.5, -0.5, -0.5,  1.0,  0.0,  0.0,  0.0, 0.0],
    [ 0.5,  0.5,  0.5,  1.0,  0.0,  0.0,  1.0, 1.0],
    [ 0.5, -0.5,  0.5,  1.0,  0.0,  0.0,  0.0, 1.0],
    // -Y
    [-0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 0.0],
    [ 0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  1.0, 0.0],
    [ 0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 1.0],
    [ 0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 1.0],
    [-0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  0.0, 1.0],
    [-0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 0.0],
    // +Y
    [-0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  0.0, 0.0],
    [ 0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  1.0, 1.0],
    [ 0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  1.0, 0.0],
    [ 0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  1.0, 1.0],
    [-0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  0.0, 0.0],
    [-0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  0.0, 1.0],
];

pub fn cube_vertices() -> Vec<ModelVertex> {
    CUBE_VERTICES
        .iter()
        .map(|v| ModelVertex::new([v[0], v[1], v[2]], [v[3], v[4], v[5]], [v[6], v[7]]))
        .collect()
}

/// The corners are not shared, so the index list just walks the vertices.
pub fn cube_indices() -> Vec<u32> {
    (0..CUBE_VERTICES.len() as u32).collect()
}
