//! # Primitive Shape Generation
//!
//! All shapes are centered at the origin in a Y-up frame, carry outward normals
//! and UVs, and wind counter-clockwise when seen from outside.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate an axis-aligned box of the given size centered at the origin
///
/// Each face has its own four vertices so normals stay flat and every face maps
/// the full `0..1` UV square.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();

    #[rustfmt::skip]
    let unit_positions = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    #[rustfmt::skip]
    let tex_coords = [
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0],
        [1.0, 0.0], [0.0, 0.0], [0.0, 1.0], [1.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = unit_positions
        .iter()
        .map(|p| [p[0] * width, p[1] * height, p[2] * depth])
        .collect();
    data.tex_coords = tex_coords.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|n| std::iter::repeat(*n).take(4))
        .collect();
    data.indices = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect();

    data
}

/// Generate a UV sphere of the given radius
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
pub fn generate_sphere(radius: f32, longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32; // 0 to PI
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32; // 0 to 2*PI
            let x = sin_theta * phi.cos();
            let y = cos_theta;
            let z = sin_theta * phi.sin();

            data.vertices.push([x * radius, y * radius, z * radius]);
            data.normals.push([x, y, z]);
            data.tex_coords
                .push([long as f32 / long_segs as f32, 1.0 - lat as f32 / lat_segs as f32]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend_from_slice(&[first, first + 1, second]);
            data.indices.extend_from_slice(&[second, first + 1, second + 1]);
        }
    }

    data
}

/// Generate a plane in the XY plane facing +Z
///
/// # Arguments
/// * `width` - Width of the plane (X direction)
/// * `height` - Height of the plane (Y direction)
/// * `width_segments` - Number of subdivisions along width
/// * `height_segments` - Number of subdivisions along height
///
/// Rotate by -π/2 about X to lay it on the ground.
pub fn generate_plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let h_segs = height_segments.max(1);

    for y in 0..=h_segs {
        let v = y as f32 / h_segs as f32;
        let pos_y = (v - 0.5) * height;

        for x in 0..=w_segs {
            let u = x as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, pos_y, 0.0]);
            data.normals.push([0.0, 0.0, 1.0]);
            data.tex_coords.push([u, v]);
        }
    }

    for y in 0..h_segs {
        for x in 0..w_segs {
            let i = y * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices.extend_from_slice(&[i, i + 1, next_row]);
            data.indices.extend_from_slice(&[i + 1, next_row + 1, next_row]);
        }
    }

    data
}

/// Generate a closed cone with its apex pointing up +Y
///
/// With `radial_segments = 4` this is a square pyramid whose base corners sit
/// on the ±X and ±Z axes; rotate by π/4 about Y to square it up with a box.
///
/// # Arguments
/// * `radius` - Base radius
/// * `height` - Distance from base to apex
/// * `radial_segments` - Number of sides around the axis
pub fn generate_cone(radius: f32, height: f32, radial_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = radial_segments.max(3);
    let half_height = height * 0.5;
    let slope = if height != 0.0 { radius / height } else { 0.0 };

    // Side: row 0 is the apex ring, row 1 the base ring
    for row in 0..=1u32 {
        let v = row as f32;
        let ring_radius = v * radius;

        for i in 0..=segs {
            let u = i as f32 / segs as f32;
            let theta = u * 2.0 * PI;
            let (sin_t, cos_t) = theta.sin_cos();

            data.vertices
                .push([ring_radius * sin_t, half_height - v * height, ring_radius * cos_t]);
            let len = (sin_t * sin_t + slope * slope + cos_t * cos_t).sqrt();
            data.normals.push([sin_t / len, slope / len, cos_t / len]);
            data.tex_coords.push([u, 1.0 - v]);
        }
    }

    for i in 0..segs {
        let base = segs + 1 + i;
        let base_next = base + 1;
        let apex = i + 1;
        data.indices.extend_from_slice(&[base, base_next, apex]);
    }

    // Base cap
    let center = data.vertices.len() as u32;
    data.vertices.push([0.0, -half_height, 0.0]);
    data.normals.push([0.0, -1.0, 0.0]);
    data.tex_coords.push([0.5, 0.5]);

    let ring_start = data.vertices.len() as u32;
    for i in 0..=segs {
        let theta = i as f32 / segs as f32 * 2.0 * PI;
        let (sin_t, cos_t) = theta.sin_cos();
        data.vertices.push([radius * sin_t, -half_height, radius * cos_t]);
        data.normals.push([0.0, -1.0, 0.0]);
        data.tex_coords.push([cos_t * 0.5 + 0.5, sin_t * 0.5 + 0.5]);
    }

    for i in 0..segs {
        let current = ring_start + i;
        data.indices.extend_from_slice(&[current + 1, current, center]);
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal(data: &GeometryData, tri: usize) -> [f32; 3] {
        let p = |k: usize| data.vertices[data.indices[tri * 3 + k] as usize];
        let (a, b, c) = (p(0), p(1), p(2));
        let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn test_box_generation() {
        let wall = generate_box(5.0, 4.0, 3.0);
        assert_eq!(wall.vertex_count(), 24);
        assert_eq!(wall.triangle_count(), 12);
        let max_y = wall.vertices.iter().map(|v| v[1]).fold(f32::MIN, f32::max);
        let max_z = wall.vertices.iter().map(|v| v[2]).fold(f32::MIN, f32::max);
        assert_eq!(max_y, 2.0);
        assert_eq!(max_z, 1.5);
    }

    #[test]
    fn test_box_winding_faces_outward() {
        let cube = generate_box(1.0, 1.0, 1.0);
        for tri in 0..cube.triangle_count() {
            let vertex_normal = cube.normals[cube.indices[tri * 3] as usize];
            assert!(dot(triangle_normal(&cube, tri), vertex_normal) > 0.0);
        }
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(0.5, 8, 6);
        assert_eq!(sphere.vertices.len(), 9 * 7);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert_eq!(sphere.vertices.len(), sphere.tex_coords.len());
        for v in &sphere.vertices {
            let r = dot(*v, *v).sqrt();
            assert!((r - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertices.len(), 9);
        assert_eq!(plane.indices.len(), 24);
        for tri in 0..plane.triangle_count() {
            assert!(triangle_normal(&plane, tri)[2] > 0.0);
        }
    }

    #[test]
    fn test_cone_is_square_pyramid() {
        let roof = generate_cone(4.0, 2.0, 4);
        // 4 side faces + 4 cap triangles
        assert_eq!(roof.triangle_count(), 8);

        let apex_y = roof.vertices.iter().map(|v| v[1]).fold(f32::MIN, f32::max);
        let base_y = roof.vertices.iter().map(|v| v[1]).fold(f32::MAX, f32::min);
        assert_eq!(apex_y, 1.0);
        assert_eq!(base_y, -1.0);

        // First base corner lies on +Z
        let corner = roof.vertices[5];
        assert!(corner[0].abs() < 1e-5);
        assert!((corner[2] - 4.0).abs() < 1e-5);

        // Side faces point away from the axis, cap points down
        for tri in 0..4 {
            let n = triangle_normal(&roof, tri);
            assert!(n[1] > 0.0);
        }
        for tri in 4..8 {
            assert!(triangle_normal(&roof, tri)[1] < 0.0);
        }
    }
}
