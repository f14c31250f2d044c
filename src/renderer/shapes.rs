//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::sim::{Body, ShapeKind, World};

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a filled convex polygon (fan around `center`)
pub fn convex_polygon(center: Vec2, local: &[Vec2], color: [f32; 4]) -> Vec<Vertex> {
    let n = local.len();
    let mut vertices = Vec::with_capacity(n * 3);

    for i in 0..n {
        let a = center + local[i];
        let b = center + local[(i + 1) % n];
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(a.x, a.y, color));
        vertices.push(Vertex::new(b.x, b.y, color));
    }

    vertices
}

/// Vertices for one body, in pixel coordinates
pub fn body(body: &Body, circle_segments: u32) -> Vec<Vertex> {
    let color = colors::body(body.color);
    match body.shape {
        ShapeKind::Circle => circle(body.pos, body.size, color, circle_segments),
        _ => convex_polygon(body.pos, body.local_vertices(), color),
    }
}

/// Vertices for every dynamic body in arena order. Boundaries sit outside
/// the viewport and are never drawn.
pub fn world(world: &World, circle_segments: u32) -> Vec<Vertex> {
    world
        .bodies
        .iter()
        .flat_map(|b| body(b, circle_segments))
        .collect()
}

/// Map a pixel position (origin top-left, y down) to normalized device coords
#[inline]
pub fn pixel_to_ndc(p: [f32; 2], width: f32, height: f32) -> [f32; 2] {
    [p[0] / width * 2.0 - 1.0, 1.0 - p[1] / height * 2.0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Material;

    fn material() -> Material {
        Material {
            air_friction: 0.0,
            restitution: 1.0,
            density: 0.001,
        }
    }

    #[test]
    fn test_triangle_counts_per_shape() {
        let at = Vec2::new(50.0, 50.0);
        let cases = [
            (ShapeKind::Circle, 16 * 3),
            (ShapeKind::Square, 4 * 3),
            (ShapeKind::Triangle, 3 * 3),
            (ShapeKind::Pentagon, 5 * 3),
        ];
        for (shape, expected) in cases {
            let b = Body::new(shape, at, 10.0, 2, material());
            assert_eq!(body(&b, 16).len(), expected, "{:?}", shape);
        }
    }

    #[test]
    fn test_body_color_from_palette() {
        let b = Body::new(ShapeKind::Triangle, Vec2::ZERO, 10.0, 3, material());
        let verts = body(&b, 8);
        assert!(verts.iter().all(|v| v.color == colors::body(3)));
    }

    #[test]
    fn test_pixel_to_ndc_corners() {
        assert_eq!(pixel_to_ndc([0.0, 0.0], 800.0, 600.0), [-1.0, 1.0]);
        assert_eq!(pixel_to_ndc([800.0, 600.0], 800.0, 600.0), [1.0, -1.0]);
        assert_eq!(pixel_to_ndc([400.0, 300.0], 800.0, 600.0), [0.0, 0.0]);
    }
}
