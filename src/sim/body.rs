//! Bodies, boundaries and their geometry
//!
//! Every dynamic body is either a circle or a convex polygon. Polygon
//! vertices are kept in local space (centered on the body) and translated on
//! demand; bodies never rotate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::polygon_vertex;

/// Fill colors for dynamic bodies (`0xRRGGBB`)
pub const PALETTE: [u32; 5] = [0x6b6b6b, 0x8a8a8a, 0xa3a3a3, 0x7a6f63, 0x9c8f7a];

/// Body shape types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
    Pentagon,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Triangle,
        ShapeKind::Pentagon,
    ];

    /// Polygon side count (None for circles)
    pub fn sides(&self) -> Option<u32> {
        match self {
            ShapeKind::Circle => None,
            ShapeKind::Square => Some(4),
            ShapeKind::Triangle => Some(3),
            ShapeKind::Pentagon => Some(5),
        }
    }

    /// Local-space vertices for a shape of the given size.
    ///
    /// `size` is the circumradius for triangles and pentagons and the
    /// half-extent for squares. Circles have no vertices.
    pub fn local_vertices(&self, size: f32) -> Vec<Vec2> {
        match self {
            ShapeKind::Circle => Vec::new(),
            ShapeKind::Square => (0..4)
                .map(|i| polygon_vertex(4, i, size * std::f32::consts::SQRT_2))
                .collect(),
            ShapeKind::Triangle => (0..3).map(|i| polygon_vertex(3, i, size)).collect(),
            ShapeKind::Pentagon => (0..5).map(|i| polygon_vertex(5, i, size)).collect(),
        }
    }
}

/// Physical material of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Fraction of velocity lost per tick
    pub air_friction: f32,
    pub restitution: f32,
    /// Mass per square pixel
    pub density: f32,
}

/// A dynamic body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub shape: ShapeKind,
    pub pos: Vec2,
    /// Velocity in px/tick
    pub vel: Vec2,
    /// Radius, circumradius or half-extent depending on shape
    pub size: f32,
    /// Index into `PALETTE`
    pub color: u8,
    pub material: Material,
    /// Accumulated force for the current tick
    pub force: Vec2,
    pub mass: f32,
    pub inv_mass: f32,
    /// Local-space polygon vertices (empty for circles)
    local: Vec<Vec2>,
}

impl Body {
    pub fn new(shape: ShapeKind, pos: Vec2, size: f32, color: u8, material: Material) -> Self {
        let local = shape.local_vertices(size);
        let area = match shape {
            ShapeKind::Circle => std::f32::consts::PI * size * size,
            _ => polygon_area(&local),
        };
        let mass = (area * material.density).max(f32::EPSILON);
        Self {
            shape,
            pos,
            vel: Vec2::ZERO,
            size,
            color,
            material,
            force: Vec2::ZERO,
            mass,
            inv_mass: 1.0 / mass,
            local,
        }
    }

    #[inline]
    pub fn is_circle(&self) -> bool {
        self.shape == ShapeKind::Circle
    }

    /// World-space polygon vertices (empty for circles)
    pub fn vertices(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.local.iter().map(move |v| *v + self.pos)
    }

    /// Local-space vertices, for rendering
    pub fn local_vertices(&self) -> &[Vec2] {
        &self.local
    }

    /// Project the body onto an axis, returning (min, max)
    pub fn project(&self, axis: Vec2) -> (f32, f32) {
        if self.is_circle() {
            let c = self.pos.dot(axis);
            return (c - self.size, c + self.size);
        }
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for v in self.vertices() {
            let p = v.dot(axis);
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }

    /// Outward edge normals (empty for circles)
    pub fn edge_normals(&self) -> Vec<Vec2> {
        let n = self.local.len();
        (0..n)
            .map(|i| {
                let edge = self.local[(i + 1) % n] - self.local[i];
                Vec2::new(edge.y, -edge.x).normalize_or_zero()
            })
            .collect()
    }

    /// Axis-aligned bounding box (min, max)
    pub fn aabb(&self) -> (Vec2, Vec2) {
        if self.is_circle() {
            let r = Vec2::splat(self.size);
            return (self.pos - r, self.pos + r);
        }
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for v in self.vertices() {
            min = min.min(v);
            max = max.max(v);
        }
        (min, max)
    }

    /// Kinetic energy in mass·px²/tick²
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.vel.length_squared()
    }
}

/// Which viewport edge a boundary guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// An immovable wall just outside one viewport edge
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Boundary {
    pub edge: Edge,
    pub center: Vec2,
    pub half_extents: Vec2,
    pub restitution: f32,
}

impl Boundary {
    /// Build the four walls around a `width` x `height` viewport.
    ///
    /// Each wall is `2 * margin` thick, centered `margin` outside its edge,
    /// and spans the full length of that edge.
    pub fn enclosing(width: f32, height: f32, margin: f32, restitution: f32) -> [Boundary; 4] {
        let wall = |edge, center, half_extents| Boundary {
            edge,
            center,
            half_extents,
            restitution,
        };
        [
            wall(
                Edge::Top,
                Vec2::new(width / 2.0, -margin),
                Vec2::new(width / 2.0, margin),
            ),
            wall(
                Edge::Bottom,
                Vec2::new(width / 2.0, height + margin),
                Vec2::new(width / 2.0, margin),
            ),
            wall(
                Edge::Left,
                Vec2::new(-margin, height / 2.0),
                Vec2::new(margin, height / 2.0),
            ),
            wall(
                Edge::Right,
                Vec2::new(width + margin, height / 2.0),
                Vec2::new(margin, height / 2.0),
            ),
        ]
    }

    /// Unit normal of the inner face, pointing into the viewport
    pub fn inward_normal(&self) -> Vec2 {
        match self.edge {
            Edge::Top => Vec2::Y,
            Edge::Bottom => Vec2::NEG_Y,
            Edge::Left => Vec2::X,
            Edge::Right => Vec2::NEG_X,
        }
    }

    /// Signed offset of the inner face along `inward_normal`
    pub fn inner_face(&self) -> f32 {
        let n = self.inward_normal();
        (self.center + n * self.half_extents).dot(n)
    }
}

/// Shoelace area of a simple polygon
pub fn polygon_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| vertices[i].perp_dot(vertices[(i + 1) % n]))
        .sum();
    twice.abs() / 2.0
}
