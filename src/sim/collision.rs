//! Collision detection and response
//!
//! Body pairs go through an AABB broad phase and a separating-axis narrow
//! phase (convex polygons, with circles projected as intervals). Boundaries
//! are treated as the half-plane beyond their inner face, so a body that
//! tunnels deep into a wall is still pushed back into the viewport.

use glam::Vec2;

use super::body::{Body, Boundary};
use super::world::World;

/// Closing speed (px/tick) below which contacts do not bounce
pub const RESTING_THRESHOLD: f32 = 2.0;
/// Penetration allowed before position correction kicks in
pub const PENETRATION_SLOP: f32 = 0.05;
/// Fraction of penetration removed per position iteration
pub const POSITION_BIAS: f32 = 0.4;

/// Overlap between two shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Unit normal pointing from the first shape toward the second
    pub normal: Vec2,
    pub depth: f32,
}

/// What a body is touching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Other {
    Body(usize),
    Wall(usize),
}

/// A contact found at the start of the solve
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub a: usize,
    pub other: Other,
    /// Unit normal pointing from `a` toward `other`
    pub normal: Vec2,
    pub depth: f32,
    pub restitution: f32,
    /// Separating speed the velocity solver aims for
    target_speed: f32,
}

/// Whether two bodies' bounding boxes overlap
#[inline]
fn aabb_overlap(a: &Body, b: &Body) -> bool {
    let (amin, amax) = a.aabb();
    let (bmin, bmax) = b.aabb();
    amin.x <= bmax.x && bmin.x <= amax.x && amin.y <= bmax.y && bmin.y <= amax.y
}

/// Axis from a circle center toward the closest vertex of a polygon
fn closest_vertex_axis(center: Vec2, polygon: &Body) -> Vec2 {
    polygon
        .vertices()
        .min_by(|p, q| {
            p.distance_squared(center)
                .partial_cmp(&q.distance_squared(center))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|v| (v - center).normalize_or_zero())
        .unwrap_or(Vec2::ZERO)
}

/// Narrow phase between two dynamic bodies
pub fn body_body(a: &Body, b: &Body) -> Option<Penetration> {
    if a.is_circle() && b.is_circle() {
        let d = b.pos - a.pos;
        let dist = d.length();
        let radii = a.size + b.size;
        if dist >= radii {
            return None;
        }
        let normal = if dist > f32::EPSILON { d / dist } else { Vec2::X };
        return Some(Penetration {
            normal,
            depth: radii - dist,
        });
    }

    let mut axes = a.edge_normals();
    axes.extend(b.edge_normals());
    if a.is_circle() {
        axes.push(closest_vertex_axis(a.pos, b));
    }
    if b.is_circle() {
        axes.push(closest_vertex_axis(b.pos, a));
    }

    let mut best: Option<Penetration> = None;
    for axis in axes {
        if axis == Vec2::ZERO {
            continue;
        }
        let (amin, amax) = a.project(axis);
        let (bmin, bmax) = b.project(axis);
        let overlap = amax.min(bmax) - amin.max(bmin);
        if overlap <= 0.0 {
            return None;
        }
        if best.is_none_or(|p| overlap < p.depth) {
            best = Some(Penetration {
                normal: axis,
                depth: overlap,
            });
        }
    }

    best.map(|mut p| {
        if (b.pos - a.pos).dot(p.normal) < 0.0 {
            p.normal = -p.normal;
        }
        p
    })
}

/// Narrow phase between a body and a boundary half-plane
pub fn body_wall(body: &Body, wall: &Boundary) -> Option<Penetration> {
    let inward = wall.inward_normal();
    let (min, _) = body.project(inward);
    let depth = wall.inner_face() - min;
    (depth > 0.0).then_some(Penetration {
        normal: -inward,
        depth,
    })
}

fn velocity_of(bodies: &[Body], other: Other) -> (Vec2, f32) {
    match other {
        Other::Body(j) => (bodies[j].vel, bodies[j].inv_mass),
        Other::Wall(_) => (Vec2::ZERO, 0.0),
    }
}

fn make_contact(bodies: &[Body], a: usize, other: Other, pen: Penetration, restitution: f32) -> Contact {
    let (vb, _) = velocity_of(bodies, other);
    let closing = (vb - bodies[a].vel).dot(pen.normal);
    let target_speed = if closing < -RESTING_THRESHOLD {
        -closing * restitution
    } else {
        0.0
    };
    Contact {
        a,
        other,
        normal: pen.normal,
        depth: pen.depth,
        restitution,
        target_speed,
    }
}

/// Find every overlapping pair in the world, in stable index order
pub fn detect(world: &World) -> Vec<Contact> {
    let bodies = &world.bodies;
    let mut contacts = Vec::new();

    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            if !aabb_overlap(&bodies[i], &bodies[j]) {
                continue;
            }
            if let Some(pen) = body_body(&bodies[i], &bodies[j]) {
                let e = bodies[i].material.restitution.max(bodies[j].material.restitution);
                contacts.push(make_contact(bodies, i, Other::Body(j), pen, e));
            }
        }
        for (w, wall) in world.boundaries.iter().enumerate() {
            if let Some(pen) = body_wall(&bodies[i], wall) {
                let e = bodies[i].material.restitution.max(wall.restitution);
                contacts.push(make_contact(bodies, i, Other::Wall(w), pen, e));
            }
        }
    }

    contacts
}

/// Sequential impulses along contact normals.
///
/// The accumulated impulse per contact never goes negative, so contacts only
/// push bodies apart.
pub fn solve_velocities(bodies: &mut [Body], contacts: &[Contact], iterations: u32) {
    let mut accumulated = vec![0.0f32; contacts.len()];

    for _ in 0..iterations {
        for (c, acc) in contacts.iter().zip(accumulated.iter_mut()) {
            let inv_a = bodies[c.a].inv_mass;
            let (vb, inv_b) = velocity_of(bodies, c.other);
            let inv_sum = inv_a + inv_b;
            if inv_sum <= 0.0 {
                continue;
            }

            let closing = (vb - bodies[c.a].vel).dot(c.normal);
            let lambda = (c.target_speed - closing) / inv_sum;
            let new_acc = (*acc + lambda).max(0.0);
            let applied = new_acc - *acc;
            *acc = new_acc;

            bodies[c.a].vel -= c.normal * applied * inv_a;
            if let Other::Body(j) = c.other {
                bodies[j].vel += c.normal * applied * inv_b;
            }
        }
    }
}

/// Push overlapping bodies apart, re-measuring overlap each iteration
pub fn solve_positions(world: &mut World, contacts: &[Contact], iterations: u32) {
    let World {
        bodies, boundaries, ..
    } = world;

    for _ in 0..iterations {
        for c in contacts {
            let (pen, inv_b) = match c.other {
                Other::Body(j) => (body_body(&bodies[c.a], &bodies[j]), bodies[j].inv_mass),
                Other::Wall(w) => (body_wall(&bodies[c.a], &boundaries[w]), 0.0),
            };
            let Some(pen) = pen else { continue };

            let correction = (pen.depth - PENETRATION_SLOP).max(0.0) * POSITION_BIAS;
            let inv_a = bodies[c.a].inv_mass;
            let inv_sum = inv_a + inv_b;
            if correction <= 0.0 || inv_sum <= 0.0 {
                continue;
            }

            bodies[c.a].pos -= pen.normal * correction * (inv_a / inv_sum);
            if let Other::Body(j) = c.other {
                bodies[j].pos += pen.normal * correction * (inv_b / inv_sum);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::{Boundary, Edge, Material, ShapeKind};
    use crate::sim::world::Viewport;

    fn material(restitution: f32) -> Material {
        Material {
            air_friction: 0.0,
            restitution,
            density: 0.001,
        }
    }

    fn body(shape: ShapeKind, x: f32, y: f32, size: f32) -> Body {
        Body::new(shape, Vec2::new(x, y), size, 0, material(1.0))
    }

    fn world_with(bodies: Vec<Body>) -> World {
        World {
            viewport: Viewport::new(800.0, 600.0),
            bodies,
            boundaries: Boundary::enclosing(800.0, 600.0, 50.0, 1.2),
            ticks: 0,
        }
    }

    #[test]
    fn test_circle_circle_overlap() {
        let a = body(ShapeKind::Circle, 0.0, 0.0, 10.0);
        let b = body(ShapeKind::Circle, 15.0, 0.0, 10.0);
        let pen = body_body(&a, &b).unwrap();
        assert!((pen.depth - 5.0).abs() < 1e-5);
        assert_eq!(pen.normal, Vec2::X);

        let far = body(ShapeKind::Circle, 25.0, 0.0, 10.0);
        assert!(body_body(&a, &far).is_none());
    }

    #[test]
    fn test_coincident_circles_no_nan() {
        let a = body(ShapeKind::Circle, 5.0, 5.0, 10.0);
        let b = body(ShapeKind::Circle, 5.0, 5.0, 10.0);
        let pen = body_body(&a, &b).unwrap();
        assert!(!pen.normal.is_nan());
        assert!((pen.depth - 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_square_square_sat() {
        let a = body(ShapeKind::Square, 0.0, 0.0, 10.0);
        let b = body(ShapeKind::Square, 18.0, 2.0, 10.0);
        let pen = body_body(&a, &b).unwrap();
        assert!((pen.depth - 2.0).abs() < 1e-3);
        assert!(pen.normal.x > 0.99);

        let apart = body(ShapeKind::Square, 21.0, 0.0, 10.0);
        assert!(body_body(&a, &apart).is_none());
    }

    #[test]
    fn test_circle_polygon_normal_orientation() {
        let square = body(ShapeKind::Square, 0.0, 0.0, 10.0);
        let circle = body(ShapeKind::Circle, 0.0, -15.0, 8.0);
        let pen = body_body(&square, &circle).unwrap();
        assert!(pen.normal.y < -0.99);
        assert!((pen.depth - 3.0).abs() < 1e-3);

        let flipped = body_body(&circle, &square).unwrap();
        assert!(flipped.normal.y > 0.99);
    }

    #[test]
    fn test_triangle_circle_corner_gap() {
        // Circle near a triangle vertex but outside it
        let tri = body(ShapeKind::Triangle, 0.0, 0.0, 20.0);
        let tip = tri.vertices().next().unwrap();
        let out = tip + (tip - tri.pos).normalize() * 6.0;
        let circle = body(ShapeKind::Circle, out.x, out.y, 5.0);
        assert!(body_body(&tri, &circle).is_none());
    }

    #[test]
    fn test_wall_half_plane_pushes_inward() {
        let walls = Boundary::enclosing(800.0, 600.0, 50.0, 1.2);
        let left = walls.iter().find(|w| w.edge == Edge::Left).unwrap();

        // Deep inside the wall, past its centerline
        let b = body(ShapeKind::Circle, -70.0, 300.0, 10.0);
        let pen = body_wall(&b, left).unwrap();
        assert_eq!(pen.normal, Vec2::NEG_X);
        assert!((pen.depth - 80.0).abs() < 1e-4);

        let inside = body(ShapeKind::Circle, 20.0, 300.0, 10.0);
        assert!(body_wall(&inside, left).is_none());
    }

    #[test]
    fn test_wall_bounce_gains_energy() {
        let mut b = body(ShapeKind::Circle, 5.0, 300.0, 10.0);
        b.vel = Vec2::new(-10.0, 0.0);
        let mut world = world_with(vec![b]);

        let contacts = detect(&world);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].restitution, 1.2);

        solve_velocities(&mut world.bodies, &contacts, 10);
        assert!((world.bodies[0].vel.x - 12.0).abs() < 1e-3);

        solve_positions(&mut world, &contacts, 10);
        assert!(world.bodies[0].pos.x > 9.8);
    }

    #[test]
    fn test_slow_contact_does_not_bounce() {
        let mut b = body(ShapeKind::Circle, 9.0, 300.0, 10.0);
        b.vel = Vec2::new(-1.0, 0.0);
        let mut world = world_with(vec![b]);
        let contacts = detect(&world);
        solve_velocities(&mut world.bodies, &contacts, 10);
        assert!(world.bodies[0].vel.x.abs() < 1e-4);
    }

    #[test]
    fn test_head_on_equal_mass_exchange() {
        let mut a = body(ShapeKind::Circle, 100.0, 100.0, 10.0);
        let mut b = body(ShapeKind::Circle, 119.0, 100.0, 10.0);
        a.vel = Vec2::new(5.0, 0.0);
        b.vel = Vec2::new(-5.0, 0.0);
        let mut world = world_with(vec![a, b]);

        let contacts = detect(&world);
        assert_eq!(contacts.len(), 1);
        solve_velocities(&mut world.bodies, &contacts, 10);

        // Restitution 1.0: velocities swap
        assert!((world.bodies[0].vel.x + 5.0).abs() < 1e-3);
        assert!((world.bodies[1].vel.x - 5.0).abs() < 1e-3);
    }
}
