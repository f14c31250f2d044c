//! World state and the world builder
//!
//! The world is a flat arena: dynamic bodies in a `Vec` indexed by position
//! and four fixed boundaries. It owns everything it simulates.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{Body, Boundary, Material, PALETTE, ShapeKind};
use crate::consts::WALL_MARGIN;
use crate::settings::FieldSettings;

/// Host region size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Laid out with a non-zero area
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether `p` lies within the viewport grown by `margin` on every side
    pub fn contains(&self, p: Vec2, margin: f32) -> bool {
        p.x >= -margin
            && p.x <= self.width + margin
            && p.y >= -margin
            && p.y <= self.height + margin
    }
}

/// Complete simulation world (serializable for inspection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub viewport: Viewport,
    /// Dynamic bodies, fixed count for the world's lifetime
    pub bodies: Vec<Body>,
    pub boundaries: [Boundary; 4],
    /// Ticks simulated so far
    pub ticks: u64,
}

impl World {
    /// Total number of bodies, static included
    pub fn body_count(&self) -> usize {
        self.bodies.len() + self.boundaries.len()
    }

    /// Total kinetic energy of the dynamic bodies
    pub fn kinetic_energy(&self) -> f32 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }

    /// Rebuild boundaries around a new viewport. Bodies are kept.
    pub fn fit_boundaries(&mut self, viewport: Viewport) {
        let restitution = self.boundaries[0].restitution;
        self.viewport = viewport;
        self.boundaries =
            Boundary::enclosing(viewport.width, viewport.height, WALL_MARGIN, restitution);
    }

    /// Remove every dynamic body
    pub fn clear(&mut self) {
        self.bodies.clear();
    }
}

/// Build a world sized to `viewport`.
///
/// Returns `None` while the viewport has no area yet; callers retry on the
/// next frame.
pub fn build_world<R: Rng>(
    viewport: Viewport,
    settings: &FieldSettings,
    rng: &mut R,
) -> Option<World> {
    if !viewport.is_ready() {
        return None;
    }

    let material = Material {
        air_friction: settings.air_friction,
        restitution: settings.body_restitution,
        density: settings.density,
    };
    let speed = settings.max_initial_speed;

    let bodies = (0..settings.body_count)
        .map(|_| {
            let size = rng.random_range(settings.min_size..settings.max_size);
            let shape = ShapeKind::ALL[rng.random_range(0..ShapeKind::ALL.len())];
            let color = rng.random_range(0..PALETTE.len()) as u8;
            let pos = Vec2::new(
                rng.random_range(0.0..=viewport.width),
                rng.random_range(0.0..=viewport.height),
            );

            let mut body = Body::new(shape, pos, size, color, material);
            if speed > 0.0 {
                body.vel = Vec2::new(
                    rng.random_range(-speed..=speed),
                    rng.random_range(-speed..=speed),
                );
            }
            body
        })
        .collect();

    let boundaries = Boundary::enclosing(
        viewport.width,
        viewport.height,
        WALL_MARGIN,
        settings.wall_restitution,
    );

    log::info!(
        "Built world {}x{} with {} bodies",
        viewport.width,
        viewport.height,
        settings.body_count
    );

    Some(World {
        viewport,
        bodies,
        boundaries,
        ticks: 0,
    })
}
