//! Pointer attraction field
//!
//! Recomputed from scratch every tick; nothing carries over between ticks.

use glam::Vec2;

use super::body::Body;

/// Attraction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attraction {
    /// Cutoff distance; bodies farther away feel nothing
    pub radius: f32,
    /// Force magnitude inside the cutoff
    pub strength: f32,
}

impl Attraction {
    /// Force on a body at `body_pos` toward `pointer`.
    ///
    /// Zero when the distance is 0 or beyond the cutoff.
    pub fn force_at(&self, body_pos: Vec2, pointer: Vec2) -> Vec2 {
        let diff = pointer - body_pos;
        let dist = diff.length();
        if dist > 0.0 && dist <= self.radius {
            diff / dist * self.strength
        } else {
            Vec2::ZERO
        }
    }
}

/// Add the pointer attraction to every body's force accumulator
pub fn apply_pointer_attraction(bodies: &mut [Body], pointer: Vec2, attraction: &Attraction) {
    for body in bodies.iter_mut() {
        body.force += attraction.force_at(body.pos, pointer);
    }
}
