//! Pointer state: the attraction target

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::Viewport;

/// Last known pointer/touch position in surface coordinates.
///
/// Writes simply overwrite; there is no queue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    pub pos: Vec2,
}

impl PointerState {
    /// Pointer resting at the center of the viewport
    pub fn centered(viewport: Viewport) -> Self {
        Self {
            pos: viewport.center(),
        }
    }

    /// Set from surface-relative coordinates
    #[inline]
    pub fn set(&mut self, x: f32, y: f32) {
        self.pos = Vec2::new(x, y);
    }

    /// Set from client (page) coordinates and the surface's client origin
    #[inline]
    pub fn set_from_client(&mut self, client_x: f32, client_y: f32, origin_x: f32, origin_y: f32) {
        self.set(client_x - origin_x, client_y - origin_y);
    }
}
