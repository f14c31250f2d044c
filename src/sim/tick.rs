//! Fixed timestep simulation tick
//!
//! One tick: pointer forces for every body, then integration, then
//! collisions. Forces are fully computed before any body moves.

use glam::Vec2;

use super::collision;
use super::forces::{Attraction, apply_pointer_attraction};
use super::pointer::PointerState;
use super::world::World;
use crate::consts::*;
use crate::settings::FieldSettings;

/// Force-to-velocity scale for one tick (Δ² with Δ in milliseconds)
pub const FORCE_SCALE: f32 = TICK_MS * TICK_MS;

/// Advance the world by one tick
pub fn step(world: &mut World, pointer: &PointerState, settings: &FieldSettings) {
    let attraction = Attraction {
        radius: settings.attraction_radius,
        strength: settings.attraction_force,
    };
    apply_pointer_attraction(&mut world.bodies, pointer.pos, &attraction);

    for body in &mut world.bodies {
        let damping = 1.0 - body.material.air_friction;
        body.vel = body.vel * damping + body.force * body.inv_mass * FORCE_SCALE;
        body.vel = body.vel.clamp_length_max(settings.max_speed);
        body.pos += body.vel;
        body.force = Vec2::ZERO;
    }

    let contacts = collision::detect(world);
    if !contacts.is_empty() {
        collision::solve_velocities(&mut world.bodies, &contacts, settings.velocity_iterations);
        collision::solve_positions(world, &contacts, settings.position_iterations);
        // Bounces with restitution above 1.0 can push a body past the cap
        for body in &mut world.bodies {
            body.vel = body.vel.clamp_length_max(settings.max_speed);
        }
    }

    world.ticks += 1;
}

/// Converts frame timestamps into a whole number of fixed ticks
#[derive(Debug, Clone)]
pub struct Stepper {
    accumulator: f32,
    last_time: Option<f64>,
    running: bool,
}

impl Default for Stepper {
    fn default() -> Self {
        Self::new()
    }
}

impl Stepper {
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            last_time: None,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop stepping; later frames yield no ticks
    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
    }

    /// Ticks due for a frame at `time_ms` (frame clock, milliseconds).
    ///
    /// The first frame runs a single tick. Long frames are clamped so a
    /// hidden tab does not fast-forward the field.
    pub fn advance(&mut self, time_ms: f64) -> u32 {
        if !self.running {
            return 0;
        }

        let dt = match self.last_time {
            Some(last) => ((time_ms - last) as f32).clamp(0.0, MAX_FRAME_MS),
            None => TICK_MS,
        };
        self.last_time = Some(time_ms);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= TICK_MS && substeps < MAX_SUBSTEPS {
            self.accumulator -= TICK_MS;
            substeps += 1;
        }
        // Drop whatever the substep cap left behind
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(TICK_MS);
        }
        substeps
    }
}
