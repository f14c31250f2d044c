//! Shape Field - a pointer-attracted floating shapes background
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, forces, collisions, stepping)
//! - `driver`: Frame-driven lifecycle (deferred build, run, teardown)
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: One-time init and browser glue
//! - `motion`: Easing, smooth scroll and entrance timing helpers
//! - `settings`: Data-driven tunables

pub mod driver;
pub mod motion;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use driver::{CancelToken, FieldDriver, FieldSurface, FrameOutcome, LoopPhase};
pub use settings::{FieldSettings, QualityPreset};

/// Simulation configuration constants
pub mod consts {
    /// Length of one physics tick in milliseconds (60 Hz base)
    pub const TICK_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame delta fed to the stepper (ms)
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Number of dynamic bodies per mount
    pub const BODY_COUNT: usize = 40;
    /// Body size range [min, max) in pixels
    pub const BODY_MIN_SIZE: f32 = 10.0;
    pub const BODY_MAX_SIZE: f32 = 35.0;
    /// Initial velocity range per axis [-v, v] in px/tick
    pub const BODY_MAX_INITIAL_SPEED: f32 = 10.0;

    /// Speed cap in px/tick; keeps restitution above 1.0 from running away
    pub const BODY_MAX_SPEED: f32 = 15.0;

    /// Body material
    pub const BODY_AIR_FRICTION: f32 = 0.002;
    pub const BODY_RESTITUTION: f32 = 1.1;
    pub const BODY_DENSITY: f32 = 0.001;

    /// Boundary walls sit this far outside each edge, twice as thick
    pub const WALL_MARGIN: f32 = 50.0;
    pub const WALL_RESTITUTION: f32 = 1.2;

    /// Pointer attraction
    pub const ATTRACTION_RADIUS: f32 = 300.0;
    pub const ATTRACTION_FORCE: f32 = 0.001;

    /// Solver iterations
    pub const VELOCITY_ITERATIONS: u32 = 10;
    pub const POSITION_ITERATIONS: u32 = 10;
}

/// Regular polygon vertex at index `i` of `sides`, on a circle of `radius`.
///
/// Vertices start half a step past the +x axis, so a square is axis aligned.
#[inline]
pub fn polygon_vertex(sides: u32, i: u32, radius: f32) -> glam::Vec2 {
    let step = std::f32::consts::TAU / sides as f32;
    let angle = step * 0.5 + step * i as f32;
    glam::Vec2::new(radius * angle.cos(), radius * angle.sin())
}

/// Convert a `0xRRGGBB` color to linear-ish RGBA floats
#[inline]
pub fn rgb_hex_to_rgba(hex: u32, alpha: f32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        alpha,
    ]
}
