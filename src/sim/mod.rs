//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by arena index)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod forces;
pub mod pointer;
pub mod tick;
pub mod world;

pub use body::{Body, Boundary, Edge, Material, PALETTE, ShapeKind};
pub use collision::{Contact, Penetration, body_body, body_wall};
pub use forces::{Attraction, apply_pointer_attraction};
pub use pointer::PointerState;
pub use tick::{Stepper, step};
pub use world::{Viewport, World, build_world};
