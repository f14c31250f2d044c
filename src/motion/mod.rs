//! Page motion helpers driven from the frame loop
//!
//! Pure time-to-value functions; the browser glue lives in `platform`.

pub mod ease;
pub mod entrance;
pub mod orbit;
pub mod scroll;

pub use ease::Ease;
pub use entrance::{Entrance, EntranceTimeline};
pub use orbit::{OrbitDot, OrbitPath};
pub use scroll::SmoothScroll;
