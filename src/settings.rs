//! Field settings and tunables
//!
//! Defaults mirror `consts`. Persisted in LocalStorage on web so a page can
//! tune the background without a rebuild.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Upper bounds applied when sanitizing
const MAX_BODY_COUNT: usize = 500;
const MAX_BODY_SIZE: f32 = 200.0;
const MAX_SPEED_LIMIT: f32 = 100.0;
const MAX_SOLVER_ITERATIONS: u32 = 50;

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Triangle fan segments used to tessellate circles
    pub fn circle_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 12,
            QualityPreset::Medium => 24,
            QualityPreset::High => 48,
        }
    }

    /// Whether to render at the device pixel ratio (otherwise CSS pixels)
    pub fn use_device_pixel_ratio(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Field settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === World ===
    /// Dynamic bodies created per mount
    pub body_count: usize,
    /// Body size range [min, max) in pixels
    pub min_size: f32,
    pub max_size: f32,
    /// Initial velocity range per axis in px/tick
    pub max_initial_speed: f32,

    // === Material ===
    pub air_friction: f32,
    pub body_restitution: f32,
    pub wall_restitution: f32,
    pub density: f32,

    // === Pointer ===
    /// Attraction cutoff distance in pixels
    pub attraction_radius: f32,
    /// Attraction force magnitude
    pub attraction_force: f32,

    // === Solver ===
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    /// Speed cap in px/tick. Restitution above 1.0 adds energy on every
    /// bounce, and faster bodies bounce more often, so the field needs a cap.
    pub max_speed: f32,

    /// Fixed RNG seed (random per mount when unset)
    pub seed: Option<u64>,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            body_count: BODY_COUNT,
            min_size: BODY_MIN_SIZE,
            max_size: BODY_MAX_SIZE,
            max_initial_speed: BODY_MAX_INITIAL_SPEED,

            air_friction: BODY_AIR_FRICTION,
            body_restitution: BODY_RESTITUTION,
            wall_restitution: WALL_RESTITUTION,
            density: BODY_DENSITY,

            attraction_radius: ATTRACTION_RADIUS,
            attraction_force: ATTRACTION_FORCE,

            velocity_iterations: VELOCITY_ITERATIONS,
            position_iterations: POSITION_ITERATIONS,
            max_speed: BODY_MAX_SPEED,

            seed: None,
        }
    }
}

impl FieldSettings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Clamp values into ranges the simulation can work with.
    ///
    /// Non-finite values fall back to their defaults; everything else is
    /// clamped so that sampling ranges are never empty.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        self.body_count = match self.body_count {
            0 => defaults.body_count,
            n => n.min(MAX_BODY_COUNT),
        };

        if !(self.min_size > 0.0) {
            self.min_size = defaults.min_size;
        }
        self.min_size = self.min_size.min(MAX_BODY_SIZE);
        if !(self.max_size > self.min_size) {
            self.max_size = self.min_size + 1.0;
        }
        self.max_size = self.max_size.min(MAX_BODY_SIZE + 1.0);

        self.max_initial_speed =
            finite_or(self.max_initial_speed, defaults.max_initial_speed)
                .abs()
                .min(MAX_SPEED_LIMIT);
        self.air_friction = finite_or(self.air_friction, defaults.air_friction).clamp(0.0, 1.0);
        self.body_restitution =
            finite_or(self.body_restitution, defaults.body_restitution).clamp(0.0, 2.0);
        self.wall_restitution =
            finite_or(self.wall_restitution, defaults.wall_restitution).clamp(0.0, 2.0);
        if !(self.density > 0.0 && self.density.is_finite()) {
            self.density = defaults.density;
        }
        self.attraction_radius =
            finite_or(self.attraction_radius, defaults.attraction_radius).max(0.0);
        self.attraction_force = finite_or(self.attraction_force, defaults.attraction_force);
        self.velocity_iterations = self.velocity_iterations.clamp(1, MAX_SOLVER_ITERATIONS);
        self.position_iterations = self.position_iterations.clamp(1, MAX_SOLVER_ITERATIONS);
        if !(self.max_speed > 0.0) {
            self.max_speed = defaults.max_speed;
        }
        self.max_speed = self.max_speed.min(MAX_SPEED_LIMIT);
        self
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "shape_field_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded field settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored field settings: {}", e),
                }
            }
        }

        log::info!("Using default field settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Field settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
