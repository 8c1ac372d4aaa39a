//! # Unified Configuration System
//!
//! Configuration for the collision core, the character stepper and general
//! engine behavior, consolidated under [`ApplicationConfig`].
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: log level
//! - **Collider Config**: surface classification thresholds and vertical margins
//! - **Character Config**: probe heights, radius and movement speeds

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// `normal.y` above which a triangle counts as a floor
pub const DEFAULT_FLOOR_NORMAL_Y: f32 = 0.25;

/// `normal.y` below which a triangle counts as a ceiling
pub const DEFAULT_CEILING_NORMAL_Y: f32 = -0.25;

/// # Collider Configuration
///
/// Surfaces steeper than the floor threshold are bucketed as walls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColliderConfig {
    /// Triangles with `normal.y` strictly above this are floors
    pub floor_normal_y: f32,
    /// Triangles with `normal.y` strictly below this are ceilings
    pub ceiling_normal_y: f32,
    /// Widens every surface's `[min_y, max_y]` range by this much on each side
    pub vertical_margin: f32,
}

impl ColliderConfig {
    /// Create a collider configuration with the default thresholds
    pub fn new() -> Self {
        Self {
            floor_normal_y: DEFAULT_FLOOR_NORMAL_Y,
            ceiling_normal_y: DEFAULT_CEILING_NORMAL_Y,
            vertical_margin: 0.0,
        }
    }

    /// Set the floor and ceiling thresholds
    #[must_use]
    pub fn with_thresholds(mut self, floor_normal_y: f32, ceiling_normal_y: f32) -> Self {
        self.floor_normal_y = floor_normal_y;
        self.ceiling_normal_y = ceiling_normal_y;
        self
    }

    /// Set the vertical margin
    #[must_use]
    pub fn with_vertical_margin(mut self, margin: f32) -> Self {
        self.vertical_margin = margin;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.floor_normal_y > 0.0 && self.floor_normal_y < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "floor_normal_y must be in (0, 1), got {}",
                self.floor_normal_y
            )));
        }
        if !(self.ceiling_normal_y > -1.0 && self.ceiling_normal_y < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "ceiling_normal_y must be in (-1, 0), got {}",
                self.ceiling_normal_y
            )));
        }
        if !(self.vertical_margin >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "vertical_margin must be non-negative, got {}",
                self.vertical_margin
            )));
        }
        Ok(())
    }
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Character Configuration
///
/// Tuning for [`crate::physics::CharacterController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Horizontal clearance kept between the character and walls
    pub radius: f32,
    /// Height above the feet at which wall rays are cast
    pub probe_height: f32,
    /// Height above the feet at which floors are still accepted (step-up height)
    pub floor_probe: f32,
    /// A floor further below the feet than this leaves the character falling
    pub fall_threshold: f32,
    /// Walking speed in units per second
    pub speed: f32,
    /// Turning speed in radians per second
    pub turn_rate: f32,
}

impl CharacterConfig {
    /// Create a character configuration with default tuning
    pub fn new() -> Self {
        Self {
            radius: 1.0,
            probe_height: 2.0,
            floor_probe: 1.0,
            fall_threshold: 2.0,
            speed: 20.0,
            turn_rate: 1.2,
        }
    }

    /// Set walking speed
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set wall clearance radius
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("radius", self.radius),
            ("probe_height", self.probe_height),
            ("floor_probe", self.floor_probe),
            ("fall_threshold", self.fall_threshold),
            ("speed", self.speed),
            ("turn_rate", self.turn_rate),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be non-negative, got {value}")));
            }
        }
        Ok(())
    }
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Engine Configuration
///
/// Core engine behavior configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }

    /// Set log level
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Collision core configuration
    pub collider: ColliderConfig,
    /// Character stepping configuration
    pub character: CharacterConfig,
}

impl ApplicationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.collider.validate()?;
        self.character.validate()?;
        Ok(())
    }
}

impl Config for ApplicationConfig {}
