//! # Core Engine Module
//!
//! Shared abstractions used throughout the engine.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration system for all engine subsystems
//! - **Foundation**: Low-level utilities (math, logging)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    ApplicationConfig,
    CharacterConfig,
    ColliderConfig,
    EngineConfig,
    Config,
    ConfigError,
    DEFAULT_CEILING_NORMAL_Y,
    DEFAULT_FLOOR_NORMAL_Y,
};
