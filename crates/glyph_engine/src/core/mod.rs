//! # Core Module
//!
//! Shared abstractions used across the crate.
//!
//! ## Organization
//!
//! - **Config**: Application, window and text configuration

pub mod config;

pub use config::{
    ApplicationConfig,
    Config,
    ConfigError,
    EngineConfig,
    TextConfig,
    WindowConfig,
};
