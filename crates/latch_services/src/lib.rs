//! Latch Services Layer
//!
//! Platform-facing configuration for the runtime.

pub mod settings;

pub use settings::{AssetSettings, Settings, SettingsError};
