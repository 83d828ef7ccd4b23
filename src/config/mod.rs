//! Configuration module for precis
//!
//! Handles loading and managing application settings from TOML files.

mod settings;

pub use settings::{EmailSettings, GeneralSettings, LlmSettings, ServerSettings, Settings};
