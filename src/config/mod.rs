// src/config/mod.rs

//! Configuration loading and validation for plansolve.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate transport settings and the configured host (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ClientSection, ConfigFile, LoggingSection, OutputSection, RawConfigFile};
pub use validate::validate_config;
