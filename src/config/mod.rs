// src/config/mod.rs

//! Manifest loading and validation.
//!
//! - `model.rs`: the TOML-backed data model.
//! - `loader.rs`: reading a manifest from disk.
//! - `validate.rs`: turning a `RawManifest` into a checked `Manifest`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_manifest_path, load_and_validate, load_from_path};
pub use model::{ConfigSection, Manifest, ProgramConfig, RawManifest};
