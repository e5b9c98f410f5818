// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{Manifest, RawManifest};
use crate::errors::Result;

/// Load a manifest from a given path and return the raw `RawManifest`.
///
/// This only performs TOML deserialization; it does **not** perform
/// semantic validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawManifest> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let manifest: RawManifest = toml::from_str(&contents)?;

    Ok(manifest)
}

/// Load a manifest, validate it, and anchor relative paths at the
/// manifest's directory.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Manifest> {
    let path = path.as_ref();
    let raw = load_from_path(path)?;
    let manifest = Manifest::try_from(raw)?;
    Ok(manifest.with_root(manifest_root_dir(path)))
}

/// Default manifest location: `Testexec.toml` in the working directory.
pub fn default_manifest_path() -> PathBuf {
    PathBuf::from("Testexec.toml")
}

/// Directory a manifest's relative paths are resolved against.
///
/// A bare file name like "Testexec.toml" has an empty parent, which means
/// the current directory.
fn manifest_root_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_file_name_resolves_to_cwd() {
        assert_eq!(manifest_root_dir(Path::new("Testexec.toml")), PathBuf::from("."));
        assert_eq!(
            manifest_root_dir(Path::new("suite/Testexec.toml")),
            PathBuf::from("suite")
        );
    }
}
