// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Manifest as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// work_dir = ".testexec"
///
/// [program.hello]
/// path = "tests/bin/hello"
/// args = ["--verbose"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawManifest {
    #[serde(default)]
    pub config: ConfigSection,

    /// All test programs from `[program.<name>]`, keyed by name.
    #[serde(default)]
    pub program: BTreeMap<String, ProgramConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Directory that receives `<name>/stdout` and `<name>/stderr` for
    /// every program run. Relative to the manifest's directory.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".testexec")
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
        }
    }
}

/// `[program.<name>]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProgramConfig {
    /// Path to the test program. Relative paths are taken from the
    /// manifest's directory.
    pub path: PathBuf,

    /// Arguments passed after `argv[0]`.
    #[serde(default)]
    pub args: Vec<String>,
}

/// A validated manifest.
///
/// Only constructed through `TryFrom<RawManifest>`, so every instance has at
/// least one program and sane paths.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub config: ConfigSection,
    pub program: BTreeMap<String, ProgramConfig>,
    root: PathBuf,
}

impl Manifest {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        program: BTreeMap<String, ProgramConfig>,
    ) -> Self {
        Self {
            config,
            program,
            root: PathBuf::from("."),
        }
    }

    /// Set the directory relative paths are resolved against.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn program_path(&self, program: &ProgramConfig) -> PathBuf {
        self.root.join(&program.path)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root.join(&self.config.work_dir)
    }

    pub fn program_names(&self) -> impl Iterator<Item = &str> {
        self.program.keys().map(String::as_str)
    }
}
