#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use testexec::config::{ConfigSection, Manifest, ProgramConfig, RawManifest};

/// Builder for `Manifest` to simplify test setup.
pub struct ManifestBuilder {
    manifest: RawManifest,
    root: PathBuf,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            manifest: RawManifest {
                config: ConfigSection::default(),
                program: BTreeMap::new(),
            },
            root: PathBuf::from("."),
        }
    }

    pub fn with_program(mut self, name: &str, program: ProgramConfig) -> Self {
        self.manifest.program.insert(name.to_string(), program);
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.manifest.config.work_dir = dir.into();
        self
    }

    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = root.as_ref().to_path_buf();
        self
    }

    pub fn build(self) -> Manifest {
        Manifest::try_from(self.manifest)
            .expect("Failed to build valid manifest from builder")
            .with_root(self.root)
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ProgramConfig`.
pub struct ProgramBuilder {
    program: ProgramConfig,
}

impl ProgramBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            program: ProgramConfig {
                path: path.into(),
                args: vec![],
            },
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.program.args.push(arg.to_string());
        self
    }

    pub fn build(self) -> ProgramConfig {
        self.program
    }
}
