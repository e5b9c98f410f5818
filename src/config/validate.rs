// src/config/validate.rs

use crate::config::model::{Manifest, RawManifest};
use crate::errors::{Result, TestexecError};

impl TryFrom<RawManifest> for Manifest {
    type Error = TestexecError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        validate_raw_manifest(&raw)?;
        Ok(Manifest::new_unchecked(raw.config, raw.program))
    }
}

fn validate_raw_manifest(raw: &RawManifest) -> Result<()> {
    ensure_has_programs(raw)?;
    validate_global_config(raw)?;
    validate_programs(raw)?;
    Ok(())
}

fn ensure_has_programs(raw: &RawManifest) -> Result<()> {
    if raw.program.is_empty() {
        return Err(TestexecError::ConfigError(
            "manifest must contain at least one [program.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(raw: &RawManifest) -> Result<()> {
    if raw.config.work_dir.as_os_str().is_empty() {
        return Err(TestexecError::ConfigError(
            "[config].work_dir must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_programs(raw: &RawManifest) -> Result<()> {
    for (name, program) in raw.program.iter() {
        if program.path.as_os_str().is_empty() {
            return Err(TestexecError::ConfigError(format!(
                "program '{name}' has an empty `path`"
            )));
        }
        // Names become directory names under work_dir.
        if name.contains('/') || name == "." || name == ".." {
            return Err(TestexecError::ConfigError(format!(
                "program name '{name}' cannot be used as a directory name"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::*;
    use crate::config::model::{ConfigSection, ProgramConfig};

    fn raw_with(programs: &[(&str, &str)]) -> RawManifest {
        let mut program = BTreeMap::new();
        for (name, path) in programs {
            program.insert(
                name.to_string(),
                ProgramConfig {
                    path: PathBuf::from(path),
                    args: vec![],
                },
            );
        }
        RawManifest {
            config: ConfigSection::default(),
            program,
        }
    }

    #[test]
    fn empty_manifest_is_rejected() {
        let err = Manifest::try_from(raw_with(&[])).unwrap_err();
        assert!(matches!(err, TestexecError::ConfigError(msg) if msg.contains("at least one")));
    }

    #[test]
    fn empty_path_is_rejected() {
        let err = Manifest::try_from(raw_with(&[("a", "")])).unwrap_err();
        assert!(matches!(err, TestexecError::ConfigError(msg) if msg.contains("empty `path`")));
    }

    #[test]
    fn slash_in_name_is_rejected() {
        let err = Manifest::try_from(raw_with(&[("a/b", "bin/a")])).unwrap_err();
        assert!(matches!(err, TestexecError::ConfigError(_)));
    }

    #[test]
    fn empty_work_dir_is_rejected() {
        let mut raw = raw_with(&[("a", "bin/a")]);
        raw.config.work_dir = PathBuf::new();
        assert!(Manifest::try_from(raw).is_err());
    }

    #[test]
    fn valid_manifest_resolves_against_root() {
        let manifest = Manifest::try_from(raw_with(&[("a", "bin/a")]))
            .unwrap()
            .with_root("/srv/suite");
        let program = &manifest.program["a"];
        assert_eq!(manifest.program_path(program), PathBuf::from("/srv/suite/bin/a"));
        assert_eq!(manifest.work_dir(), PathBuf::from("/srv/suite/.testexec"));
    }
}
