use crate::config::schema::{EditScript, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    /// Script file the error refers to, when it came from one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Io { path, .. } => Some(path),
            ConfigError::Toml { path, .. } | ConfigError::Validation { path, .. } => {
                path.as_deref()
            }
        }
    }

    fn at(self, script: &Path) -> Self {
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(script.to_path_buf()),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(script.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = match self.path() {
            Some(path) => format!(" ({})", path.display()),
            None => String::new(),
        };
        match self {
            ConfigError::Io { source, .. } => {
                write!(f, "failed to read edit script{location}: {source}")
            }
            ConfigError::Toml { source, .. } => {
                write!(f, "edit script is not valid TOML{location}: {source}")
            }
            ConfigError::Validation { source, .. } => {
                write!(f, "invalid edit script{location}:\n{source}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<EditScript, ConfigError> {
    let script: EditScript = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    script
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(script)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<EditScript, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let script = load_from_str(&contents).map_err(|error| error.at(path))?;
    debug!(script = %path.display(), edits = script.edits.len(), "loaded edit script");
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reports_path_on_validation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        fs::write(&path, "[meta]\nname = \"nothing\"\n").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { path: Some(_), .. }));
        assert!(err.to_string().contains("empty.toml"));
        assert!(err.to_string().contains("no edits"));
    }

    #[test]
    fn load_reports_toml_errors() {
        let err = load_from_str("[[edits]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { path: None, .. }));
        assert!(err.path().is_none());
    }

    #[test]
    fn load_missing_file() {
        let err = load_from_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
