//! Path checks for edit targets.
//!
//! Every target is canonicalised first, so symlinks and `..` cannot walk
//! a rewrite out of the workspace or into a directory Terraform manages.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Directory names that are never edited, wherever they appear below the
/// workspace root: provider/module caches and VCS metadata.
const FORBIDDEN_DIR_NAMES: &[&str] = &[".terraform", ".git"];

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("{path} is not inside the workspace {workspace}")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("{path} is inside protected directory {forbidden}")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("cannot resolve path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

/// Keeps rewrites inside one workspace directory.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    root: PathBuf,
    /// Canonical directories outside the name-based rules, such as the
    /// plugin cache under the home directory.
    protected: Vec<PathBuf>,
}

impl WorkspaceGuard {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let protected = home::home_dir()
            .and_then(|home| home.join(".terraform.d").canonicalize().ok())
            .into_iter()
            .collect();
        Self::with_protected(root, protected)
    }

    fn with_protected(root: impl AsRef<Path>, protected: Vec<PathBuf>) -> Result<Self, SafetyError> {
        Ok(Self {
            root: root.as_ref().canonicalize()?,
            protected,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.root
    }

    /// Canonicalise `path` (relative paths start at the workspace root)
    /// and check it. The target must exist.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let canonical = self.root.join(path.as_ref()).canonicalize()?;
        self.check(&canonical)?;
        Ok(canonical)
    }

    fn check(&self, canonical: &Path) -> Result<(), SafetyError> {
        let inner = match canonical.strip_prefix(&self.root) {
            Ok(inner) => inner,
            Err(_) => {
                return Err(SafetyError::OutsideWorkspace {
                    path: canonical.to_path_buf(),
                    workspace: self.root.clone(),
                })
            }
        };

        let mut dir = self.root.clone();
        for component in inner.components() {
            dir.push(component);
            if let Component::Normal(name) = component {
                if is_forbidden_name(name) {
                    return Err(SafetyError::ForbiddenPath {
                        path: canonical.to_path_buf(),
                        forbidden: dir,
                    });
                }
            }
        }

        match self.protected.iter().find(|dir| canonical.starts_with(dir)) {
            Some(dir) => Err(SafetyError::ForbiddenPath {
                path: canonical.to_path_buf(),
                forbidden: dir.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn is_forbidden_name(name: &OsStr) -> bool {
    FORBIDDEN_DIR_NAMES.iter().any(|forbidden| name == *forbidden)
}
