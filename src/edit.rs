use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

/// Largest file, in bytes, whose expected text is kept verbatim.
pub const EXACT_MATCH_LIMIT: usize = 1024;

/// Whole-file replacement with verification.
///
/// Document edits happen in memory on a parsed tree; the result reaches
/// disk only through a `Rewrite`, which checks that the file still holds
/// the text the tree was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Rewrite does nothing until apply() is called"]
pub struct Rewrite {
    pub file: PathBuf,
    /// What the file must contain for the rewrite to go ahead.
    pub expected_before: EditVerification,
    pub new_text: String,
}

/// Verification strategy for rewrite safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    ExactMatch(String),
    /// xxh3 hash of the expected text, used for large files.
    Hash(u64),
}

impl EditVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Exact text for small files, a hash above [`EXACT_MATCH_LIMIT`].
    pub fn from_text(text: &str) -> Self {
        if text.len() > EXACT_MATCH_LIMIT {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }

    pub fn hash(&self) -> u64 {
        match self {
            EditVerification::Hash(h) => *h,
            EditVerification::ExactMatch(text) => xxh3_64(text.as_bytes()),
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("{file} changed since it was read (expected hash {expected:016x})")]
    BeforeTextMismatch { file: PathBuf, expected: u64 },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{file} is not valid UTF-8")]
    NotUtf8 { file: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "RewriteResult should be checked for success/already-applied"]
pub enum RewriteResult {
    Applied { file: PathBuf, bytes_written: usize },
    /// The file already held the new text.
    AlreadyApplied { file: PathBuf },
}

impl Rewrite {
    pub fn new(
        file: impl Into<PathBuf>,
        before: &str,
        new_text: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            expected_before: EditVerification::from_text(before),
            new_text: new_text.into(),
        }
    }

    /// Check the file on disk. Returns `false` when it already holds the
    /// new text.
    fn validate(&self, current: &str) -> Result<bool, EditError> {
        if current == self.new_text {
            return Ok(false);
        }
        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                file: self.file.clone(),
                expected: self.expected_before.hash(),
            });
        }
        Ok(true)
    }

    fn read_current(&self) -> Result<String, EditError> {
        let bytes = fs::read(&self.file)?;
        String::from_utf8(bytes).map_err(|_| EditError::NotUtf8 {
            file: self.file.clone(),
        })
    }

    /// Verify and write atomically.
    pub fn apply(&self) -> Result<RewriteResult, EditError> {
        let current = self.read_current()?;
        if !self.validate(&current)? {
            debug!(file = %self.file.display(), "rewrite already applied");
            return Ok(RewriteResult::AlreadyApplied {
                file: self.file.clone(),
            });
        }

        atomic_write(&self.file, self.new_text.as_bytes())?;
        debug!(file = %self.file.display(), bytes = self.new_text.len(), "rewrote file");
        Ok(RewriteResult::Applied {
            file: self.file.clone(),
            bytes_written: self.new_text.len(),
        })
    }
}

/// Tempfile in the same directory, fsync, rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
