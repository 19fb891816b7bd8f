//! Idempotent writer
//!
//! Generated files are rewritten only when their content changes, so build
//! tools watching timestamps see no activity on a no-op run.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::TscfgResult;
use crate::fs::FileSystem;

/// SHA-256 of a file's content, with a `sha256:` prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub const PREFIX: &'static str = "sha256:";

    pub fn from_content(content: &str) -> Self {
        let digest = Sha256::digest(content.as_bytes());
        Self(format!("{}{:x}", Self::PREFIX, digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex digest without the prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What happened to one output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    /// Content differed (or the file was missing) and was written
    Written,
    /// Existing content already matched
    Unchanged,
    /// Dry run: the file would have been written
    WouldWrite,
}

impl WriteOutcome {
    pub fn changed(self) -> bool {
        !matches!(self, WriteOutcome::Unchanged)
    }
}

/// Writes through a [`FileSystem`] only when content differs
pub struct IdempotentWriter<'a, F: FileSystem> {
    fs: &'a F,
    dry_run: bool,
}

impl<'a, F: FileSystem> IdempotentWriter<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs, dry_run: false }
    }

    /// Compare only; never touch the disk
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Current content of `path`, if the file exists.
    ///
    /// Bytes that are not UTF-8 are replaced, so this is for display only.
    pub fn current(&self, path: &Path) -> TscfgResult<Option<String>> {
        let bytes = self.current_bytes(path)?;
        Ok(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
    }

    fn current_bytes(&self, path: &Path) -> TscfgResult<Option<Vec<u8>>> {
        if self.fs.exists(path) {
            self.fs.read_bytes(path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn write(&self, path: &Path, content: &str) -> TscfgResult<WriteOutcome> {
        if let Some(existing) = self.current_bytes(path)? {
            if existing == content.as_bytes() {
                debug!(path = %path.display(), "content unchanged, skipping write");
                return Ok(WriteOutcome::Unchanged);
            }
        }

        if self.dry_run {
            debug!(path = %path.display(), "dry run, would write");
            return Ok(WriteOutcome::WouldWrite);
        }

        self.fs.write(path, content)?;
        debug!(path = %path.display(), bytes = content.len(), "wrote file");
        Ok(WriteOutcome::Written)
    }
}
