//! File system access
//!
//! Generation only ever reads specifications and writes artifacts, so the
//! trait is small. `LocalFs` is the real disk; tests use `MockFileSystem`.

use std::io::Write;
use std::path::Path;

use crate::error::{TscfgError, TscfgResult};

/// Abstract file system interface
pub trait FileSystem {
    /// Read file content
    fn read(&self, path: &Path) -> TscfgResult<String>;

    /// Read raw file content, which need not be UTF-8
    fn read_bytes(&self, path: &Path) -> TscfgResult<Vec<u8>>;

    /// Replace file content atomically, creating parent directories
    fn write(&self, path: &Path, content: &str) -> TscfgResult<()>;

    /// Check if file exists
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and parents
    fn create_dir_all(&self, path: &Path) -> TscfgResult<()>;
}

/// Local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn read(&self, path: &Path) -> TscfgResult<String> {
        std::fs::read_to_string(path).map_err(|e| TscfgError::io(path, e))
    }

    fn read_bytes(&self, path: &Path) -> TscfgResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| TscfgError::io(path, e))
    }

    fn write(&self, path: &Path, content: &str) -> TscfgResult<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        self.create_dir_all(parent)?;

        // temp file in the destination directory so the rename stays on one device
        let mut tmp =
            tempfile::NamedTempFile::new_in(parent).map_err(|e| TscfgError::io(parent, e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| TscfgError::io(path, e))?;
        tmp.persist(path).map_err(|e| TscfgError::io(path, e.error))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> TscfgResult<()> {
        std::fs::create_dir_all(path).map_err(|e| TscfgError::io(path, e))
    }
}

/// In-memory file system for testing
///
/// Uses `Arc<Mutex<>>` internally so it can be cloned and shared. Every
/// `write` call is counted, including ones that rewrite equal content.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockFileSystem {
    pub files: std::sync::Arc<std::sync::Mutex<std::collections::HashMap<std::path::PathBuf, String>>>,
    pub writes: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

#[cfg(test)]
impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<std::path::PathBuf>, content: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), content.to_string());
        self
    }

    pub fn content(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> TscfgResult<String> {
        self.content(path).ok_or_else(|| {
            TscfgError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "File not found"),
            )
        })
    }

    fn read_bytes(&self, path: &Path) -> TscfgResult<Vec<u8>> {
        self.read(path).map(String::into_bytes)
    }

    fn write(&self, path: &Path, content: &str) -> TscfgResult<()> {
        self.writes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn create_dir_all(&self, _path: &Path) -> TscfgResult<()> {
        Ok(())
    }
}
