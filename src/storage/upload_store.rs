//! Storage for raw uploaded files

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Stores the raw source file for the active document, keyed by its
/// original filename.
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Reject filenames that are empty or escape the store directory
    pub fn validate_filename(filename: &str) -> Result<()> {
        if filename.is_empty() {
            return Err(Error::InvalidFilename("empty filename".to_string()));
        }
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err(Error::InvalidFilename(filename.to_string()));
        }
        Ok(())
    }

    fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Write the raw file
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        Self::validate_filename(filename)?;
        fs::write(self.path_for(filename), bytes)?;
        Ok(())
    }

    /// Read the raw file back
    pub fn read(&self, filename: &str) -> Result<Vec<u8>> {
        Self::validate_filename(filename)?;
        match fs::read(self.path_for(filename)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::DocumentNotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the raw file; returns whether it existed
    pub fn delete(&self, filename: &str) -> Result<bool> {
        Self::validate_filename(filename)?;
        match fs::remove_file(self.path_for(filename)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every stored file
    pub fn purge_all(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Directory this store writes into
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();

        store.save("manual.pdf", b"raw bytes").unwrap();
        assert_eq!(store.read("manual.pdf").unwrap(), b"raw bytes");
        assert!(store.delete("manual.pdf").unwrap());
        assert!(!store.delete("manual.pdf").unwrap());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.read("ghost.pdf").unwrap_err(),
            Error::DocumentNotFound(_)
        ));
    }

    #[test]
    fn path_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();
        for name in ["../evil.pdf", "a/b.pdf", "a\\b.pdf", ""] {
            assert!(matches!(
                store.save(name, b"x").unwrap_err(),
                Error::InvalidFilename(_)
            ));
        }
    }

    #[test]
    fn purge_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();
        store.save("a.pdf", b"a").unwrap();
        store.save("b.pdf", b"b").unwrap();
        assert_eq!(store.purge_all().unwrap(), 2);
        assert!(matches!(
            store.read("a.pdf").unwrap_err(),
            Error::DocumentNotFound(_)
        ));
    }
}
