//! Upload storage seam.
//!
//! Callers persist an uploaded PDF through an [`UploadStore`] before handing
//! its path to the extractor. Each stored upload gets its own identifier, so
//! concurrent uploads of the same file name never collide.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::error::{InvexError, Result};

/// Length of the random part of a stored upload's identifier.
const FILE_ID_LEN: usize = 16;

/// A file written by an [`UploadStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Identifier unique to this upload.
    pub file_id: String,
    /// Where the bytes were written.
    pub path: PathBuf,
}

/// Persists uploaded files under collision-free names.
pub trait UploadStore {
    /// Store `bytes` uploaded as `original_name`.
    fn store(&self, original_name: &str, bytes: &[u8]) -> Result<StoredUpload>;

    /// Delete a previously stored upload.
    fn remove(&self, upload: &StoredUpload) -> Result<()>;
}

/// Stores uploads as `<file_id>_<name>` files in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Create a store rooted at `root`; the directory is created on first use.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory uploads are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl UploadStore for DirectoryStore {
    fn store(&self, original_name: &str, bytes: &[u8]) -> Result<StoredUpload> {
        if !original_name.to_lowercase().ends_with(".pdf") {
            return Err(InvexError::InvalidUpload(format!(
                "not a PDF file: {}",
                original_name
            )));
        }

        let name = secure_filename(original_name);
        if name.is_empty() {
            return Err(InvexError::InvalidUpload("empty file name".to_string()));
        }

        std::fs::create_dir_all(&self.root)?;

        let suffix = format!("_{}", name);
        let mut file = tempfile::Builder::new()
            .prefix("")
            .suffix(&suffix)
            .rand_bytes(FILE_ID_LEN)
            .tempfile_in(&self.root)?;
        file.write_all(bytes)?;
        file.flush()?;

        let (_, path) = file.keep().map_err(|e| InvexError::Io(e.error))?;

        let file_id = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(suffix.as_str()))
            .map(str::to_string)
            .ok_or_else(|| InvexError::InvalidUpload(format!("unusable path {}", path.display())))?;

        debug!("Stored upload {} at {}", file_id, path.display());
        Ok(StoredUpload { file_id, path })
    }

    fn remove(&self, upload: &StoredUpload) -> Result<()> {
        std::fs::remove_file(&upload.path)?;
        Ok(())
    }
}

/// Reduce an uploaded file name to a safe single path component.
///
/// Directory parts are dropped and accented letters are folded to their
/// ASCII base (NFKD, then non-ASCII marks removed). Whitespace becomes `_`
/// and anything other than ASCII alphanumerics, `.`, `-`, `_` is removed.
/// Leading and trailing dots and underscores are stripped.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let folded: String = base.nfkd().filter(char::is_ascii).collect();

    let cleaned: String = folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    cleaned.trim_matches(['.', '_']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("invoice.pdf"), "invoice.pdf");
        assert_eq!(secure_filename("../../etc/passwd.pdf"), "passwd.pdf");
        assert_eq!(secure_filename("C:\\docs\\My Invoice (1).pdf"), "My_Invoice_1.pdf");
        assert_eq!(secure_filename(".hidden.pdf"), "hidden.pdf");
        assert_eq!(secure_filename("ünïcode.pdf"), "unicode.pdf");
        assert_eq!(secure_filename("Façture n°12.pdf"), "Facture_n12.pdf");
        assert_eq!(secure_filename("draft_.pdf."), "draft_.pdf");
    }

    #[test]
    fn test_store_writes_unique_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().join("uploads"));

        let first = store.store("invoice.pdf", b"%PDF-1.4 one").unwrap();
        let second = store.store("invoice.pdf", b"%PDF-1.4 two").unwrap();

        assert_ne!(first.file_id, second.file_id);
        assert_ne!(first.path, second.path);
        assert_eq!(first.file_id.len(), FILE_ID_LEN);
        assert_eq!(
            first.path.file_name().unwrap().to_str().unwrap(),
            format!("{}_invoice.pdf", first.file_id)
        );
        assert_eq!(std::fs::read(&second.path).unwrap(), b"%PDF-1.4 two");
    }

    #[test]
    fn test_store_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        let err = store.store("notes.txt", b"hello").unwrap_err();
        assert!(matches!(err, InvexError::InvalidUpload(_)));
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        let upload = store.store("Scan.PDF", b"%PDF").unwrap();
        assert!(upload.path.exists());
        store.remove(&upload).unwrap();
        assert!(!upload.path.exists());
    }
}
