//! Payment-slip storage seam.
//!
//! File storage is an external collaborator; the core only ever holds the
//! opaque path a store hands back. [`SlipStore`] is the narrow interface
//! the workflow calls through, and [`LocalSlipStore`] is the filesystem
//! implementation the bootstrap binary wires up. Tests substitute an
//! in-memory double from `test_utils`.

use crate::errors::Result;
use std::path::PathBuf;

/// Folder (relative to the store root) that payment slips live under.
pub const SLIP_FOLDER: &str = "payment_slips";

/// Narrow interface over the external file-storage service.
pub trait SlipStore: Send + Sync {
    /// Stores `bytes` under `folder` and returns the opaque path to keep
    /// on the order row.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    fn store(&self, file_name: &str, bytes: &[u8], folder: &str) -> Result<String>;

    /// Deletes a previously stored file. Deleting a path that no longer
    /// exists is a no-op.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    fn delete(&self, path: &str) -> Result<()>;
}

/// Filesystem-backed slip store rooted at a configured directory.
#[derive(Debug, Clone)]
pub struct LocalSlipStore {
    root: PathBuf,
}

impl LocalSlipStore {
    /// Creates a store rooted at `root`. The directory is created lazily
    /// on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Strips path separators out of a client-supplied file name so stored
    /// files cannot escape the slip folder.
    fn sanitize(file_name: &str) -> String {
        file_name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect()
    }
}

impl SlipStore for LocalSlipStore {
    fn store(&self, file_name: &str, bytes: &[u8], folder: &str) -> Result<String> {
        let dir = self.root.join(folder);
        std::fs::create_dir_all(&dir)?;

        let stamp = chrono::Utc::now().timestamp_millis();
        let name = format!("{stamp}-{}", Self::sanitize(file_name));
        std::fs::write(dir.join(&name), bytes)?;

        Ok(format!("{folder}/{name}"))
    }

    fn delete(&self, path: &str) -> Result<()> {
        match std::fs::remove_file(self.root.join(path)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_store_and_delete_roundtrip() {
        let root = std::env::temp_dir().join(format!(
            "och-sliptest-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let store = LocalSlipStore::new(&root);

        let path = store.store("receipt.jpg", b"fake-image", SLIP_FOLDER).unwrap();
        assert!(path.starts_with(SLIP_FOLDER));
        assert!(root.join(&path).exists());

        store.delete(&path).unwrap();
        assert!(!root.join(&path).exists());

        // Deleting again is a no-op, not an error.
        store.delete(&path).unwrap();

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_file_names_cannot_escape_the_folder() {
        let sanitized = LocalSlipStore::sanitize("../../etc/passwd");
        assert!(!sanitized.contains('/'));
        assert!(!sanitized.contains('\\'));
    }
}
