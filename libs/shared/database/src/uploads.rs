use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::store::StoreError;

/// URL prefix the upload root is served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    ProfilePicture,
    Prescription,
}

impl UploadKind {
    fn subdirectory(&self) -> Option<&'static str> {
        match self {
            UploadKind::ProfilePicture => None,
            UploadKind::Prescription => Some("prescriptions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Path clients fetch the file from, e.g. `/uploads/prescriptions/<name>`.
    pub public_path: String,
    pub disk_path: PathBuf,
}

/// Filesystem area for uploaded pictures and prescriptions.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn save(
        &self,
        kind: UploadKind,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, StoreError> {
        let file_name = stored_file_name(original_name);

        let (directory, public_path) = match kind.subdirectory() {
            Some(sub) => (self.root.join(sub), format!("{}/{}/{}", UPLOADS_ROUTE, sub, file_name)),
            None => (self.root.clone(), format!("{}/{}", UPLOADS_ROUTE, file_name)),
        };

        fs::create_dir_all(&directory).await?;
        let disk_path = directory.join(&file_name);
        fs::write(&disk_path, bytes).await?;

        debug!("Stored {} bytes at {}", bytes.len(), disk_path.display());
        Ok(StoredFile { public_path, disk_path })
    }

    /// Disk location of a stored file. `None` unless `file_name` is a single
    /// plain path component.
    pub fn locate(&self, kind: UploadKind, file_name: &str) -> Option<PathBuf> {
        let plain = !file_name.is_empty()
            && Path::new(file_name).file_name().and_then(|name| name.to_str()) == Some(file_name)
            && file_name != ".."
            && !file_name.contains('\\');
        if !plain {
            return None;
        }

        let directory = match kind.subdirectory() {
            Some(sub) => self.root.join(sub),
            None => self.root.clone(),
        };
        Some(directory.join(file_name))
    }

    /// Best effort: a file that is already gone is not an error.
    pub async fn remove(&self, file: &StoredFile) {
        if let Err(e) = fs::remove_file(&file.disk_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove upload {}: {}", file.disk_path.display(), e);
            }
        }
    }
}

/// `<millis>_<8 hex>_<name>`: the random segment separates uploads landing in
/// the same millisecond, and only the sanitised final path component of the
/// client's name is kept.
fn stored_file_name(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");

    let mut sanitized: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    if sanitized.trim_matches('.').is_empty() {
        sanitized = "upload".to_string();
    }

    let token = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", Utc::now().timestamp_millis(), &token[..8], sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_cannot_escape_the_upload_root() {
        let name = stored_file_name("../../etc/passwd");
        assert!(name.ends_with("_passwd"));
        assert!(!name.contains('/'));

        let name = stored_file_name("..");
        assert!(name.ends_with("_upload"));

        let name = stored_file_name("my scan (1).pdf");
        assert!(name.ends_with("_my_scan__1_.pdf"));
    }

    #[test]
    fn same_name_uploads_get_distinct_names() {
        assert_ne!(stored_file_name("rx.pdf"), stored_file_name("rx.pdf"));
    }

    #[tokio::test]
    async fn prescriptions_land_in_their_own_directory() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(dir.path());

        let stored = uploads.save(UploadKind::Prescription, "rx.pdf", b"%PDF-1.4").await.unwrap();
        assert!(stored.public_path.starts_with("/uploads/prescriptions/"));
        assert_eq!(std::fs::read(&stored.disk_path).unwrap(), b"%PDF-1.4");

        let picture = uploads.save(UploadKind::ProfilePicture, "me.png", b"png").await.unwrap();
        assert!(picture.public_path.starts_with("/uploads/"));
        assert!(!picture.public_path.contains("prescriptions"));

        let name = stored.public_path.rsplit('/').next().unwrap();
        assert_eq!(uploads.locate(UploadKind::Prescription, name), Some(stored.disk_path.clone()));
        assert_eq!(uploads.locate(UploadKind::Prescription, "../secret"), None);
        assert_eq!(uploads.locate(UploadKind::Prescription, ".."), None);

        uploads.remove(&stored).await;
        assert!(!stored.disk_path.exists());
        // Removing twice is silent.
        uploads.remove(&stored).await;
    }
}
