use std::fmt;
use std::path::Path;
use std::sync::Arc;
use crate::error::WizardError;

/// A spreadsheet picked for upload.
/// Contents are shared so state snapshots stay cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub contents: Arc<[u8]>,
}

impl UploadedFile {
    pub fn new<S: Into<String>>(file_name: S, contents: impl Into<Arc<[u8]>>) -> Self {
        UploadedFile {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }

    /// Read a file from disk, keeping only its final path component as the name
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, WizardError> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path).await.map_err(|e| WizardError::Io {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.xlsx")
            .to_string();

        tracing::debug!(file = %file_name, bytes = contents.len(), "Loaded upload");
        Ok(UploadedFile::new(file_name, contents))
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

// Never dump file contents into logs
impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("len", &self.contents.len())
            .finish()
    }
}
