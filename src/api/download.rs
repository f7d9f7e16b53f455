//! Turning the backend's base64 spreadsheet into a saved file

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use std::path::{Path, PathBuf};
use crate::error::WizardError;

/// MIME type of the processed spreadsheet
pub const EXCEL_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// File name used when the backend suggests none
pub const DEFAULT_DOWNLOAD_NAME: &str = "processed-data.xlsx";

/// Standard alphabet, accepting payloads with or without `=` padding
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A decoded spreadsheet ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcelDownload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: &'static str,
}

impl ExcelDownload {
    /// Write the spreadsheet into `dir`, returning the full path
    pub async fn save_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf, WizardError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await.map_err(|e| WizardError::Io {
            message: format!("failed to create {}: {}", dir.display(), e),
        })?;

        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await.map_err(|e| WizardError::Io {
            message: format!("failed to write {}: {}", path.display(), e),
        })?;

        tracing::info!(path = ?path, bytes = self.bytes.len(), mime = self.mime, "Saved processed spreadsheet");
        Ok(path)
    }
}

/// Decode a base64 payload into raw bytes.
/// Line breaks and other whitespace inside the payload are ignored.
pub fn decode_payload(base64_payload: &str) -> Result<Vec<u8>, WizardError> {
    let compact: String = base64_payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    PAYLOAD_ENGINE.decode(compact.as_bytes()).map_err(WizardError::from)
}

/// Decode a payload and wrap it as a spreadsheet download
pub fn decode_excel(base64_payload: &str, filename: Option<&str>) -> Result<ExcelDownload, WizardError> {
    let bytes = decode_payload(base64_payload)?;
    Ok(ExcelDownload {
        bytes,
        filename: sanitize_filename(filename),
        mime: EXCEL_MIME,
    })
}

/// Decode a payload and save it into `dir` under the given (or default) name
pub async fn decode_and_download<P: AsRef<Path>>(
    base64_payload: &str,
    filename: Option<&str>,
    dir: P,
) -> Result<PathBuf, WizardError> {
    let download = decode_excel(base64_payload, filename)?;
    download.save_to(dir).await
}

/// Keep only the final path component of a suggested name
fn sanitize_filename(filename: Option<&str>) -> String {
    filename
        .map(str::trim)
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_name() {
        assert_eq!(sanitize_filename(Some("merged_analysis.xlsx")), "merged_analysis.xlsx");
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename(Some("../../etc/report.xlsx")), "report.xlsx");
        assert_eq!(sanitize_filename(Some("C:\\temp\\out.xlsx")), "out.xlsx");
    }

    #[test]
    fn test_sanitize_falls_back_to_default() {
        assert_eq!(sanitize_filename(None), DEFAULT_DOWNLOAD_NAME);
        assert_eq!(sanitize_filename(Some("  ")), DEFAULT_DOWNLOAD_NAME);
        assert_eq!(sanitize_filename(Some("dir/")), DEFAULT_DOWNLOAD_NAME);
        assert_eq!(sanitize_filename(Some("..")), DEFAULT_DOWNLOAD_NAME);
    }
}
