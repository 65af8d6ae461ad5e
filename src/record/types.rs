use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Uploading,
    Completed,
    Error,
}

impl FileStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, FileStatus::Uploading)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FileStatus::Completed | FileStatus::Error)
    }

    /// Uploading records stay in the queue until they settle.
    pub fn is_removable(&self) -> bool {
        !self.is_active()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Pending => "pending",
            FileStatus::Uploading => "uploading",
            FileStatus::Completed => "completed",
            FileStatus::Error => "error",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file handed to the queue before validation.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl RawFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let mime_type = guess_mime_type(&name).to_string();

        Ok(Self::new(name, mime_type, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_image(&self) -> bool {
        is_image_type(&self.mime_type)
    }
}

/// One entry of the upload queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub status: FileStatus,
    pub progress: u8,
    pub error: Option<String>,
    pub description: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
    /// `data:` URI, images only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preview: Option<Arc<str>>,
    #[serde(skip)]
    pub data: Bytes,
}

impl FileRecord {
    pub fn pending(id: String, file: RawFile, preview: Option<Arc<str>>) -> Self {
        Self {
            id,
            size: file.size(),
            name: file.name,
            mime_type: file.mime_type,
            status: FileStatus::Pending,
            progress: 0,
            error: None,
            description: None,
            uploaded_at: None,
            preview,
            data: file.data,
        }
    }

    pub fn is_image(&self) -> bool {
        is_image_type(&self.mime_type)
    }
}

pub fn is_image_type(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// Render a byte count the way the upload zone shows it ("1.5 MB").
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }

    let rendered = format!("{value:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{rendered} {}", UNITS[exponent])
}

fn guess_mime_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "json" => "application/json",
        "zip" => "application/zip",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(50 * 1024 * 1024), "50 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_cloned_record_shares_preview() {
        let file = RawFile::new("dot.png", "image/png", vec![1u8, 2, 3]);
        let preview: Arc<str> = Arc::from("data:image/png;base64,AQID");
        let record = FileRecord::pending("id-2".into(), file, Some(preview));

        let copy = record.clone();
        assert!(Arc::ptr_eq(
            record.preview.as_ref().unwrap(),
            copy.preview.as_ref().unwrap()
        ));
    }

    #[test]
    fn test_pending_record_from_raw_file() {
        let file = RawFile::new("notes.txt", "text/plain", vec![0u8; 1024]);
        let record = FileRecord::pending("id-1".into(), file, None);

        assert_eq!(record.size, 1024);
        assert_eq!(record.status, FileStatus::Pending);
        assert_eq!(record.progress, 0);
        assert!(record.error.is_none());
        assert!(!record.is_image());
    }

    #[test]
    fn test_status_flags() {
        assert!(FileStatus::Uploading.is_active());
        assert!(!FileStatus::Uploading.is_removable());
        assert!(FileStatus::Error.is_terminal());
        assert!(FileStatus::Completed.is_removable());
        assert!(!FileStatus::Pending.is_terminal());
    }

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type("photo.PNG"), "image/png");
        assert_eq!(guess_mime_type("report.pdf"), "application/pdf");
        assert_eq!(guess_mime_type("Makefile"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_raw_file_from_path() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"hello").unwrap();

        let raw = RawFile::from_path(&path).await.unwrap();
        assert_eq!(raw.name, "notes.txt");
        assert_eq!(raw.mime_type, "text/plain");
        assert_eq!(raw.size(), 5);
    }
}
