//! Files selected into a file input

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// A single file chosen through click-to-browse or drag-and-drop.
///
/// The bytes are either held in memory or read lazily from `path` when a
/// preview or an upload needs them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub name: String,
    /// MIME type as reported by the picker (may be empty)
    #[serde(rename = "type", default)]
    pub mime: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl SelectedFile {
    /// Create an in-memory file; size is taken from the content
    pub fn inline(name: &str, mime: &str, content: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            mime: mime.to_string(),
            size: content.len() as u64,
            path: None,
            content,
        }
    }

    /// Create a file that only carries picker metadata (no readable bytes)
    pub fn sized(name: &str, mime: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            mime: mime.to_string(),
            size,
            path: None,
            content: Vec::new(),
        }
    }

    /// Describe a file on disk, guessing its MIME type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut file = Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Default::default()
        };
        file.fill_metadata().await?;
        Ok(file)
    }

    /// Fill in name, size and type from `path` where they are missing
    pub async fn fill_metadata(&mut self) -> io::Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        if self.name.is_empty() {
            self.name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        if self.size == 0 {
            self.size = tokio::fs::metadata(&path).await?.len();
        }
        if self.mime.is_empty() {
            self.mime = mime_guess::from_path(&path)
                .first_raw()
                .unwrap_or("application/octet-stream")
                .to_string();
        }
        Ok(())
    }

    /// Whether the reported type is an image type
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    /// Read the file's bytes
    pub async fn read_bytes(&self) -> io::Result<Vec<u8>> {
        match (&self.path, self.content.is_empty()) {
            (Some(path), true) => tokio::fs::read(path).await,
            _ => Ok(self.content.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_takes_size_from_content() {
        let file = SelectedFile::inline("a.txt", "text/plain", b"hello".to_vec());
        assert_eq!(file.size, 5);
        assert!(!file.is_image());
    }

    #[test]
    fn test_sized_has_no_content() {
        let file = SelectedFile::sized("big.pdf", "application/pdf", 6_000_000);
        assert_eq!(file.size, 6_000_000);
        assert!(file.content.is_empty());
    }

    #[test]
    fn test_is_image() {
        assert!(SelectedFile::sized("a.png", "image/png", 1).is_image());
        assert!(!SelectedFile::sized("a.svg", "text/xml", 1).is_image());
    }

    #[test]
    fn test_deserialize_uses_type_key() {
        let json = r#"{"name": "logo.png", "type": "image/png", "size": 42}"#;
        let file: SelectedFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.mime, "image/png");
        assert_eq!(file.size, 42);
        assert!(file.path.is_none());
    }

    #[tokio::test]
    async fn test_read_bytes_inline() {
        let file = SelectedFile::inline("a.txt", "text/plain", b"abc".to_vec());
        assert_eq!(file.read_bytes().await.unwrap(), b"abc".to_vec());
    }

    #[tokio::test]
    async fn test_from_path_fills_metadata() {
        let path = std::env::temp_dir().join(format!("sasa-forms-{}.png", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, [1u8, 2, 3, 4]).await.unwrap();

        let file = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(file.size, 4);
        assert_eq!(file.mime, "image/png");
        assert!(file.name.ends_with(".png"));
        assert_eq!(file.read_bytes().await.unwrap(), vec![1, 2, 3, 4]);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_bytes_missing_path_errors() {
        let file = SelectedFile {
            name: "gone.bin".to_string(),
            path: Some(PathBuf::from("/nonexistent/sasa-forms/gone.bin")),
            ..Default::default()
        };
        assert!(file.read_bytes().await.is_err());
    }
}
