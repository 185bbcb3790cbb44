//! Candidate image files and their pre-submission checks.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::UploadError;

/// Largest accepted upload, inclusive.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// A file the user picked, with the media type and size it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
    size: u64,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Open a file on disk. Media type comes from the extension and size from
    /// the file metadata; bytes are only read once both pass `validate`.
    ///
    /// Reading stops one byte past the ceiling, so a file that grows or
    /// reports no length (a device, a pipe) still fails the size check.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let declared = std::fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut file = Self {
            name,
            media_type: media_type_for(path).to_string(),
            bytes: Vec::new(),
            size: declared,
        };
        if file.validate().is_err() {
            return Ok(file);
        }

        let mut bytes = Vec::new();
        File::open(path)?
            .take(MAX_UPLOAD_BYTES + 1)
            .read_to_end(&mut bytes)?;
        file.size = file.size.max(bytes.len() as u64);
        file.bytes = bytes;
        Ok(file)
    }

    /// Declared size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Check media type, then size.
    pub fn validate(&self) -> Result<(), UploadError> {
        if !self.media_type.starts_with("image/") {
            return Err(UploadError::NotAnImage {
                media_type: self.media_type.clone(),
            });
        }
        if self.size() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge { size: self.size() });
        }
        Ok(())
    }
}

/// Declared media type, derived from the file extension.
pub fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "avif" => "image/avif",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_types() {
        assert_eq!(media_type_for(Path::new("lunch.JPG")), "image/jpeg");
        assert_eq!(media_type_for(Path::new("a/b/plate.webp")), "image/webp");
        assert_eq!(media_type_for(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(media_type_for(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn rejects_non_image() {
        let file = ImageFile::new("menu.pdf", "application/pdf", vec![0; 10]);
        assert_eq!(
            file.validate(),
            Err(UploadError::NotAnImage {
                media_type: "application/pdf".into()
            })
        );
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        let exact = ImageFile::new("a.png", "image/png", vec![0; MAX_UPLOAD_BYTES as usize]);
        assert!(exact.validate().is_ok());
        let over = ImageFile::new("b.png", "image/png", vec![0; MAX_UPLOAD_BYTES as usize + 1]);
        assert_eq!(
            over.validate(),
            Err(UploadError::TooLarge {
                size: MAX_UPLOAD_BYTES + 1
            })
        );
    }

    #[test]
    fn media_type_checked_before_size() {
        let file = ImageFile::new("big.txt", "text/plain", vec![0; 6 * 1024 * 1024]);
        assert!(matches!(file.validate(), Err(UploadError::NotAnImage { .. })));
    }

    #[test]
    fn from_path_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meal.png");
        std::fs::write(&path, b"\x89PNG").unwrap();
        let file = ImageFile::from_path(&path).unwrap();
        assert_eq!(file.name, "meal.png");
        assert_eq!(file.media_type, "image/png");
        assert_eq!(file.size(), 4);
        assert_eq!(file.bytes, b"\x89PNG");
    }

    #[test]
    fn from_path_skips_reading_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        let handle = File::create(&path).unwrap();
        handle.set_len(6 * 1024 * 1024).unwrap();

        let file = ImageFile::from_path(&path).unwrap();
        assert_eq!(file.size(), 6 * 1024 * 1024);
        assert!(file.bytes.is_empty());
        assert!(matches!(file.validate(), Err(UploadError::TooLarge { .. })));
    }

    #[test]
    fn from_path_skips_reading_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"grocery list").unwrap();

        let file = ImageFile::from_path(&path).unwrap();
        assert!(file.bytes.is_empty());
        assert_eq!(file.size(), 12);
        assert!(matches!(file.validate(), Err(UploadError::NotAnImage { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn from_path_returns_promptly_for_endless_device() {
        let Ok(file) = ImageFile::from_path(Path::new("/dev/zero")) else {
            return;
        };
        assert!(file.bytes.is_empty());
        assert!(matches!(file.validate(), Err(UploadError::NotAnImage { .. })));
    }
}
