use image::ImageFormat;
use std::path::Path;
use std::sync::Arc;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// An uploaded file together with the MIME type it was submitted as.
#[derive(Debug, Clone)]
pub struct ImageInput {
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl ImageInput {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Builds an input whose MIME type is sniffed from the content, then the name.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = sniff_mime_type(&name, &bytes);
        Self::new(name, mime_type, bytes)
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_bytes(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.to_ascii_lowercase().starts_with("image/")
    }
}

pub fn sniff_mime_type(name: &str, bytes: &[u8]) -> String {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type().to_string();
    }

    Path::new(name)
        .extension()
        .and_then(ImageFormat::from_extension)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_content_wins_over_extension() {
        assert_eq!(sniff_mime_type("car.txt", &PNG_MAGIC), "image/png");
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(sniff_mime_type("car.jpg", b""), "image/jpeg");
        assert_eq!(sniff_mime_type("notes.txt", b"hello world"), OCTET_STREAM);
        assert_eq!(sniff_mime_type("no_extension", b"hello world"), OCTET_STREAM);
    }

    #[test]
    fn test_is_image_checks_prefix() {
        assert!(ImageInput::new("a", "image/webp", vec![1u8]).is_image());
        assert!(ImageInput::new("a", "IMAGE/PNG", vec![1u8]).is_image());
        assert!(!ImageInput::new("a", "text/plain", vec![1u8]).is_image());
        assert!(!ImageInput::new("a", "application/image", vec![1u8]).is_image());
    }

    #[tokio::test]
    async fn test_from_path_sniffs_file() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(&PNG_MAGIC).unwrap();

        let input = ImageInput::from_path(file.path()).await.unwrap();
        assert_eq!(input.mime_type(), "image/png");
        assert!(input.is_image());
        assert_eq!(input.bytes().len(), PNG_MAGIC.len());
        assert!(input.name().ends_with(".bin"));
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ImageInput::from_path(&dir.path().join("missing.png"))
            .await
            .is_err());
    }
}
