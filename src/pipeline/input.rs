//! Input acceptance: turn an uploaded body (or a local file) into a
//! validated [`PdfUpload`].
//!
//! The transport that receives the upload is out of scope; all it hands us
//! is the bytes plus the declared content type. The declared type is checked
//! against the PDF MIME types browsers and mail clients actually send. Files
//! read from disk have no declared type, so one is sniffed from the `%PDF`
//! magic bytes instead. Either way, bytes that only claim to be a PDF still
//! fail later in pdfium with `InvalidDocument`.

use crate::error::PosterError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Content types accepted as PDF.
pub const ACCEPTED_PDF_MIME_TYPES: [&str; 3] =
    ["application/pdf", "application/x-pdf", "application/acrobat"];

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// An uploaded document and the content type it was declared with.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl PdfUpload {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    /// Build an upload whose content type is sniffed from the bytes.
    pub fn sniffed(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let content_type = sniff_content_type(&bytes).to_string();
        Self {
            bytes,
            content_type,
        }
    }

    /// # Errors
    /// [`PosterError::InvalidInputType`] unless the declared content type is
    /// one of [`ACCEPTED_PDF_MIME_TYPES`].
    pub fn validate(&self) -> Result<(), PosterError> {
        validate_content_type(&self.content_type)
    }
}

/// Check a declared content type. Parameters such as `; charset=…` are
/// ignored and the comparison is case-insensitive.
pub fn validate_content_type(content_type: &str) -> Result<(), PosterError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim();

    if ACCEPTED_PDF_MIME_TYPES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(essence))
    {
        Ok(())
    } else {
        Err(PosterError::InvalidInputType {
            content_type: content_type.to_string(),
        })
    }
}

/// `application/pdf` when `bytes` start with `%PDF`, else
/// `application/octet-stream`.
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(PDF_MAGIC) {
        ACCEPTED_PDF_MIME_TYPES[0]
    } else {
        "application/octet-stream"
    }
}

/// Read a local PDF into a sniffed [`PdfUpload`].
pub fn load_pdf_file(path: impl AsRef<Path>) -> Result<PdfUpload, PosterError> {
    let path: PathBuf = path.as_ref().to_path_buf();

    let mut file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PosterError::PermissionDenied { path });
        }
        Err(_) => return Err(PosterError::FileNotFound { path }),
    };

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| PosterError::Internal(format!("Failed to read '{}': {}", path.display(), e)))?;

    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(PdfUpload::sniffed(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn accepts_pdf_mime_types() {
        for ct in ACCEPTED_PDF_MIME_TYPES {
            assert!(validate_content_type(ct).is_ok(), "{ct}");
        }
        assert!(validate_content_type("Application/PDF").is_ok());
        assert!(validate_content_type("application/pdf; name=poster.pdf").is_ok());
    }

    #[test]
    fn rejects_other_mime_types() {
        for ct in ["image/png", "text/plain", "", "application/octet-stream"] {
            assert!(
                matches!(
                    validate_content_type(ct),
                    Err(PosterError::InvalidInputType { .. })
                ),
                "{ct}"
            );
        }
    }

    #[test]
    fn sniffs_magic_bytes() {
        assert_eq!(sniff_content_type(b"%PDF-1.4\n"), "application/pdf");
        assert_eq!(sniff_content_type(b"\x89PNG"), "application/octet-stream");
        assert_eq!(sniff_content_type(b""), "application/octet-stream");
    }

    #[test]
    fn load_missing_file() {
        let result = load_pdf_file("/definitely/not/a/real/poster.pdf");
        assert!(matches!(result, Err(PosterError::FileNotFound { .. })));
    }

    #[test]
    fn load_local_file_sniffs_type() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.7\n%%EOF\n").unwrap();

        let upload = load_pdf_file(tmp.path()).unwrap();
        assert_eq!(upload.content_type, "application/pdf");
        assert!(upload.validate().is_ok());

        let mut not_pdf = tempfile::NamedTempFile::new().unwrap();
        not_pdf.write_all(b"hello").unwrap();
        let upload = load_pdf_file(not_pdf.path()).unwrap();
        assert!(upload.validate().is_err());
    }
}
