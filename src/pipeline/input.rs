//! Input validation: make sure a path names a readable PDF before pdfium
//! is asked to open it.
//!
//! pdfium reports a missing file, a permission problem and a non-PDF file
//! with the same opaque load error. Checking up front lets each case surface
//! as its own [`SummaryError`] variant with an actionable message.

use crate::error::SummaryError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` exists, is readable and starts with `%PDF`.
pub fn resolve_local(path: impl AsRef<Path>) -> Result<PathBuf, SummaryError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(SummaryError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(SummaryError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(SummaryError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(SummaryError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// File stem of `path`, used as a fallback document title.
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_local("/definitely/not/a/real/file.pdf").unwrap_err();
        assert!(matches!(err, SummaryError::FileNotFound { .. }));
        assert!(err.is_io());
    }

    #[test]
    fn wrong_magic_is_not_a_pdf() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello, not a pdf").unwrap();
        let err = resolve_local(tmp.path()).unwrap_err();
        match err {
            SummaryError::NotAPdf { magic, .. } => assert_eq!(&magic, b"hell"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.7\n%rest").unwrap();
        assert_eq!(resolve_local(tmp.path()).unwrap(), tmp.path());
    }

    #[test]
    fn title_falls_back_to_stem() {
        assert_eq!(title_from_path(Path::new("pdf/Winnie-The-Pooh.pdf")), "Winnie-The-Pooh");
        assert_eq!(title_from_path(Path::new("/")), "document");
    }
}
