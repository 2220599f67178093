//! Best-effort PDF text extraction

use crate::error::SourceError;

/// Extract text from a PDF byte stream.
///
/// Best effort: a page without extractable text simply contributes
/// nothing, and an empty string is a valid result - the pipeline still
/// runs extraction over it. Only bytes that cannot be read as a PDF at
/// all are an error.
pub fn pdf_text(bytes: &[u8]) -> Result<String, SourceError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| SourceError::Unreadable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let result = pdf_text(b"this is not a pdf");
        assert!(matches!(result, Err(SourceError::Unreadable(_))));
    }

    #[test]
    fn test_empty_bytes_are_unreadable() {
        assert!(matches!(pdf_text(b""), Err(SourceError::Unreadable(_))));
    }
}
