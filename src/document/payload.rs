//! Upload payload decoding
//!
//! Callers may send either the raw PDF bytes or the PDF as standard base64
//! text (the no-code tooling this service backs can only move strings).

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::error::{DocumentError, DocumentResult};
use super::types::{PDF_BASE64_PREFIX, PDF_MAGIC};

/// Turn an upload body into raw PDF bytes.
///
/// Raw bytes are recognised by the `%PDF` magic, base64 text by its fixed
/// `JVBERi` prefix. Anything else is a format error.
pub fn decode_upload(body: &[u8]) -> DocumentResult<Vec<u8>> {
    if body.starts_with(PDF_MAGIC) {
        return Ok(body.to_vec());
    }

    let text = body.trim_ascii_start();
    if !text.starts_with(PDF_BASE64_PREFIX.as_bytes()) {
        return Err(DocumentError::UnsupportedFormat(
            "expected PDF bytes or base64-encoded PDF".to_string(),
        ));
    }

    // Base64 text copied out of JSON or e-mail is often wrapped
    let compact: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    let decoded = BASE64
        .decode(&compact)
        .map_err(|e| DocumentError::InvalidBase64(e.to_string()))?;

    if !decoded.starts_with(PDF_MAGIC) {
        return Err(DocumentError::UnsupportedFormat(
            "decoded payload is not a PDF".to_string(),
        ));
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &[u8] = b"%PDF-1.4\n%%EOF\n";

    #[test]
    fn test_raw_pdf_passes_through() {
        let decoded = decode_upload(MINIMAL).unwrap();
        assert_eq!(decoded, MINIMAL);
    }

    #[test]
    fn test_base64_pdf_is_decoded() {
        let encoded = BASE64.encode(MINIMAL);
        assert!(encoded.starts_with(PDF_BASE64_PREFIX));

        let decoded = decode_upload(encoded.as_bytes()).unwrap();
        assert_eq!(decoded, MINIMAL);
    }

    #[test]
    fn test_wrapped_base64_is_decoded() {
        let encoded = BASE64.encode(MINIMAL);
        let (head, tail) = encoded.split_at(8);
        let wrapped = format!("  \n{}\r\n{}\n", head, tail);

        let decoded = decode_upload(wrapped.as_bytes()).unwrap();
        assert_eq!(decoded, MINIMAL);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = decode_upload(b"PK\x03\x04 not a pdf").unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFormat(_)));

        let err = decode_upload(b"").unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_broken_base64_rejected() {
        let err = decode_upload(b"JVBERi0xLjQK!!!").unwrap_err();
        assert!(matches!(err, DocumentError::InvalidBase64(_)));
    }
}
