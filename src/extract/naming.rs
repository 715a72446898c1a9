//! Output names for uploaded documents and their images.
//!
//! Upload names are untrusted: only the final path component survives, and
//! anything outside `[A-Za-z0-9._-]` becomes `_`. A short content hash is
//! appended so that different documents sharing a filename never overwrite
//! each other's images, while re-uploading the same bytes maps onto the same
//! names.

use sha2::{Digest, Sha256};

/// Hex digits of the content hash kept in a base name.
pub const HASH_PREFIX_LEN: usize = 12;

const MAX_STEM_LEN: usize = 64;
const FALLBACK_STEM: &str = "document";

/// Reduce an uploaded filename to a safe stem without extension.
pub fn sanitize_stem(filename: &str) -> String {
    let name = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let stem = match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    };

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_LEN)
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// First [`HASH_PREFIX_LEN`] hex digits of the SHA-256 of `data`.
pub fn content_hash(data: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(data));
    digest[..HASH_PREFIX_LEN].to_string()
}

/// Base name for an upload: `{stem}_{hash}`.
pub fn upload_base_name(filename: &str, data: &[u8]) -> String {
    format!("{}_{}", sanitize_stem(filename), content_hash(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_stem("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_stem("C:\\Users\\me\\report.pdf"), "report");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_chars() {
        assert_eq!(sanitize_stem("my report (final).pdf"), "my_report__final");
        assert_eq!(sanitize_stem("résumé.pdf"), "r_sum");
    }

    #[test]
    fn test_sanitize_hidden_and_empty_names() {
        assert_eq!(sanitize_stem(".pdf"), "pdf");
        assert_eq!(sanitize_stem(""), FALLBACK_STEM);
        assert_eq!(sanitize_stem("..."), FALLBACK_STEM);
    }

    #[test]
    fn test_sanitize_truncates_long_names() {
        let long = "a".repeat(200) + ".pdf";
        assert_eq!(sanitize_stem(&long).len(), MAX_STEM_LEN);
    }

    #[test]
    fn test_content_hash_is_stable() {
        // sha256("abc") = ba7816bf8f01cfea...
        assert_eq!(content_hash(b"abc"), "ba7816bf8f01");
    }

    #[test]
    fn test_upload_base_name_distinguishes_content() {
        let a = upload_base_name("scan.pdf", b"first");
        let b = upload_base_name("scan.pdf", b"second");
        assert_ne!(a, b);
        assert!(a.starts_with("scan_"));
        assert_eq!(a, upload_base_name("scan.pdf", b"first"));
    }
}
