//! Output file names for printed pages.

use url::Url;

use crate::error::{Error, Result};

/// Characters not allowed in file names on common platforms.
const INVALID_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// File name for a printed URL at `timestamp` (Unix seconds).
///
/// The percent-decoded path is used with separators and reserved characters
/// replaced by `_`. Bare hosts use the host name with dots replaced instead.
///
/// ```
/// use pdfyard::print::pdf_filename;
///
/// let name = pdf_filename("https://example.com/docs/guide", 1700000000).unwrap();
/// assert_eq!(name, "docs_guide_1700000000.pdf");
/// ```
pub fn pdf_filename(url: &str, timestamp: i64) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::Print(format!("invalid URL {}: {}", url, e)))?;

    let path = urlencoding::decode(parsed.path())
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| parsed.path().to_string());
    let trimmed = path.trim_matches('/');

    let stem = if trimmed.is_empty() {
        parsed.host_str().unwrap_or("page").replace('.', "_")
    } else {
        trimmed.replace(INVALID_CHARS, "_")
    };

    Ok(format!("{}_{}.pdf", stem, timestamp))
}

/// File name for a printed URL, stamped with the current time.
pub fn pdf_filename_now(url: &str) -> Result<String> {
    pdf_filename(url, chrono::Utc::now().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_only_url() {
        assert_eq!(
            pdf_filename("https://www.example.com/", 42).unwrap(),
            "www_example_com_42.pdf"
        );
        assert_eq!(
            pdf_filename("https://example.org", 1).unwrap(),
            "example_org_1.pdf"
        );
    }

    #[test]
    fn test_path_is_decoded_and_cleaned() {
        assert_eq!(
            pdf_filename("https://example.com/a%20b/c:d/", 7).unwrap(),
            "a b_c_d_7.pdf"
        );
    }

    #[test]
    fn test_query_is_ignored() {
        assert_eq!(
            pdf_filename("https://example.com/roadbook/123?x=1", 9).unwrap(),
            "roadbook_123_9.pdf"
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            pdf_filename("not a url", 0),
            Err(Error::Print(_))
        ));
    }

    #[test]
    fn test_now_has_timestamp_suffix() {
        let name = pdf_filename_now("https://example.com/x").unwrap();
        assert!(name.starts_with("x_"));
        assert!(name.ends_with(".pdf"));
    }
}
