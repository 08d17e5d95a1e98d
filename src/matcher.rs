//! Header sniffing
//!
//! Matching is loose: a header line is selected by a literal,
//! case-sensitive prefix of the whole line, and the match is a substring test
//! on the whole line. Only the first line with the prefix is consulted.

pub const CONTENT_TYPE: &str = "Content-Type";
pub const FASTINFOSET_MEDIA_TYPE: &str = "application/fastinfoset";
pub const CONTENT_ENCODING: &str = "Content-Encoding";
pub const GZIP_CODING: &str = "gzip";

/// Returns whether the first header line starting with `name` contains
/// `substring`.
///
/// Returns `false` when no line starts with `name`.
pub fn header_matches<I, S>(headers: I, name: &str, substring: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    headers
        .into_iter()
        .find(|line| line.as_ref().starts_with(name))
        .is_some_and(|line| line.as_ref().contains(substring))
}

/// Returns whether the headers declare a FastInfoset body.
pub fn is_fastinfoset<I, S>(headers: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    header_matches(headers, CONTENT_TYPE, FASTINFOSET_MEDIA_TYPE)
}

/// Returns whether the headers declare a gzip-compressed body.
pub fn is_gzip_encoded<I, S>(headers: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    header_matches(headers, CONTENT_ENCODING, GZIP_CODING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type() {
        assert!(is_fastinfoset(["Content-Type: application/fastinfoset"]));
        assert!(is_fastinfoset([
            "POST /ws HTTP/1.1",
            "Content-Type: application/fastinfoset; charset=utf-8",
        ]));
        assert!(!is_fastinfoset(["Content-Type: text/xml"]));
        assert!(!is_fastinfoset(["Host: example.com"]));
        assert!(!is_fastinfoset(Vec::<String>::new()));
    }

    #[test]
    fn test_case_sensitive_prefix() {
        assert!(!is_fastinfoset(["content-type: application/fastinfoset"]));
        assert!(!is_fastinfoset(["Content-Type: Application/FastInfoset"]));
    }

    #[test]
    fn test_first_prefixed_line_decides() {
        let headers = [
            "Content-Type: text/plain",
            "Content-Type: application/fastinfoset",
        ];
        assert!(!is_fastinfoset(headers));

        let headers = [
            "Content-Type: application/fastinfoset",
            "Content-Type: text/plain",
        ];
        assert!(is_fastinfoset(headers));
    }

    #[test]
    fn test_loose_matching() {
        assert!(is_fastinfoset(["Content-Type2: application/fastinfoset"]));
        assert!(is_fastinfoset([
            "Content-Type: application/x-not-application/fastinfoset-really"
        ]));
        assert!(header_matches(["X-Gzip: 1"], "X-", "Gzip"));
    }

    #[test]
    fn test_content_encoding() {
        assert!(is_gzip_encoded(["Content-Encoding: gzip"]));
        assert!(is_gzip_encoded(["Content-Encoding: x-gzip"]));
        assert!(!is_gzip_encoded(["Content-Encoding: br"]));
        assert!(!is_gzip_encoded(["Content-Type: application/fastinfoset"]));
        assert!(!is_gzip_encoded(["Content-Encoding: GZIP"]));
    }

    #[test]
    fn test_owned_lines() {
        let headers = vec![
            "HTTP/1.1 200 OK".to_string(),
            "Content-Encoding: gzip".to_string(),
        ];

        assert!(is_gzip_encoded(&headers));
        assert!(!is_fastinfoset(&headers));
    }
}
