//! Request-target parsing.
//!
//! [`ParsedUri`] is the purely syntactic view of one request target: decoded
//! path segments plus the query mapping. It knows nothing about routes;
//! matching and coercion live with the templates.

use crate::error::ParseUriError;

/// A decoded request target.
///
/// Built once per request, read during matching and extraction, then
/// dropped.
#[derive(Debug)]
pub struct ParsedUri {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl ParsedUri {
    /// Parses a relative request target such as `/items/42?page=2`.
    ///
    /// Segments split on `/` and percent-decode strictly: a malformed escape
    /// or a non-UTF-8 decode is an error, as is an empty interior segment.
    /// One trailing slash is tolerated. `+` stays literal in segments but
    /// decodes to a space in query values. Repeated query keys keep the
    /// last value.
    pub fn parse(raw: &str) -> Result<Self, ParseUriError> {
        let raw = match raw.split_once('#') {
            Some((target, _fragment)) => target,
            None => raw,
        };
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (raw, None),
        };

        let mut segments = Vec::new();
        let path = path.strip_prefix('/').unwrap_or(path);
        if !path.is_empty() {
            let mut parts = path.split('/').peekable();
            while let Some(part) = parts.next() {
                if part.is_empty() {
                    if parts.peek().is_none() {
                        break; // single trailing slash
                    }
                    return Err(ParseUriError::EmptySegment);
                }
                let decoded = percent_decode(part, false)?;
                if decoded.is_empty() {
                    return Err(ParseUriError::EmptySegment);
                }
                segments.push(decoded);
            }
        }

        let mut pairs: Vec<(String, String)> = Vec::new();
        if let Some(query) = query {
            for part in query.split('&') {
                if part.is_empty() {
                    continue;
                }
                let (name, value) = match part.split_once('=') {
                    Some((name, value)) => (name, value),
                    None => (part, ""),
                };
                let name = percent_decode(name, true)?;
                let value = percent_decode(value, true)?;
                match pairs.iter_mut().find(|(n, _)| *n == name) {
                    Some(entry) => entry.1 = value,
                    None => pairs.push((name, value)),
                }
            }
        }

        Ok(Self { segments, query: pairs })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Query pairs in first-appearance order, values already last-wins.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// The resolved value for one query key.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

// ── Percent decoding ─────────────────────────────────────────────────────────

fn percent_decode(input: &str, plus_as_space: bool) -> Result<String, ParseUriError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = bytes.get(i + 1).copied().and_then(hex_digit);
                let lo = bytes.get(i + 2).copied().and_then(hex_digit);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => return Err(ParseUriError::InvalidEscape(i)),
                }
            }
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| ParseUriError::InvalidUtf8)
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_segments() {
        let uri = ParsedUri::parse("/items/42/tags").unwrap();
        assert_eq!(uri.segments(), &["items", "42", "tags"]);
        assert!(uri.query().is_empty());
    }

    #[test]
    fn root_has_no_segments() {
        assert_eq!(ParsedUri::parse("/").unwrap().segment_count(), 0);
        assert_eq!(ParsedUri::parse("").unwrap().segment_count(), 0);
    }

    #[test]
    fn tolerates_one_trailing_slash() {
        let uri = ParsedUri::parse("/items/42/").unwrap();
        assert_eq!(uri.segments(), &["items", "42"]);
    }

    #[test]
    fn rejects_interior_empty_segment() {
        assert_eq!(
            ParsedUri::parse("/items//42").unwrap_err(),
            ParseUriError::EmptySegment
        );
        assert_eq!(ParsedUri::parse("//").unwrap_err(), ParseUriError::EmptySegment);
    }

    #[test]
    fn decodes_percent_escapes() {
        let uri = ParsedUri::parse("/tags/caf%C3%A9").unwrap();
        assert_eq!(uri.segments(), &["tags", "café"]);
    }

    #[test]
    fn rejects_malformed_escapes() {
        assert_eq!(
            ParsedUri::parse("/a%zz").unwrap_err(),
            ParseUriError::InvalidEscape(1)
        );
        assert_eq!(
            ParsedUri::parse("/a%4").unwrap_err(),
            ParseUriError::InvalidEscape(1)
        );
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert_eq!(ParsedUri::parse("/a%ff").unwrap_err(), ParseUriError::InvalidUtf8);
    }

    #[test]
    fn plus_stays_literal_in_segments() {
        let uri = ParsedUri::parse("/a+b").unwrap();
        assert_eq!(uri.segments(), &["a+b"]);
    }

    #[test]
    fn plus_becomes_space_in_query() {
        let uri = ParsedUri::parse("/search?q=red+lamp").unwrap();
        assert_eq!(uri.query_value("q"), Some("red lamp"));
    }

    #[test]
    fn repeated_query_keys_are_last_wins() {
        let uri = ParsedUri::parse("/x?a=1&b=2&a=3").unwrap();
        assert_eq!(uri.query_value("a"), Some("3"));
        assert_eq!(uri.query_value("b"), Some("2"));
        assert_eq!(uri.query().len(), 2);
    }

    #[test]
    fn query_key_without_value_is_empty() {
        let uri = ParsedUri::parse("/x?flag&a=1").unwrap();
        assert_eq!(uri.query_value("flag"), Some(""));
    }

    #[test]
    fn malformed_query_escape_is_an_error() {
        assert_eq!(
            ParsedUri::parse("/x?a=%G1").unwrap_err(),
            ParseUriError::InvalidEscape(0)
        );
    }

    #[test]
    fn fragment_is_stripped() {
        let uri = ParsedUri::parse("/items/42#section").unwrap();
        assert_eq!(uri.segments(), &["items", "42"]);
    }
}
