//! Request-body decoding.
//!
//! Handlers that take a typed body never see raw bytes. A [`ContentDecoder`]
//! turns the wire bytes into a `serde_json::Value` first, and the route's
//! binding deserializes that value into the handler's declared type. Every
//! failure on this path is the caller's fault and maps to 400.

use serde_json::Value;

use crate::error::ContentError;

/// Decodes request bytes into a structured value.
///
/// The default is [`JsonDecoder`]; install a custom implementation via
/// [`Dispatcher::with_decoder`](crate::Dispatcher::with_decoder) to accept
/// other formats.
pub trait ContentDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8], content_type: Option<&str>) -> Result<Value, ContentError>;
}

/// The built-in `application/json` decoder.
///
/// Accepts UTF-8 (the default) and UTF-16 with or without a BOM; BOM-less
/// UTF-16 is read little-endian. Any other charset, and any media type other
/// than `application/json`, is rejected.
pub struct JsonDecoder;

impl ContentDecoder for JsonDecoder {
    fn decode(&self, bytes: &[u8], content_type: Option<&str>) -> Result<Value, ContentError> {
        let header = content_type.ok_or(ContentError::MissingMediaType)?;
        let (media, charset) = split_media_type(header);
        if !media.eq_ignore_ascii_case("application/json") {
            return Err(ContentError::UnsupportedMediaType(media.to_owned()));
        }
        match charset {
            None => Ok(serde_json::from_slice(bytes)?),
            Some(charset) if charset.eq_ignore_ascii_case("utf-8") => {
                Ok(serde_json::from_slice(bytes)?)
            }
            Some(charset) if charset.eq_ignore_ascii_case("utf-16") => {
                let text = decode_utf16(bytes)?;
                Ok(serde_json::from_str(&text)?)
            }
            Some(charset) => Err(ContentError::UnsupportedCharset(charset.to_owned())),
        }
    }
}

/// Splits a `content-type` header into the media type and an optional
/// `charset` parameter value, quotes stripped.
fn split_media_type(header: &str) -> (&str, Option<&str>) {
    let (media, params) = match header.split_once(';') {
        Some((media, params)) => (media.trim(), Some(params)),
        None => (header.trim(), None),
    };
    let charset = params.and_then(|params| {
        params.split(';').find_map(|param| {
            let (key, value) = param.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"'))
        })
    });
    (media, charset)
}

fn decode_utf16(bytes: &[u8]) -> Result<String, ContentError> {
    if bytes.len() % 2 != 0 {
        return Err(ContentError::InvalidUtf16);
    }
    let (payload, big_endian) = match bytes {
        [0xfe, 0xff, rest @ ..] => (rest, true),
        [0xff, 0xfe, rest @ ..] => (rest, false),
        _ => (bytes, false),
    };
    let units: Vec<u16> = payload
        .chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if big_endian {
                u16::from_be_bytes(pair)
            } else {
                u16::from_le_bytes(pair)
            }
        })
        .collect();
    String::from_utf16(&units).map_err(|_| ContentError::InvalidUtf16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn decodes_plain_json() {
        let value = JsonDecoder
            .decode(br#"{"name":"lamp"}"#, Some("application/json"))
            .unwrap();
        assert_eq!(value["name"], "lamp");
    }

    #[test]
    fn accepts_a_charset_parameter() {
        for header in [
            "application/json; charset=utf-8",
            "application/json;charset=UTF-8",
            r#"application/json; charset="utf-8""#,
        ] {
            assert!(JsonDecoder.decode(b"[1,2]", Some(header)).is_ok(), "{header}");
        }
    }

    #[test]
    fn decodes_utf16_without_a_bom() {
        let bytes = utf16le(r#"{"name":"café"}"#);
        let value = JsonDecoder
            .decode(&bytes, Some("application/json; charset=utf-16"))
            .unwrap();
        assert_eq!(value["name"], "café");
    }

    #[test]
    fn honours_a_big_endian_bom() {
        let mut bytes = vec![0xfe, 0xff];
        bytes.extend(r#"{"n":1}"#.encode_utf16().flat_map(u16::to_be_bytes));
        let value = JsonDecoder
            .decode(&bytes, Some("application/json; charset=utf-16"))
            .unwrap();
        assert_eq!(value["n"], 1);
    }

    #[test]
    fn rejects_other_media_types() {
        let err = JsonDecoder.decode(b"hi", Some("text/plain")).unwrap_err();
        assert!(matches!(err, ContentError::UnsupportedMediaType(media) if media == "text/plain"));
    }

    #[test]
    fn rejects_a_missing_media_type() {
        assert!(matches!(
            JsonDecoder.decode(b"{}", None),
            Err(ContentError::MissingMediaType)
        ));
    }

    #[test]
    fn rejects_unknown_charsets() {
        let err = JsonDecoder
            .decode(b"{}", Some("application/json; charset=latin-1"))
            .unwrap_err();
        assert!(matches!(err, ContentError::UnsupportedCharset(c) if c == "latin-1"));
    }

    #[test]
    fn surfaces_json_syntax_errors() {
        assert!(matches!(
            JsonDecoder.decode(b"{broken", Some("application/json")),
            Err(ContentError::Json(_))
        ));
    }

    #[test]
    fn rejects_odd_length_utf16() {
        assert!(matches!(
            JsonDecoder.decode(&[0x7b, 0x00, 0x7d], Some("application/json; charset=utf-16")),
            Err(ContentError::InvalidUtf16)
        ));
    }
}
