//! Outgoing HTTP response type.
//!
//! You should not need to think about this module directly. Build a [`Response`]
//! in your handler and return it. That is the entire job description.

use bytes::Bytes;
use http::{HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;
use tracing::warn;

use crate::method::AllowedMethods;
use crate::status::Status;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    Csv,          // text/csv
    EventStream,  // text/event-stream  (SSE)
    FormData,     // application/x-www-form-urlencoded
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    MsgPack,      // application/msgpack
    OctetStream,  // application/octet-stream  (binary / file download)
    Pdf,          // application/pdf
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::EventStream => "text/event-stream",
            Self::FormData    => "application/x-www-form-urlencoded",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::MsgPack     => "application/msgpack",
            Self::OctetStream => "application/octet-stream",
            Self::Pdf         => "application/pdf",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use ruta::{Response, Status};
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(Status::NoContent);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use ruta::{Response, ContentType, Status};
///
/// Response::builder()
///     .status(Status::Created)
///     .header("location", "/items/42")
///     .json(br#"{"id":42}"#.to_vec());
///
/// Response::builder()
///     .status(Status::Ok)
///     .bytes(ContentType::Xml, b"<ok/>".to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: u16,
}

impl Response {
    /// `200 OK` — `application/json`.
    ///
    /// Pass bytes from your serialiser directly, no intermediate allocation:
    /// - serde_json: `serde_json::to_vec(&val)?`
    /// - hand-built: `format!(r#"{{"id":{id}}}"#).into_bytes()`
    pub fn json(body: Vec<u8>) -> Self {
        Self::bytes_raw("application/json", body)
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::bytes_raw("text/plain; charset=utf-8", body.into().into_bytes())
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { body: Vec::new(), headers: Vec::new(), status: code.into() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok.into() }
    }

    fn bytes_raw(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            body,
            headers: vec![("content-type".to_owned(), content_type.to_owned())],
            status: Status::Ok.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts into the hyper-compatible wire representation.
    ///
    /// Header names or values that are not legal HTTP are logged and dropped
    /// rather than failing the whole response.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut wire = http::Response::new(Full::new(Bytes::from(self.body)));
        *wire.status_mut() =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        for (name, value) in &self.headers {
            let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
                warn!(header = %name, "dropping invalid header name");
                continue;
            };
            let Ok(value) = HeaderValue::from_str(value) else {
                warn!(header = %name, "dropping invalid header value");
                continue;
            };
            wire.headers_mut().insert(name, value);
        }
        wire
    }
}

// ── Dispatch error responses ──────────────────────────────────────────────────

impl Response {
    /// `400 Bad Request`, no body.
    pub(crate) fn bad_request() -> Self {
        Self::status(Status::BadRequest)
    }

    /// `405 Method Not Allowed` with an `allow` header listing the verbs
    /// registered for the matched shape.
    pub(crate) fn method_not_allowed(allowed: &AllowedMethods) -> Self {
        Self::builder()
            .status(Status::MethodNotAllowed)
            .header("allow", &allowed.header_value())
            .no_body()
    }

    /// `401 Unauthorized` with a `www-authenticate` challenge naming the
    /// provider's realm.
    pub(crate) fn unauthorized(realm: &str) -> Self {
        Self::builder()
            .status(Status::Unauthorized)
            .header("www-authenticate", &format!(r#"Basic realm="{realm}""#))
            .no_body()
    }

    /// `500 Internal Server Error` carrying a plain-text diagnostic.
    pub(crate) fn internal_error(diagnostic: impl std::fmt::Display) -> Self {
        Self::builder()
            .status(Status::InternalServerError)
            .text(diagnostic.to_string())
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by a typed body method — you always know what you're sending.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code.into();
        self
    }

    /// Sets a header, replacing any earlier value with the same name.
    /// Names compare case-insensitively, so the final header list never
    /// carries duplicates.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_owned(),
            None => self.headers.push((name.to_owned(), value.to_owned())),
        }
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish("application/json", body)
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish("text/plain; charset=utf-8", body.into().into_bytes())
    }

    /// Terminate with a typed body. Use this for XML, HTML, binary, SSE, etc.
    pub fn bytes(self, content_type: ContentType, body: Vec<u8>) -> Response {
        self.finish(content_type.as_str(), body)
    }

    /// Terminate with no body (e.g. `Status::NoContent`, `Status::MovedPermanently`).
    pub fn no_body(self) -> Response {
        Response { body: Vec::new(), headers: self.headers, status: self.status }
    }

    fn finish(mut self, content_type: &str, body: Vec<u8>) -> Response {
        if self.header_absent("content-type") {
            self.headers
                .push(("content-type".to_owned(), content_type.to_owned()));
        }
        Response { body, headers: self.headers, status: self.status }
    }

    fn header_absent(&self, name: &str) -> bool {
        !self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    #[test]
    fn builder_header_replaces_case_insensitively() {
        let response = Response::builder()
            .header("Location", "/a")
            .header("location", "/b")
            .no_body();
        assert_eq!(response.header("location"), Some("/b"));
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn body_methods_do_not_duplicate_an_explicit_content_type() {
        let response = Response::builder()
            .header("content-type", "application/problem+json")
            .json(b"{}".to_vec());
        assert_eq!(response.header("content-type"), Some("application/problem+json"));
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn method_not_allowed_lists_the_verbs() {
        let allowed = AllowedMethods::new(vec![Method::Get, Method::Put]);
        let response = Response::method_not_allowed(&allowed);
        assert_eq!(response.status_code(), 405);
        assert_eq!(response.header("allow"), Some("GET, PUT"));
        assert!(response.body().is_empty());
    }

    #[test]
    fn unauthorized_carries_a_basic_challenge() {
        let response = Response::unauthorized("vault");
        assert_eq!(response.status_code(), 401);
        assert_eq!(
            response.header("www-authenticate"),
            Some(r#"Basic realm="vault""#)
        );
    }

    #[test]
    fn internal_error_carries_the_diagnostic() {
        let response = Response::internal_error("backend exploded");
        assert_eq!(response.status_code(), 500);
        assert_eq!(response.body(), b"backend exploded");
    }
}
