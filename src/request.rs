//! The request model the dispatcher consumes.
//!
//! [`Request`] is transport-neutral: the wire adapter in [`crate::server`]
//! builds one from a hyper request, and tests build them directly. A request
//! that could not be fully read is marked incomplete and rejected before any
//! route matching happens.

use bytes::Bytes;

use crate::method::Method;

/// One inbound request, decoupled from the transport that produced it.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
    complete: bool,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
            complete: true,
        }
    }

    /// Attaches a body and its `content-type` header in one step.
    pub fn with_body(mut self, content_type: &str, body: impl Into<Bytes>) -> Self {
        self.headers
            .push(("content-type".to_owned(), content_type.to_owned()));
        self.body = Some(body.into());
        self
    }

    /// Attaches body bytes without touching headers. The wire adapter uses
    /// this after it has already copied the headers over.
    pub(crate) fn with_raw_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Marks the request as not fully received.
    pub fn incomplete(mut self) -> Self {
        self.complete = false;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The raw request target, path plus optional query, still encoded.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}
