//! Error taxonomy.
//!
//! Split by when an error can occur. Registration-time errors
//! ([`RegistrationError`], [`TemplateError`]) mean the route table itself is
//! wrong and abort startup. Request-time errors ([`DispatchError`] and the
//! kinds it wraps) are mapped to responses inside the dispatcher and never
//! escape it. [`ServerError`] surfaces transport failures: binding a port or
//! accepting a connection.

use thiserror::Error;

use crate::method::{AllowedMethods, Method};
use crate::params::ParamType;

/// A rejected route registration. Fatal: the table is misdeclared, and
/// starting up with it would turn a programming error into runtime 500s.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Two routes share a verb and a template shape; requests matching one
    /// would ambiguously match the other.
    #[error("conflicting routes: {verb} {first} and {verb} {second} share a shape")]
    Conflict {
        verb: Method,
        first: String,
        second: String,
    },

    #[error("invalid template {template:?}")]
    Template {
        template: String,
        #[source]
        source: TemplateError,
    },
}

/// A malformed route template string.
#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("empty segment")]
    EmptySegment,

    #[error("malformed placeholder in segment {0:?}")]
    MalformedPlaceholder(String),

    #[error("placeholder has no name")]
    MissingName,

    #[error("duplicate placeholder name {0:?}")]
    DuplicateName(String),

    #[error("unknown placeholder type {0:?}")]
    UnknownType(String),
}

/// A request path that cannot be decoded.
#[derive(Debug, Error, PartialEq)]
pub enum ParseUriError {
    #[error("malformed percent escape at byte {0}")]
    InvalidEscape(usize),

    #[error("segment decodes to invalid utf-8")]
    InvalidUtf8,

    #[error("empty path segment")]
    EmptySegment,
}

/// A placeholder value that does not coerce to its declared type.
#[derive(Debug, Error, PartialEq)]
#[error("cannot convert {raw:?} to {ty} for parameter {name:?}")]
pub struct ConversionError {
    pub name: String,
    pub ty: ParamType,
    pub raw: String,
}

/// Request content that cannot become a handler's body value.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("route expects a body but the request has none")]
    MissingBody,

    #[error("content has no declared media type")]
    MissingMediaType,

    #[error("unsupported media type {0:?}")]
    UnsupportedMediaType(String),

    #[error("unsupported charset {0:?}")]
    UnsupportedCharset(String),

    #[error("content is not valid utf-16")]
    InvalidUtf16,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Why one dispatch failed. Every variant maps to exactly one canonical
/// response; the mapping lives in the dispatcher and nothing propagates past
/// it.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("incomplete request")]
    Incomplete,

    #[error("unsupported verb")]
    UnsupportedVerb,

    #[error(transparent)]
    Uri(#[from] ParseUriError),

    #[error("no route matches the path shape")]
    NoRoute,

    #[error("verb not allowed; allowed: {0}")]
    VerbMismatch(AllowedMethods),

    #[error("authorization required but no provider is configured")]
    AuthMisconfigured,

    #[error("authorization denied for realm {realm:?}")]
    AuthDenied { realm: String },

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("handler failed: {0}")]
    Handler(anyhow::Error),

    #[error("handler panicked: {0}")]
    Panic(String),
}

/// A transport-level failure surfaced by [`Server`](crate::Server).
///
/// Application-level outcomes (400, 401, 405, 500) are expressed as
/// [`Response`](crate::Response) values, never as errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
