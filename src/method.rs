//! HTTP verbs as a typed enum.
//!
//! Covers the verbs a controller method can bind, plus an explicit
//! [`Method::Unsupported`] sentinel for anything else seen on the wire.
//! The sentinel can never be registered, since route constructors exist only
//! for the concrete verbs, and the dispatcher answers it with
//! `400 Bad Request` before any matching happens.

use std::fmt;

/// An HTTP verb.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    /// A verb this engine does not dispatch on.
    Unsupported,
}

impl Method {
    /// Parses an uppercase verb string, case-sensitive per RFC 9110 §9.1.
    /// Anything unknown becomes [`Method::Unsupported`].
    pub fn parse(s: &str) -> Self {
        match s {
            "GET"     => Self::Get,
            "POST"    => Self::Post,
            "PUT"     => Self::Put,
            "DELETE"  => Self::Delete,
            "PATCH"   => Self::Patch,
            "HEAD"    => Self::Head,
            "OPTIONS" => Self::Options,
            _         => Self::Unsupported,
        }
    }

    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get         => "GET",
            Self::Post        => "POST",
            Self::Put         => "PUT",
            Self::Delete      => "DELETE",
            Self::Patch       => "PATCH",
            Self::Head        => "HEAD",
            Self::Options     => "OPTIONS",
            Self::Unsupported => "UNSUPPORTED",
        }
    }

    pub(crate) fn is_supported(self) -> bool {
        self != Self::Unsupported
    }

    /// Canonical position when rendering verb sets.
    fn order(self) -> u8 {
        match self {
            Self::Get         => 0,
            Self::Head        => 1,
            Self::Post        => 2,
            Self::Put         => 3,
            Self::Patch       => 4,
            Self::Delete      => 5,
            Self::Options     => 6,
            Self::Unsupported => 7,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── AllowedMethods ────────────────────────────────────────────────────────────

/// The distinct verb set attached to a `405 Method Not Allowed` response.
///
/// Built from the verbs of every route whose template shape matched the
/// request path. Duplicates collapse, the sentinel is dropped, and rendering
/// follows one canonical order so the `Allow` header is deterministic.
#[derive(Clone, Debug)]
pub struct AllowedMethods {
    methods: Vec<Method>,
}

impl AllowedMethods {
    pub fn new(mut methods: Vec<Method>) -> Self {
        methods.retain(|m| m.is_supported());
        methods.sort_by_key(|m| m.order());
        methods.dedup();
        Self { methods }
    }

    pub fn as_slice(&self) -> &[Method] {
        &self.methods
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Renders the `Allow` header value, e.g. `"GET, PUT"`.
    pub fn header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AllowedMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, method) in self.methods.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(method.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_verbs() {
        assert_eq!(Method::parse("GET"), Method::Get);
        assert_eq!(Method::parse("DELETE"), Method::Delete);
        assert_eq!(Method::parse("OPTIONS"), Method::Options);
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(Method::parse("get"), Method::Unsupported);
    }

    #[test]
    fn unknown_verbs_become_the_sentinel() {
        assert_eq!(Method::parse("TRACE"), Method::Unsupported);
        assert_eq!(Method::parse("BREW"), Method::Unsupported);
    }

    #[test]
    fn allowed_methods_dedup_and_order() {
        let allowed = AllowedMethods::new(vec![
            Method::Put,
            Method::Get,
            Method::Put,
            Method::Delete,
        ]);
        assert_eq!(
            allowed.as_slice(),
            &[Method::Get, Method::Put, Method::Delete]
        );
        assert_eq!(allowed.header_value(), "GET, PUT, DELETE");
    }

    #[test]
    fn allowed_methods_drop_the_sentinel() {
        let allowed = AllowedMethods::new(vec![Method::Unsupported, Method::Get]);
        assert_eq!(allowed.as_slice(), &[Method::Get]);
    }
}
