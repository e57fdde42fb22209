//! Route templates.
//!
//! A template is a `/`-separated pattern of literal segments and typed
//! placeholders, e.g. `/items/{id:int}/tags/{tag}`. Placeholders declare one
//! of `int`, `float`, `bool` or `str` and default to `str`. Parsing is eager
//! and strict so a bad pattern fails at registration, never at dispatch.

use std::fmt;

use crate::error::{ConversionError, TemplateError};
use crate::params::{ParamType, ParamValue};
use crate::uri::ParsedUri;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Segment {
    Literal(String),
    Placeholder { name: String, ty: ParamType },
}

/// A parsed route template.
#[derive(Clone, Debug)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    param_count: usize,
}

impl Template {
    /// Parses a template string.
    ///
    /// Rejects empty segments, unbalanced or embedded braces, nameless
    /// placeholders, unknown type tags and duplicate placeholder names.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let trimmed = source.trim_start_matches('/').trim_end_matches('/');
        let mut segments = Vec::new();
        let mut names: Vec<&str> = Vec::new();

        if !trimmed.is_empty() {
            for part in trimmed.split('/') {
                if part.is_empty() {
                    return Err(TemplateError::EmptySegment);
                }
                if let Some(inner) = part.strip_prefix('{') {
                    let inner = inner
                        .strip_suffix('}')
                        .ok_or_else(|| TemplateError::MalformedPlaceholder(part.to_owned()))?;
                    let (name, ty) = match inner.split_once(':') {
                        Some((name, tag)) => {
                            let ty = ParamType::parse_tag(tag)
                                .ok_or_else(|| TemplateError::UnknownType(tag.to_owned()))?;
                            (name, ty)
                        }
                        None => (inner, ParamType::Str),
                    };
                    if name.is_empty() {
                        return Err(TemplateError::MissingName);
                    }
                    if names.contains(&name) {
                        return Err(TemplateError::DuplicateName(name.to_owned()));
                    }
                    names.push(name);
                    segments.push(Segment::Placeholder {
                        name: name.to_owned(),
                        ty,
                    });
                } else {
                    if part.contains('{') || part.contains('}') {
                        return Err(TemplateError::MalformedPlaceholder(part.to_owned()));
                    }
                    segments.push(Segment::Literal(part.to_owned()));
                }
            }
        }

        let param_count = segments
            .iter()
            .filter(|s| matches!(s, Segment::Placeholder { .. }))
            .count();
        Ok(Self {
            source: source.to_owned(),
            segments,
            param_count,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }

    /// Whether a parsed target fits this template: same segment count,
    /// literals equal case-sensitively, placeholders accept anything.
    /// Type coercion is deliberately deferred to [`Template::extract`].
    pub fn matches(&self, uri: &ParsedUri) -> bool {
        if uri.segment_count() != self.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(uri.segments())
            .all(|(segment, actual)| match segment {
                Segment::Literal(text) => text == actual,
                Segment::Placeholder { .. } => true,
            })
    }

    /// Whether two templates claim the same set of targets.
    ///
    /// Shape ignores placeholder names and types: `/c/{id:int}` and
    /// `/c/{name}` collide, `/a/{x}` and `/b/{x}` do not.
    pub fn same_shape(&self, other: &Template) -> bool {
        if self.segments.len() != other.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(&other.segments)
            .all(|(a, b)| match (a, b) {
                (Segment::Literal(a), Segment::Literal(b)) => a == b,
                (Segment::Placeholder { .. }, Segment::Placeholder { .. }) => true,
                _ => false,
            })
    }

    /// Coerces the placeholder segments of a matching target, in template
    /// order. The caller must have checked [`Template::matches`] first.
    pub fn extract(&self, uri: &ParsedUri) -> Result<Vec<(String, ParamValue)>, ConversionError> {
        let mut values = Vec::with_capacity(self.param_count);
        for (segment, actual) in self.segments.iter().zip(uri.segments()) {
            if let Segment::Placeholder { name, ty } = segment {
                values.push((name.clone(), coerce(name, *ty, actual)?));
            }
        }
        Ok(values)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn coerce(name: &str, ty: ParamType, raw: &str) -> Result<ParamValue, ConversionError> {
    let fail = || ConversionError {
        name: name.to_owned(),
        ty,
        raw: raw.to_owned(),
    };
    match ty {
        ParamType::Int => raw.parse::<i64>().map(ParamValue::Int).map_err(|_| fail()),
        ParamType::Float => raw.parse::<f64>().map(ParamValue::Float).map_err(|_| fail()),
        ParamType::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(ParamValue::Bool(true)),
            "false" => Ok(ParamValue::Bool(false)),
            _ => Err(fail()),
        },
        ParamType::Str => Ok(ParamValue::Str(raw.to_owned())),
    }
}
