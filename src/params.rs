//! Typed path parameters and the argument bundle handed to handlers.

use std::fmt;

use thiserror::Error;

// ── Declared types ───────────────────────────────────────────────────────────

/// The type tag a template declares for a placeholder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParamType {
    Int,
    Float,
    Bool,
    Str,
}

impl ParamType {
    pub(crate) fn parse_tag(tag: &str) -> Option<Self> {
        match tag {
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            "str" => Some(Self::Str),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Str => "str",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Coerced values ───────────────────────────────────────────────────────────

/// One path parameter after coercion to its declared type.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn type_of(&self) -> ParamType {
        match self {
            Self::Int(_) => ParamType::Int,
            Self::Float(_) => ParamType::Float,
            Self::Bool(_) => ParamType::Bool,
            Self::Str(_) => ParamType::Str,
        }
    }
}

// ── Handler arguments ────────────────────────────────────────────────────────

/// Everything extracted from the request target for one invocation: coerced
/// path parameters in template order, plus the raw query pairs.
#[derive(Clone, Debug)]
pub struct Args {
    values: Vec<(String, ParamValue)>,
    query: Vec<(String, String)>,
}

impl Args {
    pub(crate) fn new(values: Vec<(String, ParamValue)>, query: Vec<(String, String)>) -> Self {
        Self { values, query }
    }

    /// All path parameters in template order.
    pub fn values(&self) -> &[(String, ParamValue)] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    fn lookup(&self, name: &str) -> Result<&ParamValue, ArgError> {
        self.get(name).ok_or_else(|| ArgError::Missing(name.to_owned()))
    }

    pub fn int(&self, name: &str) -> Result<i64, ArgError> {
        let value = self.lookup(name)?;
        value.as_int().ok_or_else(|| ArgError::WrongType {
            name: name.to_owned(),
            requested: ParamType::Int,
            actual: value.type_of(),
        })
    }

    pub fn float(&self, name: &str) -> Result<f64, ArgError> {
        let value = self.lookup(name)?;
        value.as_float().ok_or_else(|| ArgError::WrongType {
            name: name.to_owned(),
            requested: ParamType::Float,
            actual: value.type_of(),
        })
    }

    pub fn boolean(&self, name: &str) -> Result<bool, ArgError> {
        let value = self.lookup(name)?;
        value.as_bool().ok_or_else(|| ArgError::WrongType {
            name: name.to_owned(),
            requested: ParamType::Bool,
            actual: value.type_of(),
        })
    }

    pub fn text(&self, name: &str) -> Result<&str, ArgError> {
        let value = self.lookup(name)?;
        value.as_str().ok_or_else(|| ArgError::WrongType {
            name: name.to_owned(),
            requested: ParamType::Str,
            actual: value.type_of(),
        })
    }

    /// The resolved value for one query key, if the request carried it.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// A query value parsed as an integer. Absent keys are `Ok(None)`,
    /// unparseable values are an error the handler can surface.
    pub fn query_int(&self, name: &str) -> Result<Option<i64>, ArgError> {
        match self.query(name) {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| ArgError::QueryType {
                name: name.to_owned(),
                requested: ParamType::Int,
            }),
        }
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }
}

/// Failure to read an argument the handler asked for.
#[derive(Debug, Error, PartialEq)]
pub enum ArgError {
    #[error("no parameter named {0:?}")]
    Missing(String),
    #[error("parameter {name:?} is {actual}, not {requested}")]
    WrongType {
        name: String,
        requested: ParamType,
        actual: ParamType,
    },
    #[error("query parameter {name:?} is not a valid {requested}")]
    QueryType { name: String, requested: ParamType },
}
