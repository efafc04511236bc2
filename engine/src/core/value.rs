//! Literal argument values shared by the statement parser, the registry, and
//! documentation rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A literal value appearing in a statement's argument list or as a declared
/// parameter default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
}

/// Declared type of a registered parameter, shown to the agent in the
/// documentation pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Int,
    Str,
    Bool,
}

impl TypeTag {
    /// Name rendered in call signatures (`div_id: int`).
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Str => "str",
            TypeTag::Bool => "bool",
        }
    }
}

impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Int(_) => TypeTag::Int,
            Value::Str(_) => TypeTag::Str,
            Value::Bool(_) => TypeTag::Bool,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Renders the literal the way it appears in statements and in rendered
    /// default values (strings single-quoted).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
        }
    }
}
