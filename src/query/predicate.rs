//! Predicate definitions

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::errors::DbError;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Coerced equality
    Is,
    /// Coerced inequality; records lacking the attribute are kept
    Not,
    /// Strictly greater after coercion
    Gt,
    /// Strictly less after coercion
    Lt,
    /// Substring containment on the raw text, never coerced
    Like,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Is => "is",
            Operator::Not => "not",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Like => "like",
        }
    }
}

impl FromStr for Operator {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "is" => Ok(Operator::Is),
            "not" => Ok(Operator::Not),
            "gt" => Ok(Operator::Gt),
            "lt" => Ok(Operator::Lt),
            "like" => Ok(Operator::Like),
            other => Err(DbError::InvalidPredicate(format!(
                "unknown operator '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type that both sides are coerced to before comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueType {
    #[default]
    String,
    Integer,
    Time,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Time => "time",
        }
    }
}

impl FromStr for ValueType {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ValueType::String),
            "integer" => Ok(ValueType::Integer),
            "time" => Ok(ValueType::Time),
            other => Err(DbError::InvalidPredicate(format!(
                "unknown value type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single filter over one attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub attribute: String,
    pub op: Operator,
    pub value: Value,
    pub value_type: ValueType,
}

impl Predicate {
    pub fn new(
        attribute: impl Into<String>,
        op: Operator,
        value: impl Into<Value>,
        value_type: ValueType,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            op,
            value: value.into(),
            value_type,
        }
    }

    /// String-typed equality predicate
    pub fn is(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(attribute, Operator::Is, value, ValueType::String)
    }

    /// String-typed substring predicate
    pub fn like(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(attribute, Operator::Like, value, ValueType::String)
    }

    /// Replaces the declared type
    pub fn typed(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }
}
