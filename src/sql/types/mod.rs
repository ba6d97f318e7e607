use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Supported column types
///
/// Serialized with the short names used in the metadata document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "bool")]
    Boolean,
    #[serde(rename = "str", alias = "text")]
    Text,
}

impl DataType {
    /// Parses a type name from a column spec (case-insensitive)
    pub fn from_str(name: &str) -> Option<Self> {
        Some(match name.to_lowercase().as_str() {
            "int" => DataType::Integer,
            "bool" => DataType::Boolean,
            "str" | "text" => DataType::Text,
            _ => return None,
        })
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            DataType::Integer => "int",
            DataType::Boolean => "bool",
            DataType::Text => "str",
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// A typed scalar, used for parsed literals, stored cells and clause values
///
/// Untagged on the wire: rows are stored as plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl Value {
    /// Converts the value into the type declared for its target column
    ///
    /// Booleans never become integers. Text becomes an integer only when it is
    /// an optionally signed run of digits, and a boolean only when it reads
    /// `true` or `false` in any case. Anything can become text.
    pub fn coerce(self, datatype: DataType) -> Result<Value> {
        match (datatype, self) {
            (DataType::Integer, v @ Value::Integer(_)) => Ok(v),
            (DataType::Integer, Value::Boolean(b)) => Err(Error::Validation(format!(
                "bool value {} cannot be used as int",
                b
            ))),
            (DataType::Integer, Value::Text(s)) if is_integer_literal(&s) => s
                .parse()
                .map(Value::Integer)
                .map_err(|_| Error::Validation(format!("int value out of range: {}", s))),
            (DataType::Integer, v) => {
                Err(Error::Validation(format!("expected int, got: {}", v)))
            }

            (DataType::Boolean, v @ Value::Boolean(_)) => Ok(v),
            (DataType::Boolean, Value::Text(s)) if s.eq_ignore_ascii_case("true") => {
                Ok(Value::Boolean(true))
            }
            (DataType::Boolean, Value::Text(s)) if s.eq_ignore_ascii_case("false") => {
                Ok(Value::Boolean(false))
            }
            (DataType::Boolean, v) => Err(Error::Validation(format!(
                "expected bool (true/false), got: {}",
                v
            ))),

            (DataType::Text, v @ Value::Text(_)) => Ok(v),
            (DataType::Text, v) => Ok(Value::Text(v.to_string())),
        }
    }

    /// Renders the value as command-language literal text
    ///
    /// Text is always quoted so that parsing the literal back yields text
    /// even when it looks like a number or a boolean.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Text(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            v => v.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Boolean(true) => write!(f, "true"),
            Value::Boolean(false) => write!(f, "false"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

/// Optionally signed, otherwise all ASCII digits, at least one digit
pub fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// A row maps every column name of its table to a value of the column's type
pub type Row = BTreeMap<String, Value>;
