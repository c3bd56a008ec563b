//! Scalar property values.

use std::fmt;

use derive_more::From;
use serde::{Deserialize, Serialize};

/// An opaque scalar stored under a property name.
///
/// Values are type-preserving: a `Long` written is a `Long` read back.
/// Properties never hold references to other nodes.
#[derive(Clone, Debug, PartialEq, From, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Long(i64),
    Double(f64),
    String(String),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_owned())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Boolean(b) => write!(f, "{b}"),
            PropertyValue::Long(n) => write!(f, "{n}"),
            PropertyValue::Double(x) => write!(f, "{x:?}"),
            PropertyValue::String(s) => write!(f, "{s:?}"),
        }
    }
}
