// Entity identifiers
//
// Device42 ids are almost always integers, but a few endpoints hand back
// string ids. `EntityId` accepts both and formats the way path segments
// expect.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Numeric(i64),
    Text(String),
}

impl EntityId {
    /// Read an id out of a JSON value. Numbers and non-empty strings qualify;
    /// `0`, empty strings and everything else do not.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().filter(|id| *id != 0).map(Self::Numeric),
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(
                s.parse()
                    .map_or_else(|_| Self::Text(s.clone()), Self::Numeric),
            ),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Numeric(id) => Value::from(*id),
            Self::Text(id) => Value::from(id.as_str()),
        }
    }

    pub const fn as_numeric(&self) -> Option<i64> {
        match self {
            Self::Numeric(id) => Some(*id),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        id.parse().map_or_else(|_| Self::Text(id.to_owned()), Self::Numeric)
    }
}

/// Lowercase, colon-separated form of a MAC address. Accepts colon, dash,
/// dot or no separators; anything that is not twelve hex digits is returned
/// lowercased but otherwise untouched.
pub fn normalize_mac(raw: &str) -> String {
    let hex: String = raw
        .chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let stripped = raw.chars().filter(|c| !matches!(c, ':' | '-' | '.')).count();
    if hex.len() != 12 || stripped != 12 {
        return raw.to_ascii_lowercase();
    }

    hex.as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).into_owned())
        .collect::<Vec<_>>()
        .join(":")
}
