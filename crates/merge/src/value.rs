use std::cmp::Ordering;
use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};

/// A single table cell.
///
/// Absence is always the explicit `Null` variant. `Null` compares equal to
/// `Null`, so rows with an empty key cell still join with each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Text(String),
}

impl Value {
    /// Infer a typed value from a raw CSV cell.
    ///
    /// Empty → `Null`, `true`/`false` → `Bool`, integer → `Int`, finite
    /// float → `Float`, anything else → `Text`.
    pub fn parse_cell(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return Self::Null;
        }
        match s {
            "true" | "True" | "TRUE" => return Self::Bool(true),
            "false" | "False" | "FALSE" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(i) = s.parse::<i64>() {
            return Self::Int(i);
        }
        if s.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(f) = s.parse::<f64>() {
                if f.is_finite() {
                    return Self::Float(OrderedFloat(f));
                }
            }
        }
        Self::Text(s.to_string())
    }

    /// The value as a join key: a whole float in `i64` range becomes `Int`,
    /// so `1` and `1.0` land on the same key.
    pub fn join_key(&self) -> Value {
        match self {
            Self::Float(f) if f.0.fract() == 0.0 && f.0 >= i64::MIN as f64 && f.0 < i64::MAX as f64 => {
                Self::Int(f.0 as i64)
            }
            other => other.clone(),
        }
    }

    /// Key ordering for sorted merge output. Numbers compare by magnitude
    /// across `Int` and `Float`; `Null` sorts after everything else.
    pub fn key_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Greater,
            (_, Self::Null) => Ordering::Less,
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => OrderedFloat(a).cmp(&OrderedFloat(b)).then_with(|| self.cmp(other)),
                _ => self.cmp(other),
            },
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(f.0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Cell text as written to CSV. `Null` becomes the empty string.
    pub fn to_csv_field(&self) -> String {
        match self {
            Self::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            // Whole floats keep their ".0" so they stay distinguishable from ints.
            Self::Float(v) if v.0.fract() == 0.0 && v.0.abs() < 1e15 => write!(f, "{:.1}", v.0),
            Self::Float(v) => write!(f, "{}", v.0),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(v) => serializer.serialize_f64(v.0),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(OrderedFloat(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
