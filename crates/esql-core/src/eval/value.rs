//! Runtime values and the coercion rules between them.
//!
//! `Value` is the closed set of types a filter expression can produce or an
//! event attribute can carry. Conversions between types go through
//! [`Value::coerce`], which implements the fixed rule table; there is no
//! other conversion path in the engine.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean value.
    Boolean(bool),
    /// Signed 32-bit integer.
    Integer(i32),
    /// Unicode string (Arc for cheap cloning).
    String(Arc<str>),
    /// Instant with timezone offset.
    Timestamp(DateTime<FixedOffset>),
    /// Opaque byte sequence (Arc for cheap cloning).
    Binary(Arc<[u8]>),
}

/// The type of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Boolean,
    Integer,
    String,
    Timestamp,
    Binary,
}

impl TypeTag {
    /// The type name as rendered in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Boolean => "Boolean",
            TypeTag::Integer => "Integer",
            TypeTag::String => "String",
            TypeTag::Timestamp => "Timestamp",
            TypeTag::Binary => "Binary",
        }
    }

    /// The zero value of this type, used as the best-effort placeholder when
    /// a required coercion fails and an error result still needs a value of
    /// the expected type for uniform propagation.
    pub fn zero_value(&self) -> Value {
        match self {
            TypeTag::Boolean => Value::Boolean(false),
            TypeTag::Integer => Value::Integer(0),
            TypeTag::String => Value::string(""),
            TypeTag::Timestamp => Value::Timestamp(DateTime::<Utc>::UNIX_EPOCH.fixed_offset()),
            TypeTag::Binary => Value::binary([]),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failed coercion: which conversion was attempted and why it failed.
///
/// Carries no source location; the error layer attaches the span of the node
/// that required the conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastFailure {
    pub from: TypeTag,
    pub to: TypeTag,
    pub detail: String,
}

impl CastFailure {
    fn new(from: TypeTag, to: TypeTag, detail: impl Into<String>) -> Self {
        Self {
            from,
            to,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for CastFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot cast {} to {}: {}", self.from, self.to, self.detail)
    }
}

// ==================== Constructors ====================

impl Value {
    /// Create a string value.
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    /// Create a binary value.
    pub fn binary(b: impl Into<Arc<[u8]>>) -> Self {
        Value::Binary(b.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(t: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(t)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::binary(b)
    }
}

// ==================== Type information ====================

impl Value {
    /// Get the type of this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Integer(_) => TypeTag::Integer,
            Value::String(_) => TypeTag::String,
            Value::Timestamp(_) => TypeTag::Timestamp,
            Value::Binary(_) => TypeTag::Binary,
        }
    }

    /// Try to read as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to read as i32.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to read as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to read as a timestamp.
    pub fn as_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Try to read as a byte slice.
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }
}

// ==================== Coercion ====================

impl Value {
    /// The canonical textual form of this value.
    ///
    /// Total over every type; this is exactly the String image of the
    /// coercion rule table.
    pub fn canonical_string(&self) -> Arc<str> {
        match self {
            Value::Boolean(b) => Arc::from(if *b { "true" } else { "false" }),
            Value::Integer(i) => Arc::from(i.to_string()),
            Value::String(s) => s.clone(),
            Value::Timestamp(t) => Arc::from(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Binary(b) => Arc::from(BASE64_STANDARD.encode(b)),
        }
    }

    /// Convert this value to the given type under the fixed coercion rules:
    ///
    /// - identity casts always succeed;
    /// - any type converts to String via its canonical form;
    /// - String converts to Boolean for `"true"`/`"false"` text only
    ///   (case-insensitive), to Integer for base-10 signed 32-bit text, to
    ///   Timestamp for RFC 3339 text, and to Binary for base64 text;
    /// - every other pair fails. In particular there is no conversion
    ///   between numbers and booleans.
    pub fn coerce(&self, to: TypeTag) -> Result<Value, CastFailure> {
        let from = self.type_tag();
        if from == to {
            return Ok(self.clone());
        }

        match (self, to) {
            (v, TypeTag::String) => Ok(Value::String(v.canonical_string())),
            (Value::String(s), TypeTag::Boolean) => {
                if s.eq_ignore_ascii_case("true") {
                    Ok(Value::Boolean(true))
                } else if s.eq_ignore_ascii_case("false") {
                    Ok(Value::Boolean(false))
                } else {
                    Err(CastFailure::new(
                        from,
                        to,
                        format!("\"{}\" is not \"true\" or \"false\"", s),
                    ))
                }
            }
            (Value::String(s), TypeTag::Integer) => s.parse::<i32>().map(Value::Integer).map_err(
                |e| CastFailure::new(from, to, format!("\"{}\" is not a 32-bit integer: {}", s, e)),
            ),
            (Value::String(s), TypeTag::Timestamp) => DateTime::parse_from_rfc3339(s)
                .map(Value::Timestamp)
                .map_err(|e| {
                    CastFailure::new(from, to, format!("\"{}\" is not RFC 3339 text: {}", s, e))
                }),
            (Value::String(s), TypeTag::Binary) => BASE64_STANDARD
                .decode(s.as_bytes())
                .map(Value::binary)
                .map_err(|e| {
                    CastFailure::new(from, to, format!("\"{}\" is not base64 text: {}", s, e))
                }),
            _ => Err(CastFailure::new(
                from,
                to,
                "no conversion between these types",
            )),
        }
    }

    /// Compare two values of the same type, returning an ordering.
    ///
    /// Returns `None` when the types differ; the evaluator normalizes mixed
    /// operand types before ordering comparisons.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Binary(a), Value::Binary(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

// ==================== Display ====================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s),
            other => f.write_str(&other.canonical_string()),
        }
    }
}
