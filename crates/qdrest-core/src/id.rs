//! Point identifier resolution
//!
//! Qdrant only accepts unsigned integers or UUIDs as point ids. Callers hand
//! us whatever they have (nothing, a number, some string key) and
//! [`resolve`] always turns it into something the server will take.
//! A string that is not a UUID is dropped and replaced by a fresh v4 UUID;
//! keep custom keys in the payload if they matter.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Canonical 8-4-4-4-12 form, any case. Variant and version bits are not checked.
static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("UUID pattern is a valid regex")
});

/// Check a string against the canonical hyphenated UUID form
pub fn is_canonical_uuid(s: &str) -> bool {
    UUID_PATTERN.is_match(s)
}

/// Generate a random v4 UUID in lowercase hyphenated form
pub fn generate_uuid() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

// ============================================================================
// Raw (caller-side) identifier
// ============================================================================

/// An identifier as supplied by a caller, before resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RawPointId {
    /// No identifier given
    #[default]
    Missing,
    /// A non-negative integer
    Integer(u64),
    /// Any string, valid UUID or not
    Text(String),
    /// Something that is neither (negative or fractional number, bool, object...)
    Other,
}

impl From<u64> for RawPointId {
    fn from(n: u64) -> Self {
        Self::Integer(n)
    }
}

impl From<u32> for RawPointId {
    fn from(n: u32) -> Self {
        Self::Integer(u64::from(n))
    }
}

impl From<usize> for RawPointId {
    fn from(n: usize) -> Self {
        Self::Integer(n as u64)
    }
}

impl From<i64> for RawPointId {
    fn from(n: i64) -> Self {
        u64::try_from(n).map(Self::Integer).unwrap_or(Self::Other)
    }
}

impl From<i32> for RawPointId {
    fn from(n: i32) -> Self {
        Self::from(i64::from(n))
    }
}

impl From<&str> for RawPointId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawPointId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Uuid> for RawPointId {
    fn from(uuid: Uuid) -> Self {
        Self::Text(uuid.hyphenated().to_string())
    }
}

impl From<PointId> for RawPointId {
    fn from(id: PointId) -> Self {
        match id {
            PointId::Num(n) => Self::Integer(n),
            PointId::Uuid(s) => Self::Text(s),
        }
    }
}

impl<T: Into<RawPointId>> From<Option<T>> for RawPointId {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Missing)
    }
}

impl From<&serde_json::Value> for RawPointId {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Missing,
            Value::String(s) => Self::Text(s.clone()),
            Value::Number(n) => {
                if let Some(n) = n.as_u64() {
                    return Self::Integer(n);
                }
                // 42.0 is unambiguously the integer 42
                match n.as_f64() {
                    Some(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => {
                        Self::Integer(f as u64)
                    }
                    _ => Self::Other,
                }
            }
            _ => Self::Other,
        }
    }
}

// ============================================================================
// Resolved (wire) identifier
// ============================================================================

/// A point identifier the server accepts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointId {
    Num(u64),
    Uuid(String),
}

impl PointId {
    /// Generate a fresh random UUID identifier
    pub fn random() -> Self {
        Self::Uuid(generate_uuid())
    }

    /// Parse a canonical UUID string, returning `None` for anything else
    pub fn parse_uuid(s: &str) -> Option<Self> {
        is_canonical_uuid(s).then(|| Self::Uuid(s.to_string()))
    }

    pub fn as_num(&self) -> Option<u64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Uuid(_) => None,
        }
    }

    pub fn as_uuid(&self) -> Option<&str> {
        match self {
            Self::Num(_) => None,
            Self::Uuid(s) => Some(s),
        }
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Uuid(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for PointId {
    fn from(n: u64) -> Self {
        Self::Num(n)
    }
}

impl From<Uuid> for PointId {
    fn from(uuid: Uuid) -> Self {
        Self::Uuid(uuid.hyphenated().to_string())
    }
}

impl std::str::FromStr for PointId {
    type Err = String;

    /// Accepts a decimal integer or a canonical UUID
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<u64>() {
            return Ok(Self::Num(n));
        }
        Self::parse_uuid(s).ok_or_else(|| format!("not an unsigned integer or UUID: {s}"))
    }
}

impl Serialize for PointId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Num(n) => serializer.serialize_u64(*n),
            Self::Uuid(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for PointId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(n) => Ok(Self::Num(n)),
            Repr::Text(s) => Self::parse_uuid(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid point id: {s}"))),
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Turn a caller-supplied identifier into a wire-valid one
///
/// Never fails. Order: missing -> new UUID, integer -> as is,
/// canonical UUID string -> unchanged (case kept), anything else -> new UUID.
pub fn resolve(raw: impl Into<RawPointId>) -> PointId {
    match raw.into() {
        RawPointId::Missing => PointId::random(),
        RawPointId::Integer(n) => PointId::Num(n),
        RawPointId::Text(s) => {
            if is_canonical_uuid(&s) {
                PointId::Uuid(s)
            } else {
                let id = PointId::random();
                tracing::debug!("Replacing non-UUID point id {:?} with {}", s, id);
                id
            }
        }
        RawPointId::Other => {
            let id = PointId::random();
            tracing::debug!("Replacing unsupported point id with {}", id);
            id
        }
    }
}

/// Resolve every identifier in one pass
pub fn resolve_all<I>(raw: I) -> Vec<PointId>
where
    I: IntoIterator,
    I::Item: Into<RawPointId>,
{
    raw.into_iter().map(resolve).collect()
}
