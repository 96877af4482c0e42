use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::utils::time::parse_rfc3339;

/// JSON key of the extended date form `{"$date": "<rfc3339>"}`.
pub const DATE_KEY: &str = "$date";

/// A scalar attribute value attached to a stored file.
///
/// Values of different kinds never compare equal or ordered against each other
/// in index filters: `{"size": {"$gt": 1}}` does not match `size = "2"`.
//
// // 附加在文件上的标量属性值。不同种类的值在索引过滤中互不比较。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AttributeRepr", into = "AttributeRepr")]
pub enum AttributeValue {
    String(String),
    Number(f64),
    Date(DateTime<Utc>),
}

/// The canonical attribute mapping persisted with every file record.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// The storage class of an [`AttributeValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Number,
    Date,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::String => "string",
            AttributeKind::Number => "number",
            AttributeKind::Date => "date",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(AttributeKind::String),
            "number" => Some(AttributeKind::Number),
            "date" => Some(AttributeKind::Date),
            _ => None,
        }
    }
}

/// Errors raised while turning loosely-typed (JSON) input into attributes or predicates.
#[derive(Debug, thiserror::Error)]
pub enum AttributeError {
    /// The value is not a string, number or `{"$date": ...}` object.
    #[error("Attribute '{name}' has an unsupported value: {found}")]
    UnsupportedValue { name: String, found: String },

    /// A `{"$date": ...}` value did not hold an RFC 3339 timestamp.
    #[error("Attribute '{name}' has an invalid date: {source}")]
    InvalidDate {
        name: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A predicate operator object had no operator key.
    #[error("Predicate for attribute '{0}' has an empty operator object")]
    EmptyOperator(String),

    /// A predicate was neither an object nor null.
    #[error("Predicate must be a JSON object, found: {0}")]
    InvalidPredicate(String),

    /// A predicate operator object named more than one operator.
    #[error("Predicate for attribute '{name}' has more than one operator: {found}")]
    AmbiguousOperator { name: String, found: String },

    /// Attribute names must be non-empty.
    #[error("Attribute name must not be empty")]
    EmptyName,

    /// NaN and infinities cannot be stored or compared.
    #[error("Attribute '{name}' is not a finite number: {value}")]
    NonFiniteNumber { name: String, value: f64 },
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::String(_) => AttributeKind::String,
            AttributeValue::Number(_) => AttributeKind::Number,
            AttributeValue::Date(_) => AttributeKind::Date,
        }
    }

    /// Reads one scalar out of a JSON value.
    ///
    /// Strings are kept as strings even if they look like timestamps; only the
    /// explicit `{"$date": "..."}` form produces a date.
    pub fn from_json(name: &str, value: &Value) -> Result<Self, AttributeError> {
        match value {
            Value::String(s) => Ok(AttributeValue::String(s.clone())),
            Value::Number(n) => n.as_f64().map(AttributeValue::Number).ok_or_else(|| {
                AttributeError::UnsupportedValue {
                    name: name.to_string(),
                    found: value.to_string(),
                }
            }),
            Value::Object(map) if is_date_object(map) => {
                let raw = map.get(DATE_KEY).and_then(Value::as_str).ok_or_else(|| {
                    AttributeError::UnsupportedValue {
                        name: name.to_string(),
                        found: value.to_string(),
                    }
                })?;
                let dt = parse_rfc3339(raw).map_err(|source| AttributeError::InvalidDate {
                    name: name.to_string(),
                    source,
                })?;
                Ok(AttributeValue::Date(dt))
            }
            other => Err(AttributeError::UnsupportedValue {
                name: name.to_string(),
                found: other.to_string(),
            }),
        }
    }
}

/// Checks that a mapping can be persisted: every name is non-empty and every
/// number is finite.
pub fn validate_attributes(map: &AttributeMap) -> Result<(), AttributeError> {
    for (name, value) in map {
        if name.is_empty() {
            return Err(AttributeError::EmptyName);
        }
        if let AttributeValue::Number(n) = value {
            if !n.is_finite() {
                return Err(AttributeError::NonFiniteNumber {
                    name: name.clone(),
                    value: *n,
                });
            }
        }
    }
    Ok(())
}

/// True for the single-key `{"$date": ...}` extended form.
pub(crate) fn is_date_object(map: &serde_json::Map<String, Value>) -> bool {
    map.len() == 1 && map.contains_key(DATE_KEY)
}

/// Parses every entry of a JSON object into an [`AttributeMap`].
pub(crate) fn map_from_json(
    object: &serde_json::Map<String, Value>,
) -> Result<AttributeMap, AttributeError> {
    object
        .iter()
        .map(|(name, value)| Ok((name.clone(), AttributeValue::from_json(name, value)?)))
        .collect()
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Number(n as f64)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        AttributeValue::Number(f64::from(n))
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(dt: DateTime<Utc>) -> Self {
        AttributeValue::Date(dt)
    }
}

// --- Serde 表示: 字符串 / 数字 / {"$date": ...} ---

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum AttributeRepr {
    Number(f64),
    String(String),
    Date {
        #[serde(rename = "$date")]
        date: DateTime<Utc>,
    },
}

impl From<AttributeRepr> for AttributeValue {
    fn from(repr: AttributeRepr) -> Self {
        match repr {
            AttributeRepr::Number(n) => AttributeValue::Number(n),
            AttributeRepr::String(s) => AttributeValue::String(s),
            AttributeRepr::Date { date } => AttributeValue::Date(date),
        }
    }
}

impl From<AttributeValue> for AttributeRepr {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Number(n) => AttributeRepr::Number(n),
            AttributeValue::String(s) => AttributeRepr::String(s),
            AttributeValue::Date(date) => AttributeRepr::Date { date },
        }
    }
}

/// The shapes in which callers may hand attributes to the store.
///
/// Attributes arrive either as one flat object or as a list of
/// single-pair objects (`[{"a": 1}, {"b": 2}]`). Both are folded into one
/// [`AttributeMap`] before anything is persisted.
//
// // 调用者提供属性的几种形式：单个映射，或由单键映射组成的列表。
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AttributeInput {
    Map(AttributeMap),
    List(Vec<AttributeMap>),
    #[default]
    Empty,
}

impl From<AttributeMap> for AttributeInput {
    fn from(map: AttributeMap) -> Self {
        AttributeInput::Map(map)
    }
}

impl From<Vec<AttributeMap>> for AttributeInput {
    fn from(list: Vec<AttributeMap>) -> Self {
        AttributeInput::List(list)
    }
}

impl<T: Into<AttributeInput>> From<Option<T>> for AttributeInput {
    fn from(input: Option<T>) -> Self {
        input.map(Into::into).unwrap_or_default()
    }
}

impl TryFrom<&Value> for AttributeInput {
    type Error = AttributeError;

    /// An object becomes `Map`, an array becomes `List` (non-object entries are
    /// skipped), anything else is `Empty`.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(object) => Ok(AttributeInput::Map(map_from_json(object)?)),
            Value::Array(items) => {
                let list = items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(map_from_json)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(AttributeInput::List(list))
            }
            _ => Ok(AttributeInput::Empty),
        }
    }
}

impl TryFrom<Value> for AttributeInput {
    type Error = AttributeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        AttributeInput::try_from(&value)
    }
}
