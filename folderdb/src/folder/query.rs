use std::collections::BTreeMap;
use serde_json::Value;
use crate::common::attribute::{AttributeError, AttributeValue, is_date_object};
use crate::common::constants::{DEFAULT_QUERY_LIMIT, DEFAULT_QUERY_SKIP, MAX_QUERY_LIMIT};
use crate::file::FileRecord;
use crate::folder::{FolderError, FolderStore};
use crate::index::{Comparison, FieldCondition, IndexFilter};

/// The condition placed on one attribute by a [`Predicate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `attribute == value`
    Equals(AttributeValue),
    /// `attribute <op> operand` for `$lt`, `$lte`, `$gt` and `$gte`.
    /// Any other operator degrades to `attribute == operand`.
    Operator { op: String, operand: AttributeValue },
}

/// Caller-facing query: attribute name → condition, combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: BTreeMap<String, Condition>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name == value`.
    pub fn equals(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.conditions.insert(name.to_string(), Condition::Equals(value.into()));
        self
    }

    /// Adds `name <op> operand`, e.g. `.op("size", "$gte", 10)`.
    pub fn op(mut self, name: &str, op: &str, operand: impl Into<AttributeValue>) -> Self {
        self.conditions.insert(
            name.to_string(),
            Condition::Operator { op: op.to_string(), operand: operand.into() },
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Condition)> {
        self.conditions.iter()
    }

    /// Parses `{"a": "x", "b": {"$gt": 1}}`. `null` is the empty predicate.
    ///
    /// An operator object must name exactly one operator; `{"$gte": 1, "$lt": 5}`
    /// is rejected. `{"$date": ...}` is a date value, not an operator.
    pub fn from_json(value: &Value) -> Result<Self, AttributeError> {
        let object = match value {
            Value::Null => return Ok(Self::new()),
            Value::Object(object) => object,
            other => return Err(AttributeError::InvalidPredicate(other.to_string())),
        };

        let mut predicate = Self::new();
        for (name, raw) in object {
            let condition = match raw {
                Value::Object(inner) if !is_date_object(inner) => {
                    if inner.len() > 1 {
                        return Err(AttributeError::AmbiguousOperator {
                            name: name.clone(),
                            found: raw.to_string(),
                        });
                    }
                    let (op, operand) = inner
                        .iter()
                        .next()
                        .ok_or_else(|| AttributeError::EmptyOperator(name.clone()))?;
                    Condition::Operator {
                        op: op.clone(),
                        operand: AttributeValue::from_json(name, operand)?,
                    }
                }
                scalar => Condition::Equals(AttributeValue::from_json(name, scalar)?),
            };
            predicate.conditions.insert(name.clone(), condition);
        }
        Ok(predicate)
    }
}

/// Paging for [`FolderStore::query`]. Unset fields fall back to skip 0 / limit 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub skip: Option<usize>,
    /// `Some(0)` asks for an unbounded result and is treated like `None`.
    /// Larger limits are accepted up to 1000; anything above is clamped.
    pub limit: Option<usize>,
}

impl QueryOptions {
    pub fn new(skip: usize, limit: usize) -> Self {
        Self { skip: Some(skip), limit: Some(limit) }
    }

    /// Effective `(skip, limit)` after applying the defaults.
    pub fn resolve(options: Option<&QueryOptions>) -> (usize, usize) {
        let skip = options.and_then(|o| o.skip).unwrap_or(DEFAULT_QUERY_SKIP);
        let limit = options
            .and_then(|o| o.limit)
            .filter(|&limit| limit > 0)
            .map_or(DEFAULT_QUERY_LIMIT, |limit| limit.min(MAX_QUERY_LIMIT));
        (skip, limit)
    }
}

/// Turns a predicate into the index's native filter, every field scoped under `attributes.`.
pub fn translate(predicate: &Predicate) -> IndexFilter {
    predicate
        .iter()
        .fold(IndexFilter::new(), |filter, (name, condition)| {
            let clause = match condition {
                Condition::Equals(value) => {
                    FieldCondition::attribute(name, Comparison::Eq, value.clone())
                }
                Condition::Operator { op, operand } => {
                    let comparison = Comparison::from_operator(op).unwrap_or_else(|| {
                        tracing::debug!(attribute = %name, op = %op, "Unknown operator, matching by equality");
                        Comparison::Eq
                    });
                    FieldCondition::attribute(name, comparison, operand.clone())
                }
            };
            filter.and(clause)
        })
}

pub(crate) fn query_files(
    folder: &FolderStore,
    predicate: &Predicate,
    options: Option<&QueryOptions>,
) -> Result<Vec<FileRecord>, FolderError> {
    let filter = translate(predicate);
    let (skip, limit) = QueryOptions::resolve(options);
    let records = folder.index.find(&filter, skip, limit)?;
    tracing::debug!(
        folder = %folder.name,
        conditions = filter.conditions.len(),
        skip,
        limit,
        matched = records.len(),
        "Query executed"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_scalar_becomes_equality() {
        let filter = translate(&Predicate::new().equals("color", "red"));
        assert_eq!(
            filter.conditions,
            vec![FieldCondition::new("attributes.color", Comparison::Eq, "red".into())]
        );
    }

    #[test]
    fn test_range_operators() {
        let predicate = Predicate::new()
            .op("a", "$lt", 1)
            .op("b", "$lte", 2)
            .op("c", "$gt", 3)
            .op("d", "$gte", 4);
        let ops: Vec<(String, Comparison)> = translate(&predicate)
            .conditions
            .into_iter()
            .map(|c| (c.field, c.op))
            .collect();
        assert_eq!(
            ops,
            vec![
                ("attributes.a".to_string(), Comparison::Lt),
                ("attributes.b".to_string(), Comparison::Lte),
                ("attributes.c".to_string(), Comparison::Gt),
                ("attributes.d".to_string(), Comparison::Gte),
            ]
        );
    }

    #[test]
    fn test_unknown_operator_degrades_to_equality() {
        let filter = translate(&Predicate::new().op("size", "$ne", 5));
        assert_eq!(
            filter.conditions,
            vec![FieldCondition::new("attributes.size", Comparison::Eq, 5.into())]
        );
    }

    #[test]
    fn test_from_json() {
        let predicate = Predicate::from_json(&json!({
            "attribute1": "string",
            "attribute2": {"$gt": 1},
            "attribute3": {"$lt": {"$date": "2024-01-01T00:00:00Z"}},
            "attribute4": {"$date": "2023-01-01T00:00:00Z"}
        }))
        .unwrap();

        let expected = Predicate::new()
            .equals("attribute1", "string")
            .op("attribute2", "$gt", 1)
            .op("attribute3", "$lt", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .equals("attribute4", Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(predicate, expected);
    }

    #[test]
    fn test_from_json_edge_cases() {
        assert!(Predicate::from_json(&Value::Null).unwrap().is_empty());
        assert!(matches!(
            Predicate::from_json(&json!({"a": {}})),
            Err(AttributeError::EmptyOperator(name)) if name == "a"
        ));
        assert!(matches!(
            Predicate::from_json(&json!([1, 2])),
            Err(AttributeError::InvalidPredicate(_))
        ));
    }

    #[test]
    fn test_paging_defaults_and_unbounded_limit() {
        assert_eq!(QueryOptions::resolve(None), (0, 100));
        assert_eq!(QueryOptions::resolve(Some(&QueryOptions::default())), (0, 100));
        assert_eq!(QueryOptions::resolve(Some(&QueryOptions::new(5, 0))), (5, 100));
        assert_eq!(QueryOptions::resolve(Some(&QueryOptions::new(5, 20))), (5, 20));
        let skip_only = QueryOptions { skip: Some(3), limit: None };
        assert_eq!(QueryOptions::resolve(Some(&skip_only)), (3, 100));
    }

    #[test]
    fn test_large_limits_are_clamped() {
        assert_eq!(QueryOptions::resolve(Some(&QueryOptions::new(0, 500))), (0, 500));
        assert_eq!(QueryOptions::resolve(Some(&QueryOptions::new(0, 1000))), (0, 1000));
        assert_eq!(QueryOptions::resolve(Some(&QueryOptions::new(0, 1001))), (0, 1000));
        assert_eq!(QueryOptions::resolve(Some(&QueryOptions::new(7, usize::MAX))), (7, 1000));
    }

    #[test]
    fn test_operator_object_with_several_keys_is_rejected() {
        assert!(matches!(
            Predicate::from_json(&json!({"size": {"$lt": 5, "$gte": 1}})),
            Err(AttributeError::AmbiguousOperator { name, .. }) if name == "size"
        ));
        // 单个运算符仍然有效
        assert!(Predicate::from_json(&json!({"size": {"$lt": 5}})).is_ok());
    }
}
