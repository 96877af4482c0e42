pub mod sqlite;

use std::fmt::Debug;
use crate::common::attribute::{AttributeMap, AttributeValue};
use crate::common::constants::{ATTRIBUTES_FIELD, FOLDER_FIELD};
use crate::common::id::FileId;
use crate::file::FileRecord;

pub use sqlite::SqliteIndex;

/// Defines errors raised by an attribute index.
//
// // 定义属性索引可能返回的错误。
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// An error occurred while interacting with the database.
    //
    // // 与数据库交互时发生错误。
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// A stored value could not be decoded.
    //
    // // 存储的值无法解码。
    #[error("Corrupt value in index: {0}")]
    CorruptValue(String),

    /// A filter referenced a field the index does not know.
    //
    // // 过滤条件引用了索引不认识的字段。
    #[error("Unsupported filter field: {0}")]
    UnsupportedField(String),

    /// A previous holder of the index handle panicked.
    #[error("Index handle poisoned by a panicked writer")]
    Poisoned,
}

/// Comparison operators understood by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Comparison {
    /// Maps a `$lt`-style operator to a range comparison. Anything else is `None`.
    pub fn from_operator(op: &str) -> Option<Self> {
        match op {
            "$lt" => Some(Comparison::Lt),
            "$lte" => Some(Comparison::Lte),
            "$gt" => Some(Comparison::Gt),
            "$gte" => Some(Comparison::Gte),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
        }
    }
}

/// One `field <op> value` clause of an [`IndexFilter`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCondition {
    /// Dotted field path: `folder`, `name` or `attributes.<name>`.
    pub field: String,
    pub op: Comparison,
    pub value: AttributeValue,
}

impl FieldCondition {
    pub fn new(field: impl Into<String>, op: Comparison, value: AttributeValue) -> Self {
        Self { field: field.into(), op, value }
    }

    /// A condition on `attributes.<name>`.
    pub fn attribute(name: &str, op: Comparison, value: AttributeValue) -> Self {
        Self::new(format!("{}.{}", ATTRIBUTES_FIELD, name), op, value)
    }
}

/// The index's native filter: a conjunction of field conditions.
/// The empty filter matches every record in scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexFilter {
    pub conditions: Vec<FieldCondition>,
}

impl IndexFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, condition: FieldCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Matches the records of one folder.
    pub fn folder(name: &str) -> Self {
        Self::new().and(FieldCondition::new(FOLDER_FIELD, Comparison::Eq, name.into()))
    }
}

/// Fields replaced by [`AttributeIndex::update_by_id`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub name: Option<String>,
    /// Replaces the whole attribute mapping, never merges.
    pub attributes: Option<AttributeMap>,
}

/// Map step of an aggregation: emits `(key, value)` pairs for one record.
pub type MapFn<'a> = dyn Fn(&FileRecord) -> Vec<(String, String)> + 'a;

/// Reduce step of an aggregation: folds every value emitted under one key.
pub type ReduceFn<'a> = dyn Fn(&str, &[String]) -> String + 'a;

/// The structured half of a folder: one record per stored file.
///
/// An index handle is bound to a scope (a collection prefix); records and
/// aggregation outputs written through one scope are invisible to another.
//
// // 属性索引特征。每个句柄绑定一个作用域（集合前缀）。
pub trait AttributeIndex: Send + Sync + Debug {
    /// Hands out a fresh identifier for a record about to be created.
    fn new_identifier(&self) -> FileId;

    fn insert(&self, record: &FileRecord) -> Result<FileId, IndexError>;

    fn find_by_id(&self, id: &FileId) -> Result<Option<FileRecord>, IndexError>;

    /// Applies the patch and returns the updated record, or `None` when absent.
    fn update_by_id(&self, id: &FileId, patch: &RecordPatch)
    -> Result<Option<FileRecord>, IndexError>;

    /// Removes the record and returns what was removed, or `None` when absent.
    fn delete_by_id(&self, id: &FileId) -> Result<Option<FileRecord>, IndexError>;

    /// Records matching the filter in insertion order, after skipping `skip` and
    /// returning at most `limit`.
    fn find(&self, filter: &IndexFilter, skip: usize, limit: usize)
    -> Result<Vec<FileRecord>, IndexError>;

    /// Runs `map` over every record in scope, groups the emissions by key,
    /// folds each group with `reduce` and replaces the `output` collection with
    /// the results.
    fn run_aggregation(
        &self,
        map: &MapFn<'_>,
        reduce: &ReduceFn<'_>,
        output: &str,
    ) -> Result<(), IndexError>;

    /// Reads one value of an aggregation output collection.
    fn read_aggregation(&self, output: &str, key: &str) -> Result<Option<String>, IndexError>;
}
