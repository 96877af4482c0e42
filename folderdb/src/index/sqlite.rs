use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use crate::common::attribute::{AttributeKind, AttributeMap, AttributeValue};
use crate::common::constants::{ATTRIBUTES_FIELD, FOLDER_FIELD, NAME_FIELD};
use crate::common::id::FileId;
use crate::file::FileRecord;
use crate::utils::time::{parse_rfc3339, to_sortable_rfc3339};
use super::{AttributeIndex, FieldCondition, IndexError, IndexFilter, MapFn, RecordPatch, ReduceFn};

const SCHEMA: &str = "PRAGMA foreign_keys = ON;

     CREATE TABLE IF NOT EXISTS files (
        id                  CHAR(32) PRIMARY KEY NOT NULL,
        scope               TEXT NOT NULL,
        folder              TEXT NOT NULL,
        name                TEXT NOT NULL
     );
     CREATE INDEX IF NOT EXISTS idx_files_scope ON files(scope, folder);

     CREATE TABLE IF NOT EXISTS attributes (
        id                  INTEGER PRIMARY KEY AUTOINCREMENT,
        file_id             CHAR(32) NOT NULL,
        attr_key            TEXT NOT NULL,
        attr_kind           TEXT NOT NULL,
        attr_value          NOT NULL,
        FOREIGN KEY (file_id) REFERENCES files(id) ON DELETE CASCADE
     );
     CREATE UNIQUE INDEX IF NOT EXISTS idx_attr_link ON attributes(file_id, attr_key);
     CREATE INDEX IF NOT EXISTS idx_attr_lookup ON attributes(attr_key, attr_kind, attr_value);

     CREATE TABLE IF NOT EXISTS aggregations (
        scope               TEXT NOT NULL,
        output              TEXT NOT NULL,
        agg_key             TEXT NOT NULL,
        agg_value           TEXT NOT NULL,
        PRIMARY KEY (scope, output, agg_key)
     );";

/// Attribute index stored in a SQLite database.
///
/// Every row carries the handle's scope, so several folders (or several
/// collection prefixes) can share one database file. Attributes live one per
/// row in `attributes`, typed by `attr_kind`; the untyped `attr_value` column
/// keeps numbers as REAL and strings/dates as TEXT, which is what makes range
/// filters on them work natively.
//
// // 基于 SQLite 的属性索引。每一行都带有作用域，属性按行存储并带有类型。
#[derive(Debug)]
pub struct SqliteIndex {
    connection: Mutex<Connection>,
    scope: String,
}

impl SqliteIndex {
    /// Opens (creating if necessary) the database file at `path` under `scope`.
    pub fn open(path: &Path, scope: &str) -> Result<Self, IndexError> {
        Self::from_connection(Connection::open(path)?, scope)
    }

    /// A private in-memory database, mostly for tests.
    pub fn open_in_memory(scope: &str) -> Result<Self, IndexError> {
        Self::from_connection(Connection::open_in_memory()?, scope)
    }

    pub fn from_connection(conn: Connection, scope: &str) -> Result<Self, IndexError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            connection: Mutex::new(conn),
            scope: scope.to_string(),
        })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, IndexError> {
        self.connection.lock().map_err(|_| IndexError::Poisoned)
    }
}

impl AttributeIndex for SqliteIndex {
    fn new_identifier(&self) -> FileId {
        FileId::generate()
    }

    fn insert(&self, record: &FileRecord) -> Result<FileId, IndexError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO files (id, scope, folder, name) VALUES (?1, ?2, ?3, ?4)",
            params![&record.id, &self.scope, &record.folder, &record.name],
        )?;
        insert_attributes(&tx, &record.id, &record.attributes)?;
        tx.commit()?;
        Ok(record.id)
    }

    fn find_by_id(&self, id: &FileId) -> Result<Option<FileRecord>, IndexError> {
        let conn = self.lock()?;
        fetch_record(&conn, &self.scope, id)
    }

    fn update_by_id(
        &self,
        id: &FileId,
        patch: &RecordPatch,
    ) -> Result<Option<FileRecord>, IndexError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let exists = tx
            .query_row(
                "SELECT 1 FROM files WHERE id = ?1 AND scope = ?2",
                params![id, &self.scope],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Ok(None);
        }

        if let Some(name) = &patch.name {
            tx.execute("UPDATE files SET name = ?1 WHERE id = ?2", params![name, id])?;
        }
        if let Some(attributes) = &patch.attributes {
            tx.execute("DELETE FROM attributes WHERE file_id = ?1", params![id])?;
            insert_attributes(&tx, id, attributes)?;
        }
        tx.commit()?;

        fetch_record(&conn, &self.scope, id)
    }

    fn delete_by_id(&self, id: &FileId) -> Result<Option<FileRecord>, IndexError> {
        let mut conn = self.lock()?;
        let Some(record) = fetch_record(&conn, &self.scope, id)? else {
            return Ok(None);
        };

        let tx = conn.transaction()?;
        tx.execute("DELETE FROM attributes WHERE file_id = ?1", params![id])?;
        tx.execute(
            "DELETE FROM files WHERE id = ?1 AND scope = ?2",
            params![id, &self.scope],
        )?;
        tx.commit()?;
        Ok(Some(record))
    }

    fn find(
        &self,
        filter: &IndexFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<FileRecord>, IndexError> {
        let conn = self.lock()?;
        select_records(&conn, &self.scope, filter, skip, limit)
    }

    fn run_aggregation(
        &self,
        map: &MapFn<'_>,
        reduce: &ReduceFn<'_>,
        output: &str,
    ) -> Result<(), IndexError> {
        let mut conn = self.lock()?;
        let records = select_records(&conn, &self.scope, &IndexFilter::new(), 0, usize::MAX)?;

        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for record in &records {
            for (key, value) in map(record) {
                groups.entry(key).or_default().push(value);
            }
        }

        // 输出集合每次整体替换
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM aggregations WHERE scope = ?1 AND output = ?2",
            params![&self.scope, output],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO aggregations (scope, output, agg_key, agg_value) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (key, values) in &groups {
                let reduced = reduce(key.as_str(), values.as_slice());
                stmt.execute(params![&self.scope, output, key, reduced])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn read_aggregation(&self, output: &str, key: &str) -> Result<Option<String>, IndexError> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT agg_value FROM aggregations WHERE scope = ?1 AND output = ?2 AND agg_key = ?3",
                params![&self.scope, output, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }
}

fn insert_attributes(
    conn: &Connection,
    id: &FileId,
    attributes: &AttributeMap,
) -> Result<(), IndexError> {
    let mut stmt = conn.prepare(
        "INSERT INTO attributes (file_id, attr_key, attr_kind, attr_value) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (key, value) in attributes {
        stmt.execute(params![id, key, value.kind().as_str(), value_to_sql(value)])?;
    }
    Ok(())
}

fn load_attributes(conn: &Connection, id: &FileId) -> Result<AttributeMap, IndexError> {
    let mut stmt =
        conn.prepare("SELECT attr_key, attr_kind, attr_value FROM attributes WHERE file_id = ?1")?;
    let rows = stmt
        .query_map(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Value>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(key, kind, raw)| Ok((key, value_from_sql(&kind, raw)?)))
        .collect()
}

fn fetch_record(
    conn: &Connection,
    scope: &str,
    id: &FileId,
) -> Result<Option<FileRecord>, IndexError> {
    let row = conn
        .query_row(
            "SELECT folder, name FROM files WHERE id = ?1 AND scope = ?2",
            params![id, scope],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;

    match row {
        Some((folder, name)) => Ok(Some(FileRecord {
            id: *id,
            folder,
            name,
            attributes: load_attributes(conn, id)?,
        })),
        None => Ok(None),
    }
}

fn select_records(
    conn: &Connection,
    scope: &str,
    filter: &IndexFilter,
    skip: usize,
    limit: usize,
) -> Result<Vec<FileRecord>, IndexError> {
    let mut sql = String::from("SELECT f.id, f.folder, f.name FROM files f WHERE f.scope = ?1");
    let mut args: Vec<Value> = vec![Value::Text(scope.to_string())];
    for condition in &filter.conditions {
        sql.push_str(" AND ");
        sql.push_str(&condition_sql(condition, &mut args)?);
    }
    args.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
    args.push(Value::Integer(i64::try_from(skip).unwrap_or(i64::MAX)));
    sql.push_str(&format!(
        " ORDER BY f.rowid LIMIT ?{} OFFSET ?{}",
        args.len() - 1,
        args.len()
    ));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            Ok((
                row.get::<_, FileId>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::with_capacity(rows.len());
    for (id, folder, name) in rows {
        let attributes = load_attributes(conn, &id)?;
        records.push(FileRecord { id, folder, name, attributes });
    }
    Ok(records)
}

/// Renders one condition as a SQL boolean expression, appending its parameters.
fn condition_sql(condition: &FieldCondition, args: &mut Vec<Value>) -> Result<String, IndexError> {
    let op = condition.op.as_sql();
    let attribute_prefix = format!("{}.", ATTRIBUTES_FIELD);

    if let Some(key) = condition.field.strip_prefix(attribute_prefix.as_str()) {
        args.push(Value::Text(key.to_string()));
        let key_idx = args.len();
        args.push(Value::Text(condition.value.kind().as_str().to_string()));
        let kind_idx = args.len();
        args.push(value_to_sql(&condition.value));
        let value_idx = args.len();
        return Ok(format!(
            "EXISTS (SELECT 1 FROM attributes a WHERE a.file_id = f.id \
             AND a.attr_key = ?{key_idx} AND a.attr_kind = ?{kind_idx} AND a.attr_value {op} ?{value_idx})"
        ));
    }

    let column = match condition.field.as_str() {
        FOLDER_FIELD => "f.folder",
        NAME_FIELD => "f.name",
        other => return Err(IndexError::UnsupportedField(other.to_string())),
    };
    match &condition.value {
        AttributeValue::String(s) => {
            args.push(Value::Text(s.clone()));
            Ok(format!("{column} {op} ?{}", args.len()))
        }
        // folder / name 只保存字符串，其他类型永远不匹配
        _ => Ok("0".to_string()),
    }
}

fn value_to_sql(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::String(s) => Value::Text(s.clone()),
        AttributeValue::Number(n) => Value::Real(*n),
        AttributeValue::Date(dt) => Value::Text(to_sortable_rfc3339(dt)),
    }
}

fn value_from_sql(kind: &str, raw: Value) -> Result<AttributeValue, IndexError> {
    match (AttributeKind::parse(kind), raw) {
        (Some(AttributeKind::String), Value::Text(s)) => Ok(AttributeValue::String(s)),
        (Some(AttributeKind::Number), Value::Real(n)) => Ok(AttributeValue::Number(n)),
        (Some(AttributeKind::Number), Value::Integer(n)) => Ok(AttributeValue::Number(n as f64)),
        (Some(AttributeKind::Date), Value::Text(s)) => parse_rfc3339(&s)
            .map(AttributeValue::Date)
            .map_err(|e| IndexError::CorruptValue(format!("date '{}': {}", s, e))),
        (_, other) => Err(IndexError::CorruptValue(format!(
            "attribute of kind '{}' holds {:?}",
            kind, other
        ))),
    }
}
