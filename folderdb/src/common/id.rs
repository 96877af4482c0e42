use std::fmt;
use std::str::FromStr;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A type-safe wrapper around the 128-bit identifier of a stored file.
///
/// The identifier is handed out by the attribute index when a file is created
/// and doubles as the stem of the blob's on-disk name. It is rendered as 32
/// lowercase hex characters everywhere it leaves memory (display, JSON, SQL).
//
// // 文件标识符的类型安全包装器。它同时也是磁盘上 blob 文件名的主干部分。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId([u8; 16]);

/// Errors that can occur while parsing a `FileId` string.
#[derive(Debug, thiserror::Error)]
pub enum IdParseError {
    #[error("Invalid identifier length: expected 32, got {0}")]
    InvalidLength(usize),
    #[error("Hex decoding error: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl FileId {
    /// Length of the raw identifier in bytes.
    pub const BYTE_LEN: usize = 16;
    /// Length of the hex rendering.
    pub const HEX_LEN: usize = 32;

    /// Creates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().into_bytes())
    }

    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, IdParseError> {
        if s.len() != Self::HEX_LEN {
            return Err(IdParseError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 16]> for FileId {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for FileId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// --- Serde (JSON) ---

impl Serialize for FileId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FileId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FileIdVisitor;

        impl<'de> serde::de::Visitor<'de> for FileIdVisitor {
            type Value = FileId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a 32-character hex identifier")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                FileId::from_str(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(FileIdVisitor)
    }
}

// --- rusqlite ---

/// 存储到数据库时，编码为 TEXT (hex 字符串)
impl ToSql for FileId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Owned(Value::Text(self.to_hex())))
    }
}

impl FromSql for FileId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|s| FileId::from_str(s).map_err(|e| FromSqlError::Other(Box::new(e))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_hex_roundtrip() {
        let id = FileId::new([
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77,
            0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF,
        ]);
        let hex = id.to_string();
        assert_eq!(hex, "00112233445566778899aabbccddeeff");
        assert_eq!(FileId::from_str(&hex).unwrap(), id);
    }

    #[test]
    fn test_generate_is_unique() {
        let a = FileId::generate();
        let b = FileId::generate();
        assert_ne!(a, b);
        assert_eq!(a.to_hex().len(), FileId::HEX_LEN);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(FileId::from_str("abc"), Err(IdParseError::InvalidLength(3))));
        let not_hex = "zz".repeat(16);
        assert!(matches!(FileId::from_str(&not_hex), Err(IdParseError::Hex(_))));
    }

    #[test]
    fn test_serde_json_is_plain_string() {
        let id = FileId::new([7; 16]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let back: FileId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_rusqlite_text_roundtrip() {
        let id = FileId::new([123; 16]);
        let text = match id.to_sql().unwrap() {
            ToSqlOutput::Owned(Value::Text(t)) => t,
            _ => panic!("Should serialize to Text"),
        };
        let recovered = FileId::column_result(ValueRef::Text(text.as_bytes())).unwrap();
        assert_eq!(recovered, id);
    }
}
