use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::common::attribute::AttributeMap;
use crate::common::id::FileId;

/// Represents a record of a file stored in a folder.
///
/// The blob itself lives at `<folder path>/<id><extension>`; the extension is
/// never stored separately but derived from `name` whenever the blob has to be
/// located.
//
// // 代表存储在文件夹中的文件记录。blob 位于 `<文件夹路径>/<id><扩展名>`，
// // 扩展名不单独存储，而是每次从 `name` 推导。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Identifier handed out by the attribute index; also the blob's file stem.
    pub id: FileId,
    /// Name of the owning folder.
    pub folder: String,
    /// Original base name supplied when the file was stored or last replaced.
    pub name: String,
    /// Canonical attribute mapping.
    pub attributes: AttributeMap,
}

impl FileRecord {
    /// Extension (with leading dot) derived from the stored name, or "" when there is none.
    pub fn extension(&self) -> String {
        extension_of(&self.name)
    }

    /// File name of the blob inside the folder directory.
    pub fn blob_file_name(&self) -> String {
        blob_file_name(&self.id, &self.extension())
    }
}

/// Returns the extension of a file name including the leading dot.
///
/// - "report.txt" -> ".txt"
/// - "archive.tar.gz" -> ".gz"
/// - "Makefile" -> ""
/// - ".bashrc" -> ""
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// `<id><extension>`
pub fn blob_file_name(id: &FileId, extension: &str) -> String {
    format!("{}{}", id, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("report.txt"), ".txt");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("Makefile"), "");
        assert_eq!(extension_of(".bashrc"), "");
        assert_eq!(extension_of(""), "");
    }

    #[test]
    fn test_blob_file_name_uses_name_extension() {
        let record = FileRecord {
            id: FileId::new([0xAB; 16]),
            folder: "docs".to_string(),
            name: "photo.JPG".to_string(),
            attributes: AttributeMap::new(),
        };
        assert_eq!(record.blob_file_name(), format!("{}.JPG", "ab".repeat(16)));
    }
}
