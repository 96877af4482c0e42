#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use folderdb::index::SqliteIndex;
use folderdb::storage::LocalBlobStore;
use folderdb::{AttributeMap, AttributeValue, FolderStore};
use tempfile::TempDir;

/// 辅助函数：在临时目录中创建一个文件夹，使用内存 SQLite 索引和本地 blob 存储。
///
/// blob 目录为 `<tmp>/folder`，源文件应创建在 `<tmp>` 根目录下，避免混入 blob 目录。
pub fn setup_folder(dir: &TempDir) -> FolderStore {
    setup_named_folder(dir, "myFolder", "myfolder")
}

pub fn setup_named_folder(dir: &TempDir, name: &str, scope: &str) -> FolderStore {
    let index = SqliteIndex::open_in_memory(scope).unwrap();
    FolderStore::with_backends(
        name,
        dir.path().join(name),
        Arc::new(index),
        Arc::new(LocalBlobStore::new()),
    )
    .unwrap()
}

/// 辅助函数：在临时目录中创建一个具有特定内容的虚拟文件。
pub fn create_dummy_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(name);
    fs::write(&file_path, content).unwrap();
    file_path
}

/// 辅助函数：由键值对构造属性映射。
pub fn attrs(pairs: &[(&str, AttributeValue)]) -> AttributeMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Blob 文件在文件夹目录中的实际路径。
pub fn blob_path(folder: &FolderStore, record: &folderdb::FileRecord) -> PathBuf {
    folder.path().join(record.blob_file_name())
}
