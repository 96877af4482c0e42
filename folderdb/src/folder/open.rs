use std::fs;
use std::sync::Arc;
use crate::folder::{FolderConfig, FolderStore};
use crate::index::{IndexError, SqliteIndex};
use crate::storage::{BlobStore, LocalBlobStore};

/// Defines errors that can occur when opening a folder from its configuration.
//
// // 定义根据配置打开文件夹时可能发生的错误。
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// An I/O error occurred while reading the configuration or creating directories.
    //
    // // 读取配置或创建目录时发生 I/O 错误。
    #[error("I/O error while opening folder: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    //
    // // 解析配置文件失败。
    #[error("Failed to parse configuration file: {0}")]
    ConfigParseError(#[from] serde_json::Error),

    /// The configuration parsed but is not usable.
    //
    // // 配置可以解析但无法使用。
    #[error("Invalid folder configuration: {0}")]
    InvalidConfig(String),

    /// Failed to open or initialize the attribute index.
    //
    // // 打开或初始化属性索引失败。
    #[error("Failed to open attribute index: {0}")]
    IndexOpenError(#[from] IndexError),
}

/// Opens the folder described by `config` on the local filesystem and a SQLite index.
pub(crate) fn open_folder(config: &FolderConfig) -> Result<FolderStore, OpenError> {
    config.validate()?;

    // 1. 确保 blob 目录存在
    let blobs = LocalBlobStore::new();
    blobs.ensure_dir(&config.path)?;

    // 2. 确保数据库所在目录存在，然后打开索引
    if let Some(parent) = config.index.database.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let index = SqliteIndex::open(&config.index.database, &config.index.collection_prefix)?;

    tracing::debug!(
        folder = %config.name,
        path = %config.path.display(),
        scope = %config.index.collection_prefix,
        "Opened folder"
    );

    Ok(FolderStore {
        name: config.name.clone(),
        path: config.path.clone(),
        index: Arc::new(index),
        blobs: Arc::new(blobs),
    })
}
