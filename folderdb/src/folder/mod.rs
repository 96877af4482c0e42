mod attributes;
mod config;
mod error;
mod normalize;
mod open;
mod query;
mod read;
mod reconcile;
mod remove;
mod replace;
mod store;
mod update;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::common::attribute::AttributeInput;
use crate::common::id::FileId;
use crate::file::{FileRecord, blob_file_name};
use crate::index::AttributeIndex;
use crate::storage::{BlobStore, FileContents, ReadOptions};

pub use config::{FolderConfig, IndexConfig};
pub use error::{ConsistencyGap, FolderError, GapKind};
pub use normalize::normalize;
pub use open::OpenError;
pub use query::{Condition, Predicate, QueryOptions, translate};
pub use reconcile::ReconcileReport;

/// Represents a folder: a directory of blobs plus the index records describing them.
///
/// Every operation that touches both sides follows a fixed order and reports a
/// [`ConsistencyGap`] when the second step fails after the first succeeded.
/// Nothing is rolled back.
///
/// Concurrency: `FolderStore` is `Send + Sync` and cheap to clone. Reads may run
/// concurrently with anything. Writes to the same identifier must be serialized
/// by the caller; the store does not lock per file.
//
// // 代表一个文件夹：一个存放 blob 的目录以及描述它们的索引记录。
// // 同时涉及两边的操作按固定顺序执行，第二步失败时返回 `ConsistencyGap`，不做回滚。
// // 并发：读操作可以并发；对同一标识符的写操作需由调用方串行化。
#[derive(Debug, Clone)]
pub struct FolderStore {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    pub(crate) index: Arc<dyn AttributeIndex>,
    pub(crate) blobs: Arc<dyn BlobStore>,
}

impl FolderStore {
    /// Opens a folder from its configuration, creating the blob directory and
    /// the index database if they do not exist yet.
    //
    // // 根据配置打开文件夹，必要时创建 blob 目录和索引数据库。
    pub fn open(config: &FolderConfig) -> Result<Self, OpenError> {
        open::open_folder(config)
    }

    /// Opens the folder described by a JSON configuration file.
    pub fn open_config_file(config_path: &Path) -> Result<Self, OpenError> {
        Self::open(&FolderConfig::load(config_path)?)
    }

    /// Assembles a folder from explicit collaborators. The blob directory is
    /// created if missing.
    //
    // // 使用给定的协作方组装文件夹。blob 目录不存在时会被创建。
    pub fn with_backends(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        index: Arc<dyn AttributeIndex>,
        blobs: Arc<dyn BlobStore>,
    ) -> Result<Self, FolderError> {
        let path = path.into();
        blobs.ensure_dir(&path)?;
        Ok(Self {
            name: name.into(),
            path,
            index,
            blobs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<folder path>/<id><extension>`
    pub(crate) fn blob_path(&self, id: &FileId, extension: &str) -> PathBuf {
        self.path.join(blob_file_name(id, extension))
    }

    /// Moves `source` into the folder and records it with `attributes`.
    ///
    /// `attributes` may be a map, a list of maps (merged, later entries win)
    /// or nothing.
    ///
    /// # Errors
    /// `Attributes` for an empty attribute name or a non-finite number,
    /// `Storage` if the move fails (nothing changed in either case), or a
    /// [`GapKind::OrphanedBlob`] gap if the record could not be inserted.
    //
    // // 将 `source` 移入文件夹并记录其属性。
    pub fn store(
        &self,
        source: &Path,
        attributes: impl Into<AttributeInput>,
    ) -> Result<FileId, FolderError> {
        store::store_file(self, source, attributes.into())
    }

    /// Replaces the blob of `id` with `source`, keeping identifier and attributes.
    /// Returns the updated record.
    //
    // // 用 `source` 替换 `id` 对应的 blob，保留标识符和属性。
    pub fn replace(&self, id: &FileId, source: &Path) -> Result<FileRecord, FolderError> {
        replace::replace_file(self, id, source)
    }

    /// Replaces the attributes of `id` wholesale. The previous mapping is not merged.
    //
    // // 整体替换 `id` 的属性，不与原有属性合并。
    pub fn update(
        &self,
        id: &FileId,
        attributes: impl Into<AttributeInput>,
    ) -> Result<FileRecord, FolderError> {
        update::update_attributes(self, id, attributes.into())
    }

    /// Removes the record, then the blob.
    //
    // // 先删除记录，再删除 blob。
    pub fn delete(&self, id: &FileId) -> Result<(), FolderError> {
        remove::delete_file(self, id)
    }

    pub fn find(&self, id: &FileId) -> Result<FileRecord, FolderError> {
        read::find_file(self, id)
    }

    /// Records matching every condition of `predicate`, in insertion order.
    /// Without options at most 100 records are returned, and never more than
    /// 1000 whatever the caller asks for.
    //
    // // 返回满足全部条件的记录，按插入顺序。未指定选项时最多返回 100 条，任何情况下不超过 1000 条。
    pub fn query(
        &self,
        predicate: &Predicate,
        options: Option<QueryOptions>,
    ) -> Result<Vec<FileRecord>, FolderError> {
        query::query_files(self, predicate, options.as_ref())
    }

    /// Reads the blob of `id` and returns it with its record.
    //
    // // 读取 `id` 的 blob 内容并连同记录一起返回。
    pub fn read(
        &self,
        id: &FileId,
        options: &ReadOptions,
    ) -> Result<(FileContents, FileRecord), FolderError> {
        read::read_file(self, id, options)
    }

    /// Distinct attribute names used by records of this folder.
    //
    // // 返回本文件夹记录中使用过的全部属性名 (去重)。
    pub fn list_attribute_names(&self) -> Result<Vec<String>, FolderError> {
        attributes::list_attribute_names(self)
    }

    /// Compares the blob directory with the index without changing either.
    //
    // // 比较 blob 目录与索引，不修改任何一方。
    pub fn reconcile(&self) -> Result<ReconcileReport, FolderError> {
        reconcile::reconcile_folder(self)
    }
}
