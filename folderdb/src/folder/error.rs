use std::fmt;
use std::path::PathBuf;
use crate::common::attribute::AttributeError;
use crate::common::id::FileId;
use crate::index::IndexError;

/// Defines errors returned by folder operations.
///
/// `NotFound` means the identifier has no record; `Storage` and `Index` mean a
/// collaborator failed before anything was changed; `ConsistencyGap` means the
/// first half of a two-step operation went through and the second did not.
//
// // 定义文件夹操作返回的错误。`NotFound` 表示记录不存在，`Storage`/`Index`
// // 表示协作方失败且尚未修改任何状态，`ConsistencyGap` 表示两步操作只完成了一半。
#[derive(Debug, thiserror::Error)]
pub enum FolderError {
    /// The identifier has no record in the attribute index.
    //
    // // 属性索引中没有该标识符的记录。
    #[error("File with id '{0}' not found.")]
    NotFound(FileId),

    /// The source path has no usable (UTF-8, non-empty) file name.
    //
    // // 源路径没有可用的文件名。
    #[error("Source path has no usable file name: {}", .0.display())]
    InvalidFileName(PathBuf),

    /// The blob store failed.
    //
    // // 存储后端失败。
    #[error("Blob storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The attribute index failed.
    //
    // // 属性索引失败。
    #[error("Attribute index error: {0}")]
    Index(#[from] IndexError),

    /// Attribute or predicate input could not be interpreted.
    //
    // // 无法解析属性或查询条件输入。
    #[error("Invalid attributes: {0}")]
    Attributes(#[from] AttributeError),

    /// Blob and record are out of sync; see [`ConsistencyGap`].
    //
    // // blob 与索引记录不一致。
    #[error(transparent)]
    ConsistencyGap(#[from] ConsistencyGap),
}

impl FolderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FolderError::NotFound(_))
    }

    pub fn consistency_gap(&self) -> Option<&ConsistencyGap> {
        match self {
            FolderError::ConsistencyGap(gap) => Some(gap),
            _ => None,
        }
    }
}

/// Which side of the folder was left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
    /// A blob exists at `path` but no record points at it.
    OrphanedBlob,
    /// The record exists but its blob at `path` is gone.
    MissingBlob,
    /// The blob at `path` was replaced but the record still carries the old name.
    StaleRecord,
}

impl fmt::Display for GapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GapKind::OrphanedBlob => "orphaned blob",
            GapKind::MissingBlob => "missing blob",
            GapKind::StaleRecord => "stale record",
        })
    }
}

/// A partially applied operation. Nothing is rolled back; the gap carries
/// enough to repair it by hand or with [`crate::folder::FolderStore::reconcile`].
#[derive(Debug, thiserror::Error)]
#[error("Consistency gap ({kind}) for file '{id}' at {}: {cause}", .path.display())]
pub struct ConsistencyGap {
    pub id: FileId,
    pub kind: GapKind,
    /// The blob path the gap concerns.
    pub path: PathBuf,
    /// The failure that interrupted the operation.
    #[source]
    pub cause: Box<FolderError>,
}

impl ConsistencyGap {
    /// Builds the error and emits a warning so the gap is visible even if the
    /// caller drops the error.
    pub(crate) fn report(id: FileId, kind: GapKind, path: PathBuf, cause: FolderError) -> FolderError {
        tracing::warn!(
            id = %id,
            kind = %kind,
            path = %path.display(),
            error = %cause,
            "Blob and index record are out of sync"
        );
        FolderError::ConsistencyGap(ConsistencyGap {
            id,
            kind,
            path,
            cause: Box::new(cause),
        })
    }
}
