use crate::common::id::FileId;
use crate::folder::{ConsistencyGap, FolderError, FolderStore, GapKind};

/// Deletes a file from the folder.
///
/// 此操作会：
/// 1. 从索引中删除记录 (不存在则返回 `NotFound`)。
/// 2. 删除磁盘上的 blob。若失败，blob 成为孤儿 ([`GapKind::OrphanedBlob`])。
pub(crate) fn delete_file(folder: &FolderStore, id: &FileId) -> Result<(), FolderError> {
    let record = folder
        .index
        .delete_by_id(id)?
        .ok_or(FolderError::NotFound(*id))?;

    let path = folder.blob_path(id, &record.extension());
    if let Err(e) = folder.blobs.remove_file(&path) {
        return Err(ConsistencyGap::report(*id, GapKind::OrphanedBlob, path, e.into()));
    }

    tracing::debug!(folder = %folder.name, id = %id, "Deleted file");
    Ok(())
}
