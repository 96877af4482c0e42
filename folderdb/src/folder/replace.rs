use std::path::Path;
use crate::common::id::FileId;
use crate::file::{FileRecord, extension_of};
use crate::folder::store::source_file_name;
use crate::folder::{ConsistencyGap, FolderError, FolderStore, GapKind};
use crate::index::RecordPatch;

/// Swaps the blob behind an existing record for a new file.
///
/// The identifier and attributes stay; the record's `name` (and with it the
/// blob's extension) follows the new file.
///
/// 1. Look up the record (`NotFound` if absent).
/// 2. Remove the old blob. If this fails nothing was changed.
/// 3. Move the new blob into place. If this fails the record points at a blob
///    that no longer exists ([`GapKind::MissingBlob`]).
/// 4. Update the record's name. If this fails the new blob sits under a name
///    the record does not describe ([`GapKind::StaleRecord`]).
pub(crate) fn replace_file(
    folder: &FolderStore,
    id: &FileId,
    source: &Path,
) -> Result<FileRecord, FolderError> {
    let name = source_file_name(source)?;

    // 1. 查找现有记录
    let existing = folder
        .index
        .find_by_id(id)?
        .ok_or(FolderError::NotFound(*id))?;

    let old_path = folder.blob_path(id, &existing.extension());
    let new_path = folder.blob_path(id, &extension_of(&name));

    // 2. 删除旧 blob
    folder.blobs.remove_file(&old_path)?;

    // 3. 移入新 blob
    if let Err(e) = folder.blobs.move_file(source, &new_path) {
        return Err(ConsistencyGap::report(*id, GapKind::MissingBlob, old_path, e.into()));
    }

    // 4. 只更新文件名
    let patch = RecordPatch {
        name: Some(name),
        attributes: None,
    };
    match folder.index.update_by_id(id, &patch) {
        Ok(Some(record)) => {
            tracing::debug!(folder = %folder.name, id = %id, name = %record.name, "Replaced file");
            Ok(record)
        }
        // 记录在中途被删除，新 blob 无人引用
        Ok(None) => Err(ConsistencyGap::report(
            *id,
            GapKind::OrphanedBlob,
            new_path,
            FolderError::NotFound(*id),
        )),
        Err(e) => Err(ConsistencyGap::report(*id, GapKind::StaleRecord, new_path, e.into())),
    }
}
