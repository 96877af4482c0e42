use crate::common::id::FileId;
use crate::file::FileRecord;
use crate::folder::{FolderError, FolderStore};
use crate::storage::{FileContents, ReadOptions};

pub(crate) fn find_file(folder: &FolderStore, id: &FileId) -> Result<FileRecord, FolderError> {
    folder
        .index
        .find_by_id(id)?
        .ok_or(FolderError::NotFound(*id))
}

/// Looks the record up and reads its blob, located through the extension of
/// the record's stored name.
pub(crate) fn read_file(
    folder: &FolderStore,
    id: &FileId,
    options: &ReadOptions,
) -> Result<(FileContents, FileRecord), FolderError> {
    let record = find_file(folder, id)?;
    let path = folder.blob_path(id, &record.extension());
    let contents = folder.blobs.read_file(&path, options)?;
    Ok((contents, record))
}
