use std::path::Path;
use crate::common::attribute::{AttributeInput, validate_attributes};
use crate::common::id::FileId;
use crate::file::{FileRecord, extension_of};
use crate::folder::normalize::normalize;
use crate::folder::{ConsistencyGap, FolderError, FolderStore, GapKind};

/// Base name of a source path, rejecting paths without a UTF-8 file name.
pub(crate) fn source_file_name(source: &Path) -> Result<String, FolderError> {
    source
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FolderError::InvalidFileName(source.to_path_buf()))
}

/// Moves a file into the folder and records it in the index.
///
/// This process includes:
/// 1. Deriving the name and extension from `source`.
/// 2. Validating the attributes, then obtaining a fresh identifier from the index.
/// 3. Moving the blob to `<folder>/<id><ext>`. If this fails nothing was changed.
/// 4. Inserting the record. If this fails the moved blob is left behind and a
///    [`GapKind::OrphanedBlob`] gap is returned.
pub(crate) fn store_file(
    folder: &FolderStore,
    source: &Path,
    input: AttributeInput,
) -> Result<FileId, FolderError> {
    // 1. 确定文件名和扩展名
    let name = source_file_name(source)?;
    let extension = extension_of(&name);

    // 2. 在改动任何状态之前校验属性
    let attributes = normalize(input);
    validate_attributes(&attributes)?;

    let id = folder.index.new_identifier();

    // 3. 先移动 blob，失败则不写索引
    let dest = folder.blob_path(&id, &extension);
    folder.blobs.move_file(source, &dest)?;

    // 4. 写入索引记录
    let record = FileRecord {
        id,
        folder: folder.name.clone(),
        name,
        attributes,
    };
    let id = folder
        .index
        .insert(&record)
        .map_err(|e| ConsistencyGap::report(id, GapKind::OrphanedBlob, dest, e.into()))?;

    tracing::debug!(folder = %folder.name, id = %id, name = %record.name, "Stored file");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_source_file_name() {
        assert_eq!(source_file_name(Path::new("/tmp/a/report.txt")).unwrap(), "report.txt");
        assert_eq!(source_file_name(Path::new("plain")).unwrap(), "plain");
        assert!(matches!(
            source_file_name(Path::new("/")),
            Err(FolderError::InvalidFileName(p)) if p == PathBuf::from("/")
        ));
        assert!(source_file_name(Path::new("dir/..")).is_err());
    }
}
