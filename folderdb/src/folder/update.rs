use crate::common::attribute::{AttributeInput, validate_attributes};
use crate::common::id::FileId;
use crate::file::FileRecord;
use crate::folder::normalize::normalize;
use crate::folder::{FolderError, FolderStore};
use crate::index::RecordPatch;

/// Replaces a record's attributes wholesale. Keys absent from `input` are dropped.
/// The blob is not touched. Empty names and non-finite numbers are rejected
/// before the index is called.
pub(crate) fn update_attributes(
    folder: &FolderStore,
    id: &FileId,
    input: AttributeInput,
) -> Result<FileRecord, FolderError> {
    let attributes = normalize(input);
    validate_attributes(&attributes)?;
    let patch = RecordPatch {
        name: None,
        attributes: Some(attributes),
    };
    let record = folder
        .index
        .update_by_id(id, &patch)?
        .ok_or(FolderError::NotFound(*id))?;

    tracing::debug!(
        folder = %folder.name,
        id = %id,
        attributes = record.attributes.len(),
        "Updated attributes"
    );
    Ok(record)
}
