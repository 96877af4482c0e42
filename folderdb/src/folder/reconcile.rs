use std::collections::BTreeSet;
use std::path::PathBuf;
use crate::common::constants::DEFAULT_QUERY_LIMIT;
use crate::common::id::FileId;
use crate::file::FileRecord;
use crate::folder::{FolderError, FolderStore};
use crate::index::IndexFilter;

/// Differences found between the folder directory and the index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Blobs named like `<id><ext>` with no record describing them.
    pub orphaned_blobs: Vec<PathBuf>,
    /// Records whose blob is not in the directory.
    pub missing_blobs: Vec<FileRecord>,
}

impl ReconcileReport {
    pub fn is_consistent(&self) -> bool {
        self.orphaned_blobs.is_empty() && self.missing_blobs.is_empty()
    }
}

/// Whether a directory entry is named like a blob, i.e. starts with a hex identifier.
fn is_blob_name(file_name: &str) -> bool {
    file_name
        .get(..FileId::HEX_LEN)
        .is_some_and(|stem| stem.parse::<FileId>().is_ok())
}

/// Compares the folder directory against the records in this folder. Read-only.
pub(crate) fn reconcile_folder(folder: &FolderStore) -> Result<ReconcileReport, FolderError> {
    // 1. 分页读取本文件夹的全部记录
    let filter = IndexFilter::folder(&folder.name);
    let mut records = Vec::new();
    loop {
        let page = folder.index.find(&filter, records.len(), DEFAULT_QUERY_LIMIT)?;
        let done = page.len() < DEFAULT_QUERY_LIMIT;
        records.extend(page);
        if done {
            break;
        }
    }

    // 2. 列出目录中形如 blob 的文件
    let on_disk: BTreeSet<PathBuf> = folder
        .blobs
        .list_dir(&folder.path)?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(is_blob_name)
        })
        .collect();

    // 3. 两边对比
    let mut expected = BTreeSet::new();
    let mut report = ReconcileReport::default();
    for record in records {
        let path = folder.path.join(record.blob_file_name());
        if on_disk.contains(&path) {
            expected.insert(path);
        } else {
            report.missing_blobs.push(record);
        }
    }
    report.orphaned_blobs = on_disk.difference(&expected).cloned().collect();

    if report.is_consistent() {
        tracing::debug!(folder = %folder.name, "Folder is consistent");
    } else {
        tracing::warn!(
            folder = %folder.name,
            orphaned = report.orphaned_blobs.len(),
            missing = report.missing_blobs.len(),
            "Folder and index disagree"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blob_name() {
        let id = FileId::new([0x1f; 16]);
        assert!(is_blob_name(&format!("{}.txt", id)));
        assert!(is_blob_name(&id.to_hex()));
        assert!(!is_blob_name("notes.txt"));
        assert!(!is_blob_name("index.sqlite"));
        assert!(!is_blob_name(&format!("{}é", "0".repeat(31))));
    }
}
