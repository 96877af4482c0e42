use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use super::{BlobStore, FileContents, ReadOptions};

/// Blob store backed by the local filesystem.
#[derive(Debug, Default, Clone)]
pub struct LocalBlobStore;

impl LocalBlobStore {
    pub fn new() -> Self {
        Self
    }
}

impl BlobStore for LocalBlobStore {
    fn move_file(&self, source: &Path, dest: &Path) -> io::Result<()> {
        match fs::rename(source, dest) {
            Ok(()) => Ok(()),
            // rename 不能跨文件系统；源文件仍在时退回到 复制 + 删除
            Err(rename_err) if source.is_file() && dest.parent().is_some_and(Path::is_dir) => {
                tracing::debug!(
                    source = %source.display(),
                    dest = %dest.display(),
                    error = %rename_err,
                    "Rename refused, falling back to copy"
                );
                copy_then_remove(source, dest, |path| fs::remove_file(path))
            }
            Err(e) => Err(e),
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn read_file(&self, path: &Path, options: &ReadOptions) -> io::Result<FileContents> {
        FileContents::decode(fs::read(path)?, options)
    }

    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Copies `source` to `dest`, then removes `source` with `remove_source`.
///
/// If the source cannot be removed the copy at `dest` is deleted again, so a
/// failed move never leaves a second file behind.
fn copy_then_remove<F>(source: &Path, dest: &Path, remove_source: F) -> io::Result<()>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    fs::copy(source, dest)?;
    if let Err(e) = remove_source(source) {
        if let Err(cleanup) = fs::remove_file(dest) {
            tracing::warn!(
                dest = %dest.display(),
                error = %cleanup,
                "Failed to remove copy after source removal failed"
            );
        }
        return Err(e);
    }
    Ok(())
}
