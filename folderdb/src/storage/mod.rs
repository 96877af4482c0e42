pub mod local;

use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};

pub use local::LocalBlobStore;

/// Text decoding applied by [`BlobStore::read_file`] callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
}

/// Options for reading a blob back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// When set, the contents are decoded into text.
    pub encoding: Option<Encoding>,
}

impl ReadOptions {
    pub fn utf8() -> Self {
        Self { encoding: Some(Encoding::Utf8) }
    }
}

/// Blob contents as returned by a read, raw or decoded according to [`ReadOptions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContents {
    Bytes(Vec<u8>),
    Text(String),
}

impl FileContents {
    /// Applies the requested decoding to raw bytes.
    pub fn decode(bytes: Vec<u8>, options: &ReadOptions) -> io::Result<Self> {
        match options.encoding {
            None => Ok(FileContents::Bytes(bytes)),
            Some(Encoding::Utf8) => String::from_utf8(bytes)
                .map(FileContents::Text)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContents::Bytes(b) => b,
            FileContents::Text(t) => t.as_bytes(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            FileContents::Bytes(b) => b,
            FileContents::Text(t) => t.into_bytes(),
        }
    }
}

/// Blob store trait.
///
/// The raw-bytes half of a folder. It knows nothing about records; the folder
/// decides every path it is asked to touch.
//
// // 存储后端特征：定义了底层的 IO 操作，解耦了业务逻辑与物理存储。
pub trait BlobStore: Send + Sync + Debug {
    /// Moves a file into place. `dest` is overwritten if it exists.
    /// On failure `source` is still in place and nothing new is left at `dest`.
    fn move_file(&self, source: &Path, dest: &Path) -> io::Result<()>;

    /// Removes a file. A file that does not exist counts as removed.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Reads the whole file.
    fn read_file(&self, path: &Path, options: &ReadOptions) -> io::Result<FileContents>;

    /// Creates the directory and its parents if missing.
    fn ensure_dir(&self, path: &Path) -> io::Result<()>;

    /// Lists the regular files directly inside a directory.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}
