//! A file-blob store backed by a directory, paired with an attribute index.
//!
//! Each stored file is moved into the folder's directory as
//! `<identifier><extension>` and described by a [`file::FileRecord`] in an
//! [`index::AttributeIndex`]. Records carry arbitrary scalar attributes that can
//! be queried with range predicates and enumerated per folder.
//!
//! The entry point is [`folder::FolderStore`].

pub mod common;
pub mod file;
pub mod folder;
pub mod index;
pub mod storage;
mod utils;

pub use common::attribute::{AttributeError, AttributeInput, AttributeMap, AttributeValue};
pub use common::id::FileId;
pub use file::FileRecord;
pub use folder::{
    ConsistencyGap, FolderConfig, FolderError, FolderStore, GapKind, OpenError, Predicate,
    QueryOptions,
};
