//! Discovery of the attribute names used inside a folder.
//!
//! The index runs a map/reduce pass: every record emits `(folder, name)` for
//! each of its attribute keys, and the names routed to one folder are reduced
//! into a single comma-joined, duplicate-free string. The string lands in the
//! `attributes` aggregation output under the folder's name and is split again
//! when read back.

use crate::common::constants::{ATTRIBUTE_NAME_SEPARATOR, ATTRIBUTE_NAMES_OUTPUT};
use crate::file::FileRecord;
use crate::folder::{FolderError, FolderStore};

/// Map step: one `(folder, name)` pair per non-empty attribute key.
pub(crate) fn emit_attribute_names(record: &FileRecord) -> Vec<(String, String)> {
    record
        .attributes
        .keys()
        .filter(|name| !name.is_empty())
        .map(|name| (record.folder.clone(), name.clone()))
        .collect()
}

/// Reduce step: joins the names with `,`, skipping any already present as a whole token.
pub(crate) fn reduce_attribute_names(_folder: &str, names: &[String]) -> String {
    let mut joined = String::new();
    for name in names {
        if contains_token(&joined, name) {
            continue;
        }
        if !joined.is_empty() {
            joined.push(ATTRIBUTE_NAME_SEPARATOR);
        }
        joined.push_str(name);
    }
    joined
}

/// Whether `name` already appears in `joined` delimited by separators or the string ends.
fn contains_token(joined: &str, name: &str) -> bool {
    let sep = ATTRIBUTE_NAME_SEPARATOR;
    joined == name
        || joined.starts_with(&format!("{name}{sep}"))
        || joined.ends_with(&format!("{sep}{name}"))
        || joined.contains(&format!("{sep}{name}{sep}"))
}

/// Splits a stored reduction back into names. Missing or empty means none.
fn split_attribute_names(joined: Option<&str>) -> Vec<String> {
    match joined {
        None | Some("") => Vec::new(),
        Some(joined) => joined
            .split(ATTRIBUTE_NAME_SEPARATOR)
            .map(str::to_string)
            .collect(),
    }
}

pub(crate) fn list_attribute_names(folder: &FolderStore) -> Result<Vec<String>, FolderError> {
    folder.index.run_aggregation(
        &emit_attribute_names,
        &reduce_attribute_names,
        ATTRIBUTE_NAMES_OUTPUT,
    )?;
    let joined = folder
        .index
        .read_aggregation(ATTRIBUTE_NAMES_OUTPUT, &folder.name)?;
    let names = split_attribute_names(joined.as_deref());
    tracing::debug!(folder = %folder.name, count = names.len(), "Listed attribute names");
    Ok(names)
}
