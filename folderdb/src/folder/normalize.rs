use crate::common::attribute::{AttributeInput, AttributeMap};

/// Folds any accepted attribute shape into the canonical flat mapping.
///
/// A flat mapping is returned as is. A list of mappings is merged left to
/// right, so a later entry overwrites an earlier one with the same key.
/// `Empty` yields an empty mapping. Values are moved, never converted.
pub fn normalize(input: AttributeInput) -> AttributeMap {
    match input {
        AttributeInput::Map(map) => map,
        AttributeInput::List(entries) => {
            let mut merged = AttributeMap::new();
            for entry in entries {
                merged.extend(entry);
            }
            merged
        }
        AttributeInput::Empty => AttributeMap::new(),
    }
}
