// Deep merge of documents

use std::rc::Rc;

use crate::value::Document;

/// Recursively merge `patch` into `target`.
///
/// Two objects are merged key by key, recursing into members present on both
/// sides. Any other combination replaces `target` with `patch`; arrays are
/// never merged element-wise.
pub fn deep_merge(target: &mut Document, patch: Document) {
    match patch {
        Document::Object(patch_map) if target.is_object() => {
            let entries = Rc::try_unwrap(patch_map).unwrap_or_else(|shared| (*shared).clone());
            if let Some(map) = target.as_object_mut() {
                for (key, value) in entries {
                    match map.get_mut(&key) {
                        Some(existing) => deep_merge(existing, value),
                        None => {
                            map.insert(key, value);
                        }
                    }
                }
            }
        }
        other => *target = other,
    }
}
