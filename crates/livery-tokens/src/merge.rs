//! Deep merge of override documents onto a base document.
//!
//! # Design
//! - Group/group pairs merge recursively; any other pairing is a wholesale
//!   replacement by the override node.
//! - Inputs are borrowed and never mutated; the result owns fresh copies.

use serde_json::{Map, Value};

use crate::model::{Layer, OverrideDocument, TokenDocument, TokenGroup, TokenNode};

/// Merge `overrides` onto `base`, returning a new document.
#[must_use]
pub fn merge(base: &TokenDocument, overrides: &OverrideDocument) -> TokenDocument {
    let mut merged = base.clone();
    if let Some(name) = &overrides.name {
        merged.name.clone_from(name);
    }
    if let Some(version) = overrides.version {
        merged.version = version;
    }
    if let Some(meta) = &overrides.meta {
        merge_maps(&mut merged.meta, meta);
    }
    for layer in Layer::ALL {
        merge_groups(merged.layer_mut(layer), overrides.layer(layer));
    }
    merged
}

/// Merge `overrides` into `target` in place.
pub fn merge_groups(target: &mut TokenGroup, overrides: &TokenGroup) {
    for (key, incoming) in overrides {
        match (target.get_mut(key), incoming) {
            (Some(TokenNode::Group(existing)), TokenNode::Group(patch)) => {
                merge_groups(existing, patch);
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

/// Merge two raw JSON values with the same rule used for documents.
#[must_use]
pub fn merge_json(base: &Value, overrides: &Value) -> Value {
    match (base, overrides) {
        (Value::Object(base), Value::Object(patch)) => {
            let mut merged = base.clone();
            merge_maps(&mut merged, patch);
            Value::Object(merged)
        }
        (_, other) => other.clone(),
    }
}

fn merge_maps(target: &mut Map<String, Value>, overrides: &Map<String, Value>) {
    for (key, incoming) in overrides {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(patch)) => merge_maps(existing, patch),
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}
