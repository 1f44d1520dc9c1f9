//! Merge-with-defaults healing
//!
//! Every persisted slice is read through [`merge_with_defaults`]: the stored
//! JSON is laid over the serialized default value so that a partially saved
//! or hand-edited document is repaired field by field instead of discarded.
//!
//! Rules, applied recursively:
//! - object over object: merge key by key; keys only in the stored value are kept
//! - objects tagged with a `type` string on both sides are variants: the stored one wins whole
//! - array over array: the stored array wins; anything else over an array keeps the default
//! - `null` never overrides a default
//! - scalars override only a default of the same JSON kind
//!
//! When the merged document still cannot be read, the offending fields are
//! reset to their defaults one by one, so a bad list in one record does not
//! cost the rest of the slice.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Lay `overlay` over `base` following the healing rules
pub fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (base, Value::Null) => base,
        (Value::Null, overlay) => overlay,
        (Value::Object(base), Value::Object(overlay)) if is_variant_pair(&base, &overlay) => {
            Value::Object(overlay)
        }
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (Value::Array(_), overlay @ Value::Array(_)) => overlay,
        (Value::String(_), overlay @ Value::String(_)) => overlay,
        (Value::Bool(_), overlay @ Value::Bool(_)) => overlay,
        (Value::Number(_), overlay @ Value::Number(_)) => overlay,
        (base, _) => base,
    }
}

/// Both sides carry a `type` tag: optional fields of the stored variant must
/// not be filled in from the default one
fn is_variant_pair(base: &Map<String, Value>, overlay: &Map<String, Value>) -> bool {
    matches!(
        (base.get("type"), overlay.get("type")),
        (Some(Value::String(_)), Some(Value::String(_)))
    )
}

/// Heal `loaded` against `defaults`, returning the typed result.
///
/// Errors only when the merged document still cannot be read as `T`
/// (for example an array whose elements have the wrong shape).
pub fn try_merge_with_defaults<T>(defaults: &T, loaded: Value) -> serde_json::Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let base = serde_json::to_value(defaults)?;
    serde_json::from_value(merge_values(base, loaded))
}

/// Heal `loaded` against `defaults`.
///
/// Fields that keep the merged document from being read are replaced by
/// their defaults; only when that still fails is the whole value dropped.
pub fn merge_with_defaults<T>(defaults: &T, loaded: Value) -> T
where
    T: Serialize + DeserializeOwned + Clone,
{
    let base = match serde_json::to_value(defaults) {
        Ok(base) => base,
        Err(e) => {
            warn!(error = %e, "default value not serializable, using it as is");
            return defaults.clone();
        }
    };
    let merged = merge_values(base.clone(), loaded);
    let merged = match serde_json::from_value::<T>(merged.clone()) {
        Ok(value) => return value,
        Err(e) => {
            debug!(error = %e, "merged value unreadable, resetting bad fields");
            merged
        }
    };

    let repaired = match (&base, merged) {
        (Value::Object(_), Value::Object(fields)) => {
            let decodes = |doc: Value| serde_json::from_value::<T>(doc).is_ok();
            Value::Object(repair_fields(&base, &base, &mut Vec::new(), fields, &decodes))
        }
        (_, merged) => merged,
    };
    match serde_json::from_value(repaired) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "stored value unreadable after healing, using defaults");
            defaults.clone()
        }
    }
}

/// Reset every field of `fields` (the object at `path`) that cannot be read.
///
/// Each field is tried alone inside the all-defaults document `root`, so the
/// check for one field does not depend on the others. Untagged objects are
/// repaired recursively; anything else falls back to its default, or is
/// dropped when it has none.
fn repair_fields(
    root: &Value,
    defaults: &Value,
    path: &mut Vec<String>,
    fields: Map<String, Value>,
    decodes: &dyn Fn(Value) -> bool,
) -> Map<String, Value> {
    let mut repaired = Map::new();
    for (key, value) in fields {
        let default = defaults.get(&key);
        if default == Some(&value) {
            repaired.insert(key, value);
            continue;
        }

        path.push(key.clone());
        if decodes(with_value_at(root, path, value.clone())) {
            repaired.insert(key, value);
        } else {
            match (default, value) {
                (Some(default @ Value::Object(base)), Value::Object(inner))
                    if !is_variant_pair(base, &inner) =>
                {
                    let inner = repair_fields(root, default, path, inner, decodes);
                    repaired.insert(key, Value::Object(inner));
                }
                (Some(default), _) => {
                    warn!(field = %path.join("."), "stored field unreadable, using its default");
                    repaired.insert(key, default.clone());
                }
                (None, _) => {
                    warn!(field = %path.join("."), "stored field unreadable, dropping it");
                }
            }
        }
        path.pop();
    }
    repaired
}

/// Copy of `root` with `value` placed at `path`
fn with_value_at(root: &Value, path: &[String], value: Value) -> Value {
    let Some((last, parents)) = path.split_last() else {
        return value;
    };
    let mut doc = root.clone();
    let pointer: String = parents
        .iter()
        .map(|key| format!("/{}", key.replace('~', "~0").replace('/', "~1")))
        .collect();
    if let Some(Value::Object(parent)) = doc.pointer_mut(&pointer) {
        parent.insert(last.clone(), value);
    }
    doc
}
