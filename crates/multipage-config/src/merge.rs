//! Deep merge of JSON values.

use serde_json::Value;

/// Merge `update` into `target`.
///
/// Objects merge key by key, recursively. Anything else in `update` (arrays,
/// scalars, null) replaces the slot wholesale.
pub fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (slot, _) => *slot = update.clone(),
    }
}
