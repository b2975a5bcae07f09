use flowsync_defs::{FieldChange, NormalizedResource};
use serde_json::Value;

use crate::normalize::value_sort_key;

/// Field-level changes between a normalized server copy and a normalized
/// desired definition, over the compared fields of the desired kind.
pub fn diff_resources(existing: &NormalizedResource, desired: &NormalizedResource) -> Vec<FieldChange> {
    let mut changes = vec![];
    for field in desired.kind.compared_fields() {
        let existing_value = existing.get(field).unwrap_or(&Value::Null);
        let new_value = desired.get(field).unwrap_or(&Value::Null);
        if !values_equal(existing_value, new_value) {
            changes.push(FieldChange {
                field: field.to_string(),
                existing: existing_value.clone(),
                new: new_value.clone(),
            });
        }
    }
    changes
}

pub fn differs(existing: &NormalizedResource, desired: &NormalizedResource) -> bool {
    !diff_resources(existing, desired).is_empty()
}

// Sequences compare order-independently, mappings and scalars by structural equality.
fn values_equal(existing: &Value, new: &Value) -> bool {
    match (existing, new) {
        (Value::Array(existing_items), Value::Array(new_items)) => {
            sorted_by_repr(existing_items) == sorted_by_repr(new_items)
        }
        (Value::Null, Value::Array(new_items)) => new_items.is_empty(),
        _ => existing == new,
    }
}

fn sorted_by_repr(items: &[Value]) -> Vec<&Value> {
    let mut sorted: Vec<&Value> = items.iter().collect();
    sorted.sort_by_key(|item| value_sort_key(item));
    sorted
}
