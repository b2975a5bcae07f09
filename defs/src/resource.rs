use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ResourceKind;

pub const DEFAULT_WORK_POOL_NAME: &str = "default";
pub const DEFAULT_WORK_QUEUE_NAME: &str = "default";
pub const DEFAULT_TIMEZONE: &str = "Europe/Zurich";

/// Values filled in by the normalizer when a definition leaves them out.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeDefaults {
    pub work_pool_name: String,
    pub work_queue_name: String,
    pub timezone: String,
}

impl Default for NormalizeDefaults {
    fn default() -> Self {
        NormalizeDefaults {
            work_pool_name: DEFAULT_WORK_POOL_NAME.to_string(),
            work_queue_name: DEFAULT_WORK_QUEUE_NAME.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

/// A resource definition reshaped to the fixed field set of its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResource {
    pub kind: ResourceKind,
    pub name: String,
    pub fields: Map<String, Value>,
}

impl NormalizedResource {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub existing: Value,
    pub new: Value,
}

pub fn resource_name(resource: &Value) -> Option<&str> {
    resource.get("name").and_then(Value::as_str)
}

/// Server-assigned identifier. Some endpoints answer with a bare id string.
pub fn resource_id(resource: &Value) -> Option<String> {
    match resource {
        Value::String(id) => Some(id.clone()),
        _ => resource
            .get("id")
            .and_then(Value::as_str)
            .map(|id| id.to_string()),
    }
}
