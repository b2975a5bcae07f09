use flowsync_defs::ParameterType;
use serde_json::{json, Map, Value};

/// Builds a `parameter_openapi_schema` from example parameter values.
/// Parameters with a non-null value are required.
pub fn generate_parameter_schema(parameters: &Map<String, Value>) -> Value {
    let mut properties = Map::new();
    let mut required = vec![];

    for (name, value) in parameters {
        properties.insert(
            name.clone(),
            json!({ "type": ParameterType::of(value).as_str() }),
        );
        if !value.is_null() {
            required.push(Value::String(name.clone()));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    Value::Object(schema)
}
