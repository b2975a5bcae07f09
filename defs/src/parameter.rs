use serde_json::Value;

/// Closed set of value shapes a deployment parameter can be declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    Integer,
    Boolean,
    Number,
    Array,
    Object,
    String,
}

impl ParameterType {
    /// Infers the declared type from an example value. Anything that is not one
    /// of the structured shapes, including `null`, is declared a string.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => ParameterType::Integer,
            Value::Bool(_) => ParameterType::Boolean,
            Value::Number(_) => ParameterType::Number,
            Value::Array(_) => ParameterType::Array,
            Value::Object(_) => ParameterType::Object,
            Value::String(_) | Value::Null => ParameterType::String,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::Integer => "integer",
            ParameterType::Boolean => "boolean",
            ParameterType::Number => "number",
            ParameterType::Array => "array",
            ParameterType::Object => "object",
            ParameterType::String => "string",
        }
    }
}
