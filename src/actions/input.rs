use serde_json::{Map, Value};

/// Raw action input before validation, either a structured JSON value
/// or flat form-encoded pairs.
#[derive(Debug, Clone)]
pub enum RawInput {
    Structured(Value),
    Form(Vec<(String, String)>),
}

impl RawInput {
    /// Normalize to a single JSON value. Form pairs are flattened into
    /// one object; for repeated keys the last value wins.
    pub fn into_value(self) -> Value {
        match self {
            RawInput::Structured(value) => value,
            RawInput::Form(pairs) => {
                let mut object = Map::new();
                for (key, value) in pairs {
                    object.insert(key, Value::String(value));
                }
                Value::Object(object)
            }
        }
    }

    pub fn structured(value: Value) -> Self {
        RawInput::Structured(value)
    }

    pub fn form<K: Into<String>, V: Into<String>>(pairs: Vec<(K, V)>) -> Self {
        RawInput::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One schema violation, reported in field declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub path: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Build the envelope error message: "path: message" entries joined by ", "
pub fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.path, v.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Typed action input checked at the boundary. Implementations report
/// every violation they find, in field declaration order.
pub trait ValidatedInput: Sized {
    fn validate(value: &Value) -> Result<Self, Vec<FieldViolation>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn form_flattening_keeps_last_value() {
        let input = RawInput::form(vec![("name", "first"), ("name", "second")]);
        assert_eq!(input.into_value(), json!({ "name": "second" }));
    }

    #[test]
    fn violations_join_in_order() {
        let violations = vec![
            FieldViolation::new("name", "Name is required"),
            FieldViolation::new("status", "Status is required"),
        ];
        assert_eq!(
            join_violations(&violations),
            "name: Name is required, status: Status is required"
        );
    }
}
