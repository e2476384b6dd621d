use serde_json::{Map, Value};
use thiserror::Error;

/// Declared shape of a structured model response.
///
/// The same declaration is sent to the model as `responseSchema` and used to
/// check what comes back, since the model's literal output is not guaranteed
/// to honor it.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseSchema {
    String,
    Boolean,
    Integer,
    Array(Box<ResponseSchema>),
    Object {
        properties: Vec<(&'static str, ResponseSchema)>,
        required: Vec<&'static str>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {problem}")]
pub struct SchemaViolation {
    pub path: String,
    pub problem: String,
}

impl ResponseSchema {
    pub fn object(
        properties: Vec<(&'static str, ResponseSchema)>,
        required: &[&'static str],
    ) -> Self {
        Self::Object {
            properties,
            required: required.to_vec(),
        }
    }

    pub fn array(items: ResponseSchema) -> Self {
        Self::Array(Box::new(items))
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::Array(_) => "ARRAY",
            Self::Object { .. } => "OBJECT",
        }
    }

    /// Renders the Gemini `responseSchema` form.
    pub fn to_gemini(&self) -> Value {
        let mut out = Map::new();
        out.insert(
            "type".to_string(),
            Value::String(self.type_name().to_string()),
        );
        match self {
            Self::Array(items) => {
                out.insert("items".to_string(), items.to_gemini());
            }
            Self::Object {
                properties,
                required,
            } => {
                let mut props = Map::new();
                for (name, schema) in properties {
                    props.insert((*name).to_string(), schema.to_gemini());
                }
                out.insert("properties".to_string(), Value::Object(props));
                out.insert(
                    "required".to_string(),
                    Value::Array(
                        required
                            .iter()
                            .map(|name| Value::String((*name).to_string()))
                            .collect(),
                    ),
                );
            }
            Self::String | Self::Boolean | Self::Integer => {}
        }
        Value::Object(out)
    }

    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at("$", value)
    }

    fn validate_at(&self, path: &str, value: &Value) -> Result<(), SchemaViolation> {
        let mismatch = |expected: &str| SchemaViolation {
            path: path.to_string(),
            problem: format!("expected {expected}, found {}", json_kind(value)),
        };
        match self {
            Self::String => value.as_str().map(|_| ()).ok_or_else(|| mismatch("string")),
            Self::Boolean => value
                .as_bool()
                .map(|_| ())
                .ok_or_else(|| mismatch("boolean")),
            Self::Integer => {
                if value.is_i64() || value.is_u64() {
                    Ok(())
                } else {
                    Err(mismatch("integer"))
                }
            }
            Self::Array(items) => {
                let rows = value.as_array().ok_or_else(|| mismatch("array"))?;
                for (idx, row) in rows.iter().enumerate() {
                    items.validate_at(&format!("{path}[{idx}]"), row)?;
                }
                Ok(())
            }
            Self::Object {
                properties,
                required,
            } => {
                let object = value.as_object().ok_or_else(|| mismatch("object"))?;
                for name in required {
                    match object.get(*name) {
                        Some(Value::Null) | None => {
                            return Err(SchemaViolation {
                                path: format!("{path}.{name}"),
                                problem: "required field missing".to_string(),
                            });
                        }
                        Some(_) => {}
                    }
                }
                for (name, schema) in properties {
                    match object.get(*name) {
                        Some(Value::Null) | None => continue,
                        Some(field) => schema.validate_at(&format!("{path}.{name}"), field)?,
                    }
                }
                Ok(())
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
