mod centers;
mod identification;
mod impact;
mod wipe;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::schema::{ResponseSchema, SchemaViolation};

pub use centers::{CenterList, RecyclingCenter, MAX_CENTERS};
pub use identification::{IdentificationResult, ItemCategory, NOT_E_WASTE};
pub use impact::{
    DeviceCondition, ImpactAnalysis, ImpactFigures, Recommendation, RecommendedAction,
    RefurbishEstimate,
};
pub use wipe::{WipeGuide, WipeStep, MAX_WIPE_STEPS, MIN_WIPE_STEPS};

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response does not match schema at {0}")]
    Schema(#[from] SchemaViolation),
    #[error("response has an unexpected value: {0}")]
    Value(#[source] serde_json::Error),
    #[error("{0}")]
    Invariant(String),
}

/// A result type the model is asked to produce as JSON.
pub trait StructuredOutput: Serialize + DeserializeOwned + Sized {
    const LABEL: &'static str;

    fn response_schema() -> ResponseSchema;

    /// Applies the invariants the schema alone cannot express.
    fn normalize(self) -> Result<Self, ShapeError> {
        Ok(self)
    }
}

pub fn parse_structured<T: StructuredOutput>(text: &str) -> Result<T, ShapeError> {
    let body = strip_code_fence(text);
    let value: Value = serde_json::from_str(&body)?;
    T::response_schema().validate(&value)?;
    let typed: T = serde_json::from_value(value).map_err(|err| {
        if err.is_data() {
            ShapeError::Value(err)
        } else {
            ShapeError::Json(err)
        }
    })?;
    typed.normalize()
}

fn strip_code_fence(text: &str) -> String {
    let raw = text.trim();
    if !(raw.starts_with("```") && raw.ends_with("```")) {
        return raw.to_string();
    }
    let lines: Vec<&str> = raw.lines().collect();
    if lines.len() < 2 {
        return strip_inline_fence(raw);
    }
    let opener = lines[0].trim_start_matches('`').trim();
    let body = lines[1..lines.len() - 1].join("\n");
    if opener.is_empty() || opener.eq_ignore_ascii_case("json") {
        return body.trim().to_string();
    }
    raw.to_string()
}

/// One-line form: ```` ```json {"a":1}``` ````.
fn strip_inline_fence(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return raw.to_string();
    };
    let inner = inner.trim_start();
    let tagged = inner
        .get(..4)
        .is_some_and(|tag| tag.eq_ignore_ascii_case("json"));
    let body = if tagged { &inner[4..] } else { inner };
    body.trim().to_string()
}

fn require_text(field: &str, value: &str) -> Result<String, ShapeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ShapeError::Invariant(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{parse_structured, strip_code_fence, IdentificationResult, ShapeError};

    #[test]
    fn code_fences_are_stripped_before_parsing() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn single_line_fences_are_stripped() -> anyhow::Result<()> {
        assert_eq!(strip_code_fence("```json {\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```JSON[1, 2]```"), "[1, 2]");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");

        let item: IdentificationResult = parse_structured(
            r#"```json {"itemName":"Router","category":"Other E-Waste","recyclable":true}```"#,
        )?;
        assert_eq!(item.item_name, "Router");
        Ok(())
    }

    #[test]
    fn schema_violation_is_reported_before_deserialization() {
        let err = parse_structured::<IdentificationResult>(
            r#"{"itemName": "Phone", "category": "Mobile Devices"}"#,
        )
        .err();
        match err {
            Some(ShapeError::Schema(violation)) => assert_eq!(violation.path, "$.recyclable"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn invalid_json_is_a_json_error() {
        let err = parse_structured::<IdentificationResult>("I think it's a phone").err();
        assert!(matches!(err, Some(ShapeError::Json(_))));
    }

    #[test]
    fn unknown_enum_value_is_a_value_error() {
        let err = parse_structured::<IdentificationResult>(
            r#"{"itemName": "Sofa", "category": "Furniture", "recyclable": false}"#,
        )
        .err();
        match err {
            Some(err @ ShapeError::Value(_)) => {
                let message = err.to_string();
                assert!(message.starts_with("response has an unexpected value"));
                assert!(!message.contains("not valid JSON"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
