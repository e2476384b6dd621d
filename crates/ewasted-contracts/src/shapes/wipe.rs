use serde::{Deserialize, Serialize};

use super::{require_text, ShapeError, StructuredOutput};
use crate::schema::ResponseSchema;

pub const MIN_WIPE_STEPS: usize = 3;
pub const MAX_WIPE_STEPS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WipeStep {
    pub step: u32,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WipeGuide {
    pub device: String,
    pub instructions: Vec<WipeStep>,
    pub security_tip: String,
    pub disclaimer: String,
}

impl StructuredOutput for WipeGuide {
    const LABEL: &'static str = "wipe_guide";

    fn response_schema() -> ResponseSchema {
        ResponseSchema::object(
            vec![
                ("device", ResponseSchema::String),
                (
                    "instructions",
                    ResponseSchema::array(ResponseSchema::object(
                        vec![
                            ("step", ResponseSchema::Integer),
                            ("action", ResponseSchema::String),
                        ],
                        &["step", "action"],
                    )),
                ),
                ("securityTip", ResponseSchema::String),
                ("disclaimer", ResponseSchema::String),
            ],
            &["device", "instructions", "securityTip", "disclaimer"],
        )
    }

    fn normalize(mut self) -> Result<Self, ShapeError> {
        let count = self.instructions.len();
        if !(MIN_WIPE_STEPS..=MAX_WIPE_STEPS).contains(&count) {
            return Err(ShapeError::Invariant(format!(
                "expected {MIN_WIPE_STEPS}-{MAX_WIPE_STEPS} instructions, got {count}"
            )));
        }
        if self.instructions[0].step != 1 {
            return Err(ShapeError::Invariant(format!(
                "instructions must start at step 1, got {}",
                self.instructions[0].step
            )));
        }
        if let Some(pair) = self
            .instructions
            .windows(2)
            .find(|pair| pair[1].step <= pair[0].step)
        {
            return Err(ShapeError::Invariant(format!(
                "step numbers must increase (step {} follows step {})",
                pair[1].step, pair[0].step
            )));
        }
        for item in &mut self.instructions {
            item.action = require_text("instructions.action", &item.action)?;
        }
        self.device = self.device.trim().to_string();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::WipeGuide;
    use crate::shapes::{parse_structured, ShapeError};

    fn guide(steps: &[u64]) -> String {
        json!({
            "device": "Android Phone",
            "instructions": steps
                .iter()
                .map(|step| json!({"step": step, "action": format!("Do {step}")}))
                .collect::<Vec<_>>(),
            "securityTip": "Use a certified service.",
            "disclaimer": "General guidance only."
        })
        .to_string()
    }

    #[test]
    fn accepts_three_to_five_increasing_steps() -> anyhow::Result<()> {
        let parsed: WipeGuide = parse_structured(&guide(&[1, 2, 3]))?;
        assert_eq!(parsed.instructions.len(), 3);
        let parsed: WipeGuide = parse_structured(&guide(&[1, 2, 3, 4, 5]))?;
        assert_eq!(parsed.instructions[4].step, 5);
        Ok(())
    }

    #[test]
    fn rejects_bad_step_counts_and_numbering() {
        let cases: [&[u64]; 5] = [&[1, 2], &[1, 2, 3, 4, 5, 6], &[0, 1, 2], &[1, 3, 3], &[2, 3, 4]];
        for steps in cases {
            let err = parse_structured::<WipeGuide>(&guide(steps)).err();
            assert!(
                matches!(err, Some(ShapeError::Invariant(_))),
                "steps {steps:?} should be rejected"
            );
        }
    }

    #[test]
    fn serializes_camel_case_fields() -> anyhow::Result<()> {
        let parsed: WipeGuide = parse_structured(&guide(&[1, 2, 3]))?;
        let value = serde_json::to_value(&parsed)?;
        assert_eq!(value["securityTip"], json!("Use a certified service."));
        Ok(())
    }
}
