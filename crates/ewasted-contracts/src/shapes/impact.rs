use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{require_text, ShapeError, StructuredOutput};
use crate::schema::ResponseSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCondition {
    Broken,
    MinorIssues,
    Working,
}

impl DeviceCondition {
    pub const ALL: [DeviceCondition; 3] = [
        DeviceCondition::Broken,
        DeviceCondition::MinorIssues,
        DeviceCondition::Working,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Broken => "Broken",
            Self::MinorIssues => "Minor Issues",
            Self::Working => "Working",
        }
    }

    /// The action the model is instructed to recommend for this condition.
    pub fn expected_action(&self) -> RecommendedAction {
        match self {
            Self::Broken => RecommendedAction::Recycle,
            Self::MinorIssues => RecommendedAction::Refurbish,
            Self::Working => RecommendedAction::Reuse,
        }
    }
}

impl fmt::Display for DeviceCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DeviceCondition {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw
            .trim()
            .to_ascii_lowercase()
            .replace(['-', '_'], " ");
        match normalized.as_str() {
            "broken" => Ok(Self::Broken),
            "minor issues" | "minor" => Ok(Self::MinorIssues),
            "working" => Ok(Self::Working),
            _ => Err(format!(
                "unknown device condition '{}' (expected Broken, Minor Issues or Working)",
                raw.trim()
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendedAction {
    Recycle,
    Reuse,
    Refurbish,
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recycle => "Recycle",
            Self::Reuse => "Reuse",
            Self::Refurbish => "Refurbish",
        }
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactFigures {
    pub toxic_waste_avoided: String,
    pub materials_recovered: String,
    pub co2_saved: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefurbishEstimate {
    pub cost: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub action: RecommendedAction,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refurbish_estimate: Option<RefurbishEstimate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub impact: ImpactFigures,
    pub recommendation: Recommendation,
}

impl ImpactAnalysis {
    /// The condition rule is an instruction to the model, not a local guarantee.
    pub fn follows_condition_rule(&self, condition: DeviceCondition) -> bool {
        self.recommendation.action == condition.expected_action()
    }
}

impl StructuredOutput for ImpactAnalysis {
    const LABEL: &'static str = "impact_analysis";

    fn response_schema() -> ResponseSchema {
        let refurbish_estimate = ResponseSchema::object(
            vec![
                ("cost", ResponseSchema::String),
                ("value", ResponseSchema::String),
            ],
            &["cost", "value"],
        );
        ResponseSchema::object(
            vec![
                (
                    "impact",
                    ResponseSchema::object(
                        vec![
                            ("toxicWasteAvoided", ResponseSchema::String),
                            ("materialsRecovered", ResponseSchema::String),
                            ("co2Saved", ResponseSchema::String),
                        ],
                        &["toxicWasteAvoided", "materialsRecovered", "co2Saved"],
                    ),
                ),
                (
                    "recommendation",
                    ResponseSchema::object(
                        vec![
                            ("action", ResponseSchema::String),
                            ("reason", ResponseSchema::String),
                            ("refurbishEstimate", refurbish_estimate),
                        ],
                        &["action", "reason"],
                    ),
                ),
            ],
            &["impact", "recommendation"],
        )
    }

    fn normalize(mut self) -> Result<Self, ShapeError> {
        self.recommendation.reason =
            require_text("recommendation.reason", &self.recommendation.reason)?;
        match self.recommendation.action {
            RecommendedAction::Refurbish => {
                if self.recommendation.refurbish_estimate.is_none() {
                    return Err(ShapeError::Invariant(
                        "refurbishEstimate is required when the action is Refurbish".to_string(),
                    ));
                }
            }
            RecommendedAction::Recycle | RecommendedAction::Reuse => {
                self.recommendation.refurbish_estimate = None;
            }
        }
        Ok(self)
    }
}
