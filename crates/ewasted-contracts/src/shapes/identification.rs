use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{require_text, ShapeError, StructuredOutput};
use crate::schema::ResponseSchema;

pub const NOT_E_WASTE: &str = "Not E-Waste";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ItemCategory {
    ComputersAndLaptops,
    MobileDevices,
    HomeAppliances,
    EntertainmentDevices,
    Batteries,
    CablesAndChargers,
    OtherEWaste,
    NotApplicable,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 8] = [
        ItemCategory::ComputersAndLaptops,
        ItemCategory::MobileDevices,
        ItemCategory::HomeAppliances,
        ItemCategory::EntertainmentDevices,
        ItemCategory::Batteries,
        ItemCategory::CablesAndChargers,
        ItemCategory::OtherEWaste,
        ItemCategory::NotApplicable,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ComputersAndLaptops => "Computers & Laptops",
            Self::MobileDevices => "Mobile Devices",
            Self::HomeAppliances => "Home Appliances",
            Self::EntertainmentDevices => "Entertainment Devices",
            Self::Batteries => "Batteries",
            Self::CablesAndChargers => "Cables & Chargers",
            Self::OtherEWaste => "Other E-Waste",
            Self::NotApplicable => "Not Applicable",
        }
    }

    pub fn is_e_waste(&self) -> bool {
        *self != Self::NotApplicable
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ItemCategory {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown item category '{wanted}'"))
    }
}

impl TryFrom<String> for ItemCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemCategory> for &'static str {
    fn from(value: ItemCategory) -> Self {
        value.label()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationResult {
    pub item_name: String,
    pub category: ItemCategory,
    pub recyclable: bool,
}

impl IdentificationResult {
    pub fn not_e_waste() -> Self {
        Self {
            item_name: NOT_E_WASTE.to_string(),
            category: ItemCategory::NotApplicable,
            recyclable: false,
        }
    }

    pub fn is_e_waste(&self) -> bool {
        self.category.is_e_waste() && !self.item_name.eq_ignore_ascii_case(NOT_E_WASTE)
    }

    /// Contact-form message offered after a recyclable item was identified.
    pub fn pickup_message(&self) -> String {
        format!(
            "I'd like to schedule a pickup for my identified e-waste: {} ({}).",
            self.item_name, self.category
        )
    }
}

impl StructuredOutput for IdentificationResult {
    const LABEL: &'static str = "identification";

    fn response_schema() -> ResponseSchema {
        ResponseSchema::object(
            vec![
                ("itemName", ResponseSchema::String),
                ("category", ResponseSchema::String),
                ("recyclable", ResponseSchema::Boolean),
            ],
            &["itemName", "category", "recyclable"],
        )
    }

    fn normalize(self) -> Result<Self, ShapeError> {
        let item_name = require_text("itemName", &self.item_name)?;
        let normalized = Self { item_name, ..self };
        if !normalized.is_e_waste() {
            return Ok(Self::not_e_waste());
        }
        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::{IdentificationResult, ItemCategory, NOT_E_WASTE};
    use crate::shapes::{parse_structured, ShapeError};

    #[test]
    fn category_parsing_is_case_insensitive_and_closed() {
        assert_eq!(
            "cables & CHARGERS".parse::<ItemCategory>(),
            Ok(ItemCategory::CablesAndChargers)
        );
        assert!("Furniture".parse::<ItemCategory>().is_err());
    }

    #[test]
    fn serializes_with_canonical_labels() -> anyhow::Result<()> {
        let result = IdentificationResult {
            item_name: "Dell Laptop".to_string(),
            category: ItemCategory::ComputersAndLaptops,
            recyclable: true,
        };
        let text = serde_json::to_string(&result)?;
        assert_eq!(
            text,
            r#"{"itemName":"Dell Laptop","category":"Computers & Laptops","recyclable":true}"#
        );
        Ok(())
    }

    #[test]
    fn not_e_waste_forces_unrecyclable_result() -> anyhow::Result<()> {
        let parsed: IdentificationResult = parse_structured(
            r#"{"itemName": "Not E-Waste", "category": "Other E-Waste", "recyclable": true}"#,
        )?;
        assert_eq!(parsed.item_name, NOT_E_WASTE);
        assert_eq!(parsed.category, ItemCategory::NotApplicable);
        assert!(!parsed.recyclable);

        let parsed: IdentificationResult = parse_structured(
            r#"{"itemName": "Banana", "category": "not applicable", "recyclable": false}"#,
        )?;
        assert_eq!(parsed, IdentificationResult::not_e_waste());
        Ok(())
    }

    #[test]
    fn unknown_category_and_blank_name_are_rejected() {
        let err = parse_structured::<IdentificationResult>(
            r#"{"itemName": "Sofa", "category": "Furniture", "recyclable": false}"#,
        )
        .err();
        assert!(matches!(err, Some(ShapeError::Value(_))));

        let err = parse_structured::<IdentificationResult>(
            r#"{"itemName": "  ", "category": "Batteries", "recyclable": true}"#,
        )
        .err();
        assert!(matches!(err, Some(ShapeError::Invariant(_))));
    }

    #[test]
    fn pickup_message_names_item_and_category() {
        let result = IdentificationResult {
            item_name: "iPhone 11".to_string(),
            category: ItemCategory::MobileDevices,
            recyclable: true,
        };
        assert_eq!(
            result.pickup_message(),
            "I'd like to schedule a pickup for my identified e-waste: iPhone 11 (Mobile Devices)."
        );
    }
}
