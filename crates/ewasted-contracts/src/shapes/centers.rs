use serde::{Deserialize, Serialize};

use super::{require_text, ShapeError, StructuredOutput};
use crate::schema::ResponseSchema;

pub const MAX_CENTERS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecyclingCenter {
    pub name: String,
    pub address: String,
    pub accepted: String,
    pub best_for: String,
}

/// Centers ranked best first, never more than [`MAX_CENTERS`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CenterList(pub Vec<RecyclingCenter>);

impl CenterList {
    pub fn into_inner(self) -> Vec<RecyclingCenter> {
        self.0
    }
}

impl StructuredOutput for CenterList {
    const LABEL: &'static str = "recycling_centers";

    fn response_schema() -> ResponseSchema {
        ResponseSchema::array(ResponseSchema::object(
            vec![
                ("name", ResponseSchema::String),
                ("address", ResponseSchema::String),
                ("accepted", ResponseSchema::String),
                ("bestFor", ResponseSchema::String),
            ],
            &["name", "address", "accepted", "bestFor"],
        ))
    }

    fn normalize(self) -> Result<Self, ShapeError> {
        let mut centers = Vec::with_capacity(MAX_CENTERS);
        for center in self.0.into_iter().take(MAX_CENTERS) {
            centers.push(RecyclingCenter {
                name: require_text("name", &center.name)?,
                address: center.address.trim().to_string(),
                accepted: center.accepted.trim().to_string(),
                best_for: center.best_for.trim().to_string(),
            });
        }
        Ok(Self(centers))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{CenterList, MAX_CENTERS};
    use crate::shapes::parse_structured;

    fn center(name: &str) -> serde_json::Value {
        json!({
            "name": name,
            "address": "1 Main St",
            "accepted": "Laptops",
            "bestFor": "Close by"
        })
    }

    #[test]
    fn keeps_model_order_and_caps_at_three() -> anyhow::Result<()> {
        let text = json!([center("A"), center("B"), center("C"), center("D")]).to_string();
        let centers: CenterList = parse_structured(&text)?;
        assert_eq!(centers.0.len(), MAX_CENTERS);
        assert_eq!(
            centers
                .0
                .iter()
                .map(|center| center.name.as_str())
                .collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
        Ok(())
    }

    #[test]
    fn empty_list_is_valid() -> anyhow::Result<()> {
        let centers: CenterList = parse_structured("[]")?;
        assert!(centers.0.is_empty());
        Ok(())
    }

    #[test]
    fn item_missing_best_for_is_rejected() {
        let text = json!([{"name": "A", "address": "x", "accepted": "y"}]).to_string();
        let err = parse_structured::<CenterList>(&text)
            .err()
            .map(|err| err.to_string())
            .unwrap_or_default();
        assert!(err.contains("$[0].bestFor"), "{err}");
    }
}
