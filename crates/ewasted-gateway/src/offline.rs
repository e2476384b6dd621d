//! Canned results used when no API key is configured. Every value is marked
//! as a mock so it cannot be mistaken for a model answer.

use std::thread;
use std::time::Duration;

use ewasted_contracts::operations::Operation;
use ewasted_contracts::shapes::{
    DeviceCondition, IdentificationResult, ImpactAnalysis, ImpactFigures, ItemCategory,
    Recommendation, RecommendedAction, RecyclingCenter, RefurbishEstimate, WipeGuide, WipeStep,
};

/// Artificial latency per operation, so offline mode still exercises the
/// busy states of the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfflineDelays {
    pub chat: Duration,
    pub contact: Duration,
    pub identify: Duration,
    pub centers: Duration,
    pub impact: Duration,
    pub wipe: Duration,
}

impl Default for OfflineDelays {
    fn default() -> Self {
        Self {
            chat: Duration::from_millis(800),
            contact: Duration::from_millis(500),
            identify: Duration::from_millis(1500),
            centers: Duration::from_millis(1000),
            impact: Duration::from_millis(1000),
            wipe: Duration::from_millis(1000),
        }
    }
}

impl OfflineDelays {
    pub fn none() -> Self {
        Self {
            chat: Duration::ZERO,
            contact: Duration::ZERO,
            identify: Duration::ZERO,
            centers: Duration::ZERO,
            impact: Duration::ZERO,
            wipe: Duration::ZERO,
        }
    }

    pub fn for_operation(&self, operation: Operation) -> Duration {
        match operation {
            Operation::ChatTurn => self.chat,
            Operation::ContactAcknowledgment => self.contact,
            Operation::ItemIdentification => self.identify,
            Operation::CenterLookup => self.centers,
            Operation::ImpactAnalysis => self.impact,
            Operation::WipeInstructions => self.wipe,
        }
    }

    pub(crate) fn wait(&self, operation: Operation) {
        let delay = self.for_operation(operation);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

pub(crate) fn chat_reply(message: &str) -> String {
    format!("This is a mock AI response about \"{message}\". The API key is not configured.")
}

pub(crate) fn contact_acknowledgment(name: &str, service: &str) -> String {
    format!(
        "Thank you for your message, {name}! We've received your inquiry regarding our \
         {service} service and a member of our team will get back to you within 24 hours. \
         We appreciate you reaching out to E-Wasted."
    )
}

pub(crate) fn identification() -> IdentificationResult {
    IdentificationResult {
        item_name: "Old Laptop".to_string(),
        category: ItemCategory::ComputersAndLaptops,
        recyclable: true,
    }
}

pub(crate) fn centers() -> Vec<RecyclingCenter> {
    vec![
        RecyclingCenter {
            name: "Mock GreenLeaf Recycling".to_string(),
            address: "123 Mockingbird Lane".to_string(),
            accepted: "All personal electronics".to_string(),
            best_for: "This is a mock center suitable for your device.".to_string(),
        },
        RecyclingCenter {
            name: "Mock All-City Metals".to_string(),
            address: "456 Fake St".to_string(),
            accepted: "Wide range of electronics".to_string(),
            best_for: "Good for various types of e-waste.".to_string(),
        },
    ]
}

pub(crate) fn impact(condition: DeviceCondition) -> ImpactAnalysis {
    let action = condition.expected_action();
    let refurbish_estimate = match action {
        RecommendedAction::Refurbish => Some(RefurbishEstimate {
            cost: "Mock $50 - $150 repair".to_string(),
            value: "Mock estimate: well under the price of a new device.".to_string(),
        }),
        RecommendedAction::Recycle | RecommendedAction::Reuse => None,
    };
    ImpactAnalysis {
        impact: ImpactFigures {
            toxic_waste_avoided: "Mock heavy metals".to_string(),
            materials_recovered: "Mock gold, copper".to_string(),
            co2_saved: "Mock 50kg CO₂".to_string(),
        },
        recommendation: Recommendation {
            action,
            reason: "This is a mock analysis for your device.".to_string(),
            refurbish_estimate,
        },
    }
}

pub(crate) fn wipe_guide(device: &str) -> WipeGuide {
    let steps = [
        "This is a mock instruction: Back up your data first.",
        "This is a mock instruction: Sign out of all accounts.",
        "This is a mock instruction: Perform a factory reset.",
    ];
    WipeGuide {
        device: format!("Mock {device}"),
        instructions: steps
            .iter()
            .zip(1..)
            .map(|(action, step)| WipeStep {
                step,
                action: (*action).to_string(),
            })
            .collect(),
        security_tip:
            "For guaranteed data destruction, always use a certified service like E-Wasted."
                .to_string(),
        disclaimer: "These are general guidelines. Steps may vary by specific model and OS \
                     version. E-Wasted is not responsible for data loss."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use ewasted_contracts::operations::Operation;
    use ewasted_contracts::shapes::{
        parse_structured, CenterList, DeviceCondition, IdentificationResult, ImpactAnalysis,
        WipeGuide,
    };

    use super::{centers, identification, impact, wipe_guide, OfflineDelays};

    #[test]
    fn default_delays_follow_operation_latency() {
        let delays = OfflineDelays::default();
        assert_eq!(delays.for_operation(Operation::ChatTurn).as_millis(), 800);
        assert_eq!(
            delays.for_operation(Operation::ItemIdentification).as_millis(),
            1500
        );
        assert!(OfflineDelays::none()
            .for_operation(Operation::WipeInstructions)
            .is_zero());
    }

    #[test]
    fn mock_impact_follows_condition_rule_and_shape() -> anyhow::Result<()> {
        for condition in DeviceCondition::ALL {
            let analysis = impact(condition);
            assert!(analysis.follows_condition_rule(condition));
            let reparsed: ImpactAnalysis = parse_structured(&serde_json::to_string(&analysis)?)?;
            assert_eq!(reparsed, analysis);
        }
        assert!(impact(DeviceCondition::MinorIssues)
            .recommendation
            .refurbish_estimate
            .is_some());
        Ok(())
    }

    #[test]
    fn mock_identification_and_centers_satisfy_their_schemas() -> anyhow::Result<()> {
        let item: IdentificationResult =
            parse_structured(&serde_json::to_string(&identification())?)?;
        assert!(item.recyclable);
        let list: CenterList = parse_structured(&serde_json::to_string(&centers())?)?;
        assert_eq!(list.into_inner(), centers());
        Ok(())
    }

    #[test]
    fn mock_wipe_guide_is_a_valid_guide() -> anyhow::Result<()> {
        let guide = wipe_guide("iPhone");
        assert_eq!(guide.device, "Mock iPhone");
        let reparsed: WipeGuide = parse_structured(&serde_json::to_string(&guide)?)?;
        assert_eq!(reparsed.instructions.len(), 3);
        Ok(())
    }
}
