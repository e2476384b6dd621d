use ewasted_contracts::shapes::{IdentificationResult, ImpactAnalysis, RecyclingCenter, WipeGuide};

pub const CHAT_GREETING: &str =
    "Hello! How can I help you with your e-waste recycling questions today?";
pub const NO_CENTERS: &str =
    "No suitable centers found. Please try a different device type or contact us directly.";

pub fn identification(result: &IdentificationResult) -> String {
    let mut lines = vec![
        format!("Identified Item: {}", result.item_name),
        format!("Category: {}", result.category),
    ];
    if result.recyclable {
        lines.push("✅ We can recycle this item!".to_string());
        lines.push("Use /prefill to add it to your pickup request.".to_string());
    } else {
        lines.push(
            "❌ This item may not be recyclable through our standard program. Please contact us \
             for more information."
                .to_string(),
        );
    }
    lines.join("\n")
}

pub fn centers(centers: &[RecyclingCenter]) -> String {
    if centers.is_empty() {
        return NO_CENTERS.to_string();
    }
    let mut out = String::from("Recommended Centers:");
    for center in centers {
        out.push_str(&format!(
            "\n\n{}\n  {}\n  Accepts: {}\n  Recommended because: {}",
            center.name, center.address, center.accepted, center.best_for
        ));
    }
    out
}

pub fn impact(analysis: &ImpactAnalysis) -> String {
    let impact = &analysis.impact;
    let recommendation = &analysis.recommendation;
    let mut out = format!(
        "Your Estimated Impact:\n  Toxic Waste Avoided: {}\n  Materials Recovered: {}\n  \
         CO₂ Saved: {}\n\nAI Recommendation: {}\n  {}",
        impact.toxic_waste_avoided,
        impact.materials_recovered,
        impact.co2_saved,
        recommendation.action,
        recommendation.reason
    );
    if let Some(estimate) = recommendation.refurbish_estimate.as_ref() {
        out.push_str(&format!(
            "\n  Estimated Refurbish Cost: {}\n  Value Insight: {}",
            estimate.cost, estimate.value
        ));
    }
    out
}

pub fn wipe_guide(guide: &WipeGuide) -> String {
    let steps = guide
        .instructions
        .iter()
        .map(|item| format!("  {}. {}", item.step, item.action))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Secure Wiping Guide for: {}\n{}\n\nImportant Security Tip\n  {}\n\nDisclaimer: {}",
        guide.device, steps, guide.security_tip, guide.disclaimer
    )
}

pub fn contact_sent(acknowledgment: &str) -> String {
    format!("Message Sent!\n{acknowledgment}")
}
