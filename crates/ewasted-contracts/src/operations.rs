use std::fmt;

/// How a gateway operation treats a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePolicy {
    /// Recover locally with a substitute string; the caller never sees the error.
    SilentFallback,
    /// Hand a feature-specific error back to the caller for rendering.
    Surfaced,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SilentFallback => "silent_fallback",
            Self::Surfaced => "surfaced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ChatTurn,
    ContactAcknowledgment,
    ItemIdentification,
    CenterLookup,
    ImpactAnalysis,
    WipeInstructions,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::ChatTurn,
        Operation::ContactAcknowledgment,
        Operation::ItemIdentification,
        Operation::CenterLookup,
        Operation::ImpactAnalysis,
        Operation::WipeInstructions,
    ];

    pub fn policy(&self) -> FailurePolicy {
        match self {
            Self::ChatTurn | Self::ContactAcknowledgment => FailurePolicy::SilentFallback,
            Self::ItemIdentification
            | Self::CenterLookup
            | Self::ImpactAnalysis
            | Self::WipeInstructions => FailurePolicy::Surfaced,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChatTurn => "chat_turn",
            Self::ContactAcknowledgment => "contact_acknowledgment",
            Self::ItemIdentification => "item_identification",
            Self::CenterLookup => "center_lookup",
            Self::ImpactAnalysis => "impact_analysis",
            Self::WipeInstructions => "wipe_instructions",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{FailurePolicy, Operation};

    #[test]
    fn only_chat_and_contact_swallow_failures() {
        let silent = Operation::ALL
            .iter()
            .filter(|op| op.policy() == FailurePolicy::SilentFallback)
            .copied()
            .collect::<Vec<_>>();
        assert_eq!(
            silent,
            vec![Operation::ChatTurn, Operation::ContactAcknowledgment]
        );
    }
}
