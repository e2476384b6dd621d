use std::error::Error as StdError;

use ewasted_contracts::operations::Operation;
use ewasted_contracts::shapes::ShapeError;
use thiserror::Error;

/// Why a remote call produced no usable result.
#[derive(Debug, Error)]
pub enum CallFailure {
    #[error("remote model call failed: {0}")]
    Remote(#[source] Box<dyn StdError + Send + Sync>),
    #[error("model reply did not match the declared shape: {0}")]
    Shape(#[from] ShapeError),
}

impl CallFailure {
    pub(crate) fn remote(err: anyhow::Error) -> Self {
        Self::Remote(err.into())
    }
}

/// A failure surfaced to the caller. Display is the user-facing message.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Could not identify the item. Please try a clearer image.")]
    ItemIdentification(#[source] CallFailure),
    #[error("Could not find recycling centers. Please try again later.")]
    CenterLookup(#[source] CallFailure),
    #[error("Could not analyze the device. Please try again.")]
    ImpactAnalysis(#[source] CallFailure),
    #[error("Could not generate security instructions. Please try again.")]
    WipeInstructions(#[source] CallFailure),
}

impl GatewayError {
    pub fn operation(&self) -> Operation {
        match self {
            Self::ItemIdentification(_) => Operation::ItemIdentification,
            Self::CenterLookup(_) => Operation::CenterLookup,
            Self::ImpactAnalysis(_) => Operation::ImpactAnalysis,
            Self::WipeInstructions(_) => Operation::WipeInstructions,
        }
    }

    pub fn failure(&self) -> &CallFailure {
        match self {
            Self::ItemIdentification(failure)
            | Self::CenterLookup(failure)
            | Self::ImpactAnalysis(failure)
            | Self::WipeInstructions(failure) => failure,
        }
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use ewasted_contracts::operations::Operation;
    use ewasted_contracts::shapes::ShapeError;

    use super::{CallFailure, GatewayError};

    #[test]
    fn display_is_the_fixed_user_message() {
        let cases: [(fn(CallFailure) -> GatewayError, Operation, &str); 4] = [
            (
                GatewayError::ItemIdentification,
                Operation::ItemIdentification,
                "Could not identify the item. Please try a clearer image.",
            ),
            (
                GatewayError::CenterLookup,
                Operation::CenterLookup,
                "Could not find recycling centers. Please try again later.",
            ),
            (
                GatewayError::ImpactAnalysis,
                Operation::ImpactAnalysis,
                "Could not analyze the device. Please try again.",
            ),
            (
                GatewayError::WipeInstructions,
                Operation::WipeInstructions,
                "Could not generate security instructions. Please try again.",
            ),
        ];
        for (wrap, operation, message) in cases {
            let err = wrap(CallFailure::remote(anyhow::anyhow!("boom")));
            assert_eq!(err.operation(), operation);
            assert_eq!(err.user_message(), message);
        }
    }

    #[test]
    fn source_chain_keeps_the_cause() {
        let err = GatewayError::WipeInstructions(CallFailure::Shape(ShapeError::Invariant(
            "instructions must have 3 to 5 steps".to_string(),
        )));
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert!(source.unwrap_or_default().contains("3 to 5 steps"));
        assert!(matches!(err.failure(), CallFailure::Shape(_)));
    }
}
