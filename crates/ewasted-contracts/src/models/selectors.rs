use thiserror::Error;

use super::registry::{Capability, ModelRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub model: String,
    pub requested: Option<String>,
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no models available for capability '{0}'")]
pub struct SelectionError(pub Capability);

#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    pub registry: ModelRegistry,
}

impl ModelSelector {
    pub fn new(registry: Option<ModelRegistry>) -> Self {
        Self {
            registry: registry.unwrap_or_default(),
        }
    }

    /// Resolves the model for one call.
    ///
    /// A registered model lacking the capability falls back to the default
    /// for that capability. Unregistered names pass through untouched so newer
    /// remote models can be used without a registry update.
    pub fn select(
        &self,
        requested: Option<&str>,
        capability: Capability,
    ) -> Result<ModelSelection, SelectionError> {
        let requested = requested
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        let fallback_reason = match requested.as_deref() {
            Some(name) => match self.registry.get(name) {
                Some(model) if model.supports(capability) => {
                    return Ok(ModelSelection {
                        model: model.name.clone(),
                        requested,
                        fallback_reason: None,
                    });
                }
                Some(_) => format!("Model '{name}' does not support {capability}; using default."),
                None => {
                    return Ok(ModelSelection {
                        model: name.to_string(),
                        requested: requested.clone(),
                        fallback_reason: Some(format!(
                            "Model '{name}' is not in the registry; passing it through."
                        )),
                    });
                }
            },
            None => "No model specified; using default.".to_string(),
        };

        let Some(model) = self.registry.by_capability(capability).first().copied() else {
            return Err(SelectionError(capability));
        };
        Ok(ModelSelection {
            model: model.name.clone(),
            requested,
            fallback_reason: Some(fallback_reason),
        })
    }
}
