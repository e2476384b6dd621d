use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::{json, Map, Value};

use crate::provider::{GenerateRequest, GenerateResponse, Part, TextProvider, Turn};

/// `generateContent` over the Gemini REST API.
pub struct GeminiProvider {
    api_base: String,
    api_key: String,
    http: HttpClient,
}

impl GeminiProvider {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http: HttpClient::new(),
        }
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn build_payload(request: &GenerateRequest) -> Value {
        let mut payload = Map::new();
        payload.insert(
            "contents".to_string(),
            Value::Array(request.contents.iter().map(turn_to_json).collect()),
        );
        if let Some(instruction) = request
            .system_instruction
            .as_deref()
            .filter(|value| !value.trim().is_empty())
        {
            payload.insert(
                "systemInstruction".to_string(),
                json!({ "parts": [{ "text": instruction }] }),
            );
        }

        let mut generation_config = Map::new();
        if let Some(schema) = request.response_schema.as_ref() {
            generation_config.insert(
                "responseMimeType".to_string(),
                Value::String("application/json".to_string()),
            );
            generation_config.insert("responseSchema".to_string(), schema.to_gemini());
        }
        if let Some(budget) = request.thinking_budget {
            generation_config.insert(
                "thinkingConfig".to_string(),
                json!({ "thinkingBudget": budget }),
            );
        }
        if !generation_config.is_empty() {
            payload.insert(
                "generationConfig".to_string(),
                Value::Object(generation_config),
            );
        }
        Value::Object(payload)
    }

    fn extract_text(payload: &Value) -> Result<GenerateResponse> {
        if let Some(reason) = payload
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
        {
            bail!("Gemini blocked the prompt ({reason})");
        }
        let Some(candidate) = payload
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|rows| rows.first())
        else {
            bail!("Gemini returned no candidates");
        };
        let text: String = candidate
            .pointer("/content/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        let finish_reason = candidate
            .get("finishReason")
            .and_then(Value::as_str)
            .map(str::to_string);
        if text.trim().is_empty() {
            bail!(
                "Gemini returned no text (finish reason: {})",
                finish_reason.as_deref().unwrap_or("unknown")
            );
        }
        Ok(GenerateResponse {
            text,
            finish_reason,
        })
    }
}

impl TextProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let endpoint = self.endpoint_for_model(&request.model);
        let payload = Self::build_payload(request);
        tracing::debug!(
            endpoint = %endpoint,
            turns = request.contents.len(),
            structured = request.response_schema.is_some(),
            "dispatching Gemini request"
        );
        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .context("Gemini request failed")?;
        let response_payload = response_json_or_error("Gemini", response)?;
        Self::extract_text(&response_payload)
    }
}

fn turn_to_json(turn: &Turn) -> Value {
    let parts: Vec<Value> = turn
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => json!({ "text": text }),
            Part::InlineImage(image) => json!({
                "inlineData": {
                    "mimeType": image.mime_type(),
                    "data": image.data(),
                }
            }),
        })
        .collect();
    json!({
        "role": turn.role.as_str(),
        "parts": parts,
    })
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(&body, 512)
        );
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}

pub(crate) fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
