use std::error::Error as StdError;
use std::time::Instant;

use ewasted_contracts::events::{CallMode, CallOutcome, CallRecord, EventLog};
use ewasted_contracts::image::InlineImage;
use ewasted_contracts::models::{Capability, ModelSelector};
use ewasted_contracts::operations::{FailurePolicy, Operation};
use ewasted_contracts::shapes::{
    parse_structured, CenterList, DeviceCondition, IdentificationResult, ImpactAnalysis,
    RecyclingCenter, StructuredOutput, WipeGuide,
};
use tracing::{debug, error, info, warn};

use crate::config::GatewayConfig;
use crate::error::{CallFailure, GatewayError};
use crate::gemini::{truncate_text, GeminiProvider};
use crate::offline;
use crate::prompts;
use crate::provider::{GenerateRequest, Part, Role, TextProvider, Turn};
use crate::session::{ChatSession, ChatSlot};

/// Reply substituted for any failed chat turn.
pub const CHAT_APOLOGY: &str =
    "I'm sorry, but I encountered an error. Please try again in a moment.";

const PLAIN_TEXT_THINKING_BUDGET: u32 = 0;
const EVENT_DETAIL_MAX_CHARS: usize = 512;

pub struct Gateway {
    config: GatewayConfig,
    provider: Option<Box<dyn TextProvider>>,
    selector: ModelSelector,
    events: Option<EventLog>,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        let provider = config.api_key.as_ref().map(|api_key| {
            Box::new(GeminiProvider::new(config.api_base.clone(), api_key.clone()))
                as Box<dyn TextProvider>
        });
        Self {
            config,
            provider,
            selector: ModelSelector::default(),
            events: None,
        }
    }

    /// Uses `provider` for live calls. Offline mode still applies while the
    /// config carries no API key.
    pub fn with_provider(config: GatewayConfig, provider: Box<dyn TextProvider>) -> Self {
        Self {
            config,
            provider: Some(provider),
            selector: ModelSelector::default(),
            events: None,
        }
    }

    pub fn with_event_log(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    pub fn is_live(&self) -> bool {
        self.live_provider().is_some()
    }

    /// Opens a chat session in `slot` when live and none exists yet.
    pub fn start_session(&self, slot: &mut ChatSlot) {
        if !self.is_live() {
            info!("offline mode: chat replies will be mocked");
            return;
        }
        let session = slot.get_or_insert_with(|| self.new_session());
        debug!(session_id = session.id(), "chat session ready");
    }

    /// One chat turn. Never fails: any problem yields [`CHAT_APOLOGY`].
    pub fn send_turn(&self, slot: &mut ChatSlot, message: &str) -> String {
        let operation = Operation::ChatTurn;
        let started = Instant::now();
        let Some(provider) = self.live_provider() else {
            self.config.offline_delays.wait(operation);
            self.record(call_record(operation, CallMode::Offline, CallOutcome::Ok, started));
            return offline::chat_reply(message);
        };

        let session = slot.get_or_insert_with(|| self.new_session());
        let request = session.request_for(message, Some(PLAIN_TEXT_THINKING_BUDGET));
        let mut record = call_record(operation, CallMode::Live, CallOutcome::Ok, started);
        record.model = Some(request.model.clone());

        match generate_text(provider, &request) {
            Ok(reply) => {
                session.record_exchange(message, &reply);
                record.elapsed_ms = elapsed_ms(started);
                self.record(record);
                reply
            }
            Err(detail) => {
                self.silent_fallback(record, started, detail);
                CHAT_APOLOGY.to_string()
            }
        }
    }

    /// Confirmation text after the contact form was sent. Never fails.
    pub fn acknowledge_contact(&self, name: &str, service: &str) -> String {
        let operation = Operation::ContactAcknowledgment;
        let started = Instant::now();
        let Some(provider) = self.live_provider() else {
            self.config.offline_delays.wait(operation);
            self.record(call_record(operation, CallMode::Offline, CallOutcome::Ok, started));
            return offline::contact_acknowledgment(name, service);
        };

        let mut request = GenerateRequest::new(
            self.model_for(operation),
            vec![Turn::user_text(prompts::contact_prompt(name, service))],
        );
        request.thinking_budget = Some(PLAIN_TEXT_THINKING_BUDGET);
        let mut record = call_record(operation, CallMode::Live, CallOutcome::Ok, started);
        record.model = Some(request.model.clone());

        match generate_text(provider, &request) {
            Ok(reply) => {
                record.elapsed_ms = elapsed_ms(started);
                self.record(record);
                reply
            }
            Err(detail) => {
                self.silent_fallback(record, started, detail);
                contact_fallback(name, service)
            }
        }
    }

    pub fn identify_item(&self, image: &InlineImage) -> Result<IdentificationResult, GatewayError> {
        self.structured_call(
            Operation::ItemIdentification,
            GatewayError::ItemIdentification,
            vec![
                Part::Text(prompts::IDENTIFY_PROMPT.to_string()),
                Part::InlineImage(image.clone()),
            ],
            offline::identification,
        )
    }

    /// Up to three centers, best first. An empty list is a valid answer.
    pub fn find_centers(
        &self,
        latitude: f64,
        longitude: f64,
        device: &str,
    ) -> Result<Vec<RecyclingCenter>, GatewayError> {
        self.structured_call(
            Operation::CenterLookup,
            GatewayError::CenterLookup,
            vec![Part::Text(prompts::centers_prompt(latitude, longitude, device))],
            || CenterList(offline::centers()),
        )
        .map(CenterList::into_inner)
    }

    pub fn analyze_impact(
        &self,
        device: &str,
        condition: DeviceCondition,
    ) -> Result<ImpactAnalysis, GatewayError> {
        let analysis = self.structured_call(
            Operation::ImpactAnalysis,
            GatewayError::ImpactAnalysis,
            vec![Part::Text(prompts::impact_prompt(device, condition))],
            || offline::impact(condition),
        )?;
        if !analysis.follows_condition_rule(condition) {
            warn!(
                condition = %condition,
                expected = %condition.expected_action(),
                actual = %analysis.recommendation.action,
                "model recommendation deviates from the condition rule"
            );
        }
        Ok(analysis)
    }

    pub fn wipe_instructions(&self, device: &str) -> Result<WipeGuide, GatewayError> {
        self.structured_call(
            Operation::WipeInstructions,
            GatewayError::WipeInstructions,
            vec![Part::Text(prompts::wipe_prompt(device))],
            || offline::wipe_guide(device),
        )
    }

    fn live_provider(&self) -> Option<&dyn TextProvider> {
        if !self.config.is_live() {
            return None;
        }
        self.provider.as_deref()
    }

    fn new_session(&self) -> ChatSession {
        ChatSession::new(
            self.model_for(Operation::ChatTurn),
            prompts::CHAT_SYSTEM_INSTRUCTION,
        )
    }

    fn model_for(&self, operation: Operation) -> String {
        let capability = match operation {
            Operation::ChatTurn | Operation::ContactAcknowledgment => Capability::Text,
            Operation::ItemIdentification => Capability::Vision,
            Operation::CenterLookup | Operation::ImpactAnalysis | Operation::WipeInstructions => {
                Capability::StructuredOutput
            }
        };
        match self.selector.select(Some(&self.config.model), capability) {
            Ok(selection) => {
                if let Some(reason) = selection.fallback_reason.as_deref() {
                    debug!(operation = %operation, model = %selection.model, "{reason}");
                }
                selection.model
            }
            Err(err) => {
                debug!(operation = %operation, "{err}; using configured model");
                self.config.model.clone()
            }
        }
    }

    /// Runs a schema-constrained call for an operation whose failures are
    /// surfaced through `wrap`.
    fn structured_call<T: StructuredOutput>(
        &self,
        operation: Operation,
        wrap: fn(CallFailure) -> GatewayError,
        parts: Vec<Part>,
        offline_result: impl FnOnce() -> T,
    ) -> Result<T, GatewayError> {
        debug_assert_eq!(operation.policy(), FailurePolicy::Surfaced);
        let started = Instant::now();
        let Some(provider) = self.live_provider() else {
            info!(operation = %operation, "offline mode: returning mock {}", T::LABEL);
            self.config.offline_delays.wait(operation);
            self.record(call_record(operation, CallMode::Offline, CallOutcome::Ok, started));
            return Ok(offline_result());
        };

        let request = GenerateRequest {
            model: self.model_for(operation),
            system_instruction: None,
            contents: vec![Turn {
                role: Role::User,
                parts,
            }],
            response_schema: Some(T::response_schema()),
            thinking_budget: None,
        };
        let mut record = call_record(operation, CallMode::Live, CallOutcome::Ok, started);
        record.model = Some(request.model.clone());

        let result = provider
            .generate(&request)
            .map_err(CallFailure::remote)
            .and_then(|response| parse_structured::<T>(&response.text).map_err(CallFailure::from));
        record.elapsed_ms = elapsed_ms(started);

        match result {
            Ok(value) => {
                self.record(record);
                Ok(value)
            }
            Err(failure) => {
                let detail = error_chain_text(&failure, EVENT_DETAIL_MAX_CHARS);
                error!(
                    operation = %operation,
                    model = %request.model,
                    error = %detail,
                    "{} call failed",
                    T::LABEL
                );
                record.outcome = CallOutcome::Failed;
                record.detail = Some(detail);
                self.record(record);
                Err(wrap(failure))
            }
        }
    }

    fn silent_fallback(&self, mut record: CallRecord, started: Instant, detail: String) {
        warn!(
            operation = %record.operation,
            error = %detail,
            "model call failed; substituting fallback reply"
        );
        record.elapsed_ms = elapsed_ms(started);
        record.outcome = CallOutcome::Fallback;
        record.detail = Some(detail);
        self.record(record);
    }

    fn record(&self, record: CallRecord) {
        let Some(events) = self.events.as_ref() else {
            return;
        };
        if let Err(err) = events.record(&record) {
            warn!(path = %events.path().display(), "failed to write gateway event: {err:#}");
        }
    }
}

fn contact_fallback(name: &str, service: &str) -> String {
    format!(
        "Thank you for your message, {name}! We have received your inquiry about our {service} \
         service and will be in touch shortly. Your commitment to responsible recycling is \
         greatly appreciated."
    )
}

/// Trimmed reply text, or a description of why there is none.
fn generate_text(provider: &dyn TextProvider, request: &GenerateRequest) -> Result<String, String> {
    match provider.generate(request) {
        Ok(response) => {
            let text = response.text.trim();
            if text.is_empty() {
                Err(format!("{} returned an empty reply", provider.name()))
            } else {
                Ok(text.to_string())
            }
        }
        Err(err) => Err(truncate_text(&format!("{err:#}"), EVENT_DETAIL_MAX_CHARS)),
    }
}

fn call_record(
    operation: Operation,
    mode: CallMode,
    outcome: CallOutcome,
    started: Instant,
) -> CallRecord {
    CallRecord {
        operation,
        mode,
        outcome,
        elapsed_ms: elapsed_ms(started),
        model: None,
        detail: None,
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn error_chain_text(err: &(dyn StdError + 'static), max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(err);
    while let Some(cause) = current {
        let text = cause.to_string();
        let trimmed = text.trim();
        if !trimmed.is_empty() && parts.last().map(String::as_str) != Some(trimmed) {
            parts.push(trimmed.to_string());
        }
        current = cause.source();
    }
    truncate_text(&parts.join(" | caused by: "), max_chars)
}
