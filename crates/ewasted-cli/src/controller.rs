use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use ewasted_contracts::image::InlineImage;
use ewasted_contracts::shapes::{DeviceCondition, IdentificationResult};
use ewasted_gateway::{ChatSlot, Gateway};
use serde_json::Value;
use tracing::debug;

use crate::render;

const NEEDS_IMAGE: &str = "Please upload an image first.";
const NEEDS_DEVICE: &str = "Please enter a device type.";
const NEEDS_LOCATION: &str = "Could not get your location. Please enable location services.";
const NEEDS_ALL_FIELDS: &str = "Please fill out all fields.";
const INVALID_FILE_TYPE: &str = "Invalid file type. Please upload an image.";
const UNREADABLE_FILE: &str = "Could not read the selected file.";
const BROKEN_IMAGE: &str = "There was an error processing the image file.";
const ALREADY_RUNNING: &str = "A request is already in progress. Please wait for it to finish.";
const NOTHING_TO_PREFILL: &str = "Identify a recyclable item first, then use /prefill.";

/// One interactive widget. Each surface accepts one submission at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Identifier,
    Locator,
    Analyzer,
    SecurityAdvisor,
    Contact,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

/// What a surface shows after a handler ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub tone: Tone,
    pub body: String,
    /// JSON text of the structured result, when there is one.
    pub json: Option<String>,
}

impl Rendered {
    fn new(tone: Tone, body: impl Into<String>) -> Self {
        Self {
            tone,
            body: body.into(),
            json: None,
        }
    }

    fn with_json<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.json = serde_json::to_string(value).ok();
        self
    }

    pub fn is_error(&self) -> bool {
        self.tone == Tone::Error
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub service: String,
    pub message: String,
}

impl ContactForm {
    fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.service, &self.message]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

#[derive(Debug, Default)]
struct UiState {
    staged_image: Option<InlineImage>,
    last_identified: Option<IdentificationResult>,
}

/// Releases a surface when dropped.
pub(crate) struct BusyGuard<'a> {
    busy: &'a Mutex<HashSet<Surface>>,
    surface: Surface,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        lock(self.busy).remove(&self.surface);
    }
}

pub struct Controller {
    gateway: Gateway,
    location: Option<(f64, f64)>,
    busy: Mutex<HashSet<Surface>>,
    state: Mutex<UiState>,
    chat: Mutex<ChatSlot>,
}

impl Controller {
    pub fn new(gateway: Gateway, location: Option<(f64, f64)>) -> Self {
        Self {
            gateway,
            location,
            busy: Mutex::new(HashSet::new()),
            state: Mutex::new(UiState::default()),
            chat: Mutex::new(ChatSlot::new()),
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub(crate) fn begin(&self, surface: Surface) -> Option<BusyGuard<'_>> {
        if !lock(&self.busy).insert(surface) {
            debug!(?surface, "ignoring submission while one is in flight");
            return None;
        }
        Some(BusyGuard {
            busy: &self.busy,
            surface,
        })
    }

    /// Reads an image file and stages it for identification.
    pub fn stage_image_file(&self, path: &Path) -> Rendered {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(path = %path.display(), "image read failed: {err}");
                return Rendered::new(Tone::Error, UNREADABLE_FILE);
            }
        };
        let Ok(format) = image::guess_format(&bytes) else {
            return Rendered::new(Tone::Error, INVALID_FILE_TYPE);
        };
        match InlineImage::from_bytes(&bytes, format.to_mime_type()) {
            Ok(image) => self.stage_image_data_url(&image.to_data_url()),
            Err(_) => Rendered::new(Tone::Error, INVALID_FILE_TYPE),
        }
    }

    pub fn stage_image_data_url(&self, data_url: &str) -> Rendered {
        match InlineImage::from_data_url(data_url) {
            Ok(image) => {
                let body = format!(
                    "Image ready ({}). Use /identify to analyze it.",
                    image.mime_type()
                );
                let mut state = lock(&self.state);
                state.staged_image = Some(image);
                state.last_identified = None;
                Rendered::new(Tone::Info, body)
            }
            Err(err) => {
                debug!("data URL rejected: {err}");
                let mut state = lock(&self.state);
                state.staged_image = None;
                state.last_identified = None;
                Rendered::new(Tone::Error, BROKEN_IMAGE)
            }
        }
    }

    pub fn identify(&self) -> Rendered {
        let Some(image) = lock(&self.state).staged_image.clone() else {
            return Rendered::new(Tone::Error, NEEDS_IMAGE);
        };
        let Some(_guard) = self.begin(Surface::Identifier) else {
            return Rendered::new(Tone::Warning, ALREADY_RUNNING);
        };
        match self.gateway.identify_item(&image) {
            Ok(result) => {
                let rendered =
                    Rendered::new(Tone::Success, render::identification(&result)).with_json(&result);
                lock(&self.state).last_identified = Some(result);
                rendered
            }
            Err(err) => {
                lock(&self.state).last_identified = None;
                Rendered::new(Tone::Error, err.user_message())
            }
        }
    }

    /// `location` overrides the configured one.
    pub fn find_centers(&self, device: &str, location: Option<(f64, f64)>) -> Rendered {
        let device = device.trim();
        if device.is_empty() {
            return Rendered::new(Tone::Warning, NEEDS_DEVICE);
        }
        let Some((latitude, longitude)) = location.or(self.location) else {
            return Rendered::new(Tone::Error, NEEDS_LOCATION);
        };
        let Some(_guard) = self.begin(Surface::Locator) else {
            return Rendered::new(Tone::Warning, ALREADY_RUNNING);
        };
        match self.gateway.find_centers(latitude, longitude, device) {
            Ok(centers) if centers.is_empty() => {
                Rendered::new(Tone::Info, render::NO_CENTERS).with_json(&centers)
            }
            Ok(centers) => {
                Rendered::new(Tone::Success, render::centers(&centers)).with_json(&centers)
            }
            Err(err) => Rendered::new(Tone::Error, err.user_message()),
        }
    }

    pub fn analyze(&self, device: &str, condition: &str) -> Rendered {
        let device = device.trim();
        if device.is_empty() {
            return Rendered::new(Tone::Warning, NEEDS_DEVICE);
        }
        let condition = match condition.parse::<DeviceCondition>() {
            Ok(condition) => condition,
            Err(message) => return Rendered::new(Tone::Warning, message),
        };
        let Some(_guard) = self.begin(Surface::Analyzer) else {
            return Rendered::new(Tone::Warning, ALREADY_RUNNING);
        };
        match self.gateway.analyze_impact(device, condition) {
            Ok(analysis) => {
                Rendered::new(Tone::Success, render::impact(&analysis)).with_json(&analysis)
            }
            Err(err) => Rendered::new(Tone::Error, err.user_message()),
        }
    }

    pub fn wipe(&self, device: &str) -> Rendered {
        let device = device.trim();
        if device.is_empty() {
            return Rendered::new(Tone::Warning, NEEDS_DEVICE);
        }
        let Some(_guard) = self.begin(Surface::SecurityAdvisor) else {
            return Rendered::new(Tone::Warning, ALREADY_RUNNING);
        };
        match self.gateway.wipe_instructions(device) {
            Ok(guide) => {
                Rendered::new(Tone::Success, render::wipe_guide(&guide)).with_json(&guide)
            }
            Err(err) => Rendered::new(Tone::Error, err.user_message()),
        }
    }

    pub fn contact(&self, form: &ContactForm) -> Rendered {
        if !form.is_complete() {
            return Rendered::new(Tone::Warning, NEEDS_ALL_FIELDS);
        }
        let Some(_guard) = self.begin(Surface::Contact) else {
            return Rendered::new(Tone::Warning, ALREADY_RUNNING);
        };
        let acknowledgment = self
            .gateway
            .acknowledge_contact(form.name.trim(), form.service.trim());
        let mut rendered = Rendered::new(Tone::Success, render::contact_sent(&acknowledgment));
        rendered.json = Some(Value::String(acknowledgment).to_string());
        rendered
    }

    /// Pickup request text for the last recyclable identification.
    pub fn contact_prefill(&self) -> Rendered {
        let state = lock(&self.state);
        match state.last_identified.as_ref() {
            Some(result) if result.recyclable => Rendered::new(Tone::Info, result.pickup_message()),
            _ => Rendered::new(Tone::Warning, NOTHING_TO_PREFILL),
        }
    }

    pub fn open_chat(&self) -> Rendered {
        self.gateway.start_session(&mut lock(&self.chat));
        Rendered::new(Tone::Info, render::CHAT_GREETING)
    }

    /// Blank input renders nothing.
    pub fn chat(&self, message: &str) -> Rendered {
        let message = message.trim();
        if message.is_empty() {
            return Rendered::new(Tone::Info, "");
        }
        let Some(_guard) = self.begin(Surface::Chat) else {
            return Rendered::new(Tone::Warning, ALREADY_RUNNING);
        };
        let reply = self.gateway.send_turn(&mut lock(&self.chat), message);
        Rendered::new(Tone::Info, reply)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::Mutex;

    use anyhow::anyhow;
    use ewasted_gateway::{
        Gateway, GatewayConfig, GenerateRequest, GenerateResponse, OfflineDelays, TextProvider,
    };

    use super::{ContactForm, Controller, Surface, Tone};

    const PNG_BYTES: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    /// Answers with the queued replies, then fails every call.
    struct QueuedProvider {
        replies: Mutex<VecDeque<String>>,
    }

    impl TextProvider for QueuedProvider {
        fn name(&self) -> &str {
            "queued"
        }

        fn generate(&self, _request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            let next = self
                .replies
                .lock()
                .map_err(|_| anyhow!("poisoned"))?
                .pop_front();
            match next {
                Some(text) => Ok(GenerateResponse {
                    text,
                    finish_reason: Some("STOP".to_string()),
                }),
                None => Err(anyhow!("upstream unavailable")),
            }
        }
    }

    fn live_controller(replies: &[&str]) -> Controller {
        let provider = QueuedProvider {
            replies: Mutex::new(replies.iter().map(|reply| reply.to_string()).collect()),
        };
        let config = GatewayConfig::offline()
            .with_api_key(Some("test-key".to_string()))
            .with_offline_delays(OfflineDelays::none());
        Controller::new(Gateway::with_provider(config, Box::new(provider)), None)
    }

    fn controller(location: Option<(f64, f64)>) -> Controller {
        let config = GatewayConfig::offline().with_offline_delays(OfflineDelays::none());
        Controller::new(Gateway::new(config), location)
    }

    #[test]
    fn identify_requires_a_staged_image() {
        let rendered = controller(None).identify();
        assert_eq!(rendered.tone, Tone::Error);
        assert_eq!(rendered.body, "Please upload an image first.");
    }

    #[test]
    fn staging_rejects_non_images_and_missing_files() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let text_path = temp.path().join("notes.txt");
        fs::write(&text_path, "just text")?;

        let controller = controller(None);
        let rendered = controller.stage_image_file(&text_path);
        assert_eq!(rendered.body, "Invalid file type. Please upload an image.");

        let rendered = controller.stage_image_file(&temp.path().join("missing.png"));
        assert_eq!(rendered.body, "Could not read the selected file.");

        let rendered = controller.stage_image_data_url("data:image/png;base64,@@@");
        assert_eq!(rendered.body, "There was an error processing the image file.");
        Ok(())
    }

    #[test]
    fn staged_image_is_identified_and_prefills_contact() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("laptop.png");
        fs::write(&path, PNG_BYTES)?;

        let controller = controller(None);
        assert_eq!(controller.contact_prefill().tone, Tone::Warning);

        let staged = controller.stage_image_file(&path);
        assert_eq!(staged.tone, Tone::Info);
        assert!(staged.body.contains("image/png"));

        let rendered = controller.identify();
        assert_eq!(rendered.tone, Tone::Success);
        assert!(rendered.body.contains("Old Laptop"));
        let json: serde_json::Value = serde_json::from_str(rendered.json.as_deref().unwrap_or(""))?;
        assert_eq!(json["category"], "Computers & Laptops");

        let prefill = controller.contact_prefill();
        assert_eq!(
            prefill.body,
            "I'd like to schedule a pickup for my identified e-waste: Old Laptop (Computers & Laptops)."
        );
        Ok(())
    }

    #[test]
    fn prefill_forgets_identification_after_restage_or_failure() {
        const PNG_URL: &str = "data:image/png;base64,iVBORw0KGgo=";
        let controller = live_controller(&[
            r#"{"itemName":"Dell Laptop","category":"Computers & Laptops","recyclable":true}"#,
            r#"{"itemName":"Dell Laptop","category":"Computers & Laptops","recyclable":true}"#,
        ]);

        assert_eq!(controller.stage_image_data_url(PNG_URL).tone, Tone::Info);
        assert_eq!(controller.identify().tone, Tone::Success);
        assert_eq!(controller.contact_prefill().tone, Tone::Info);

        // A newly staged image hides the previous result.
        assert_eq!(controller.stage_image_data_url(PNG_URL).tone, Tone::Info);
        assert_eq!(controller.contact_prefill().tone, Tone::Warning);

        assert_eq!(controller.identify().tone, Tone::Success);
        assert_eq!(controller.contact_prefill().tone, Tone::Info);

        // The provider has run dry, so this identification fails.
        let failed = controller.identify();
        assert_eq!(failed.tone, Tone::Error);
        assert_eq!(
            failed.body,
            "Could not identify the item. Please try a clearer image."
        );
        assert_eq!(controller.contact_prefill().tone, Tone::Warning);
    }

    #[test]
    fn locator_checks_device_then_location() {
        let controller = controller(None);
        assert_eq!(
            controller.find_centers("  ", Some((1.0, 2.0))).body,
            "Please enter a device type."
        );
        let rendered = controller.find_centers("laptop", None);
        assert_eq!(rendered.tone, Tone::Error);
        assert!(rendered.body.starts_with("Could not get your location."));

        let rendered = controller.find_centers("laptop", Some((40.7, -74.0)));
        assert_eq!(rendered.tone, Tone::Success);
        assert!(rendered.body.contains("Mock GreenLeaf Recycling"));
    }

    #[test]
    fn configured_location_is_used_by_default() {
        let rendered = controller(Some((51.5, -0.1))).find_centers("phone", None);
        assert_eq!(rendered.tone, Tone::Success);
    }

    #[test]
    fn duplicate_submission_is_ignored_while_in_flight() {
        let controller = controller(Some((0.0, 0.0)));
        let guard = controller.begin(Surface::Locator);
        assert!(guard.is_some());

        let rendered = controller.find_centers("tv", None);
        assert_eq!(rendered.tone, Tone::Warning);
        assert!(rendered.body.contains("already in progress"));

        // Other surfaces are independent.
        assert_eq!(controller.wipe("tv").tone, Tone::Success);

        drop(guard);
        assert_eq!(controller.find_centers("tv", None).tone, Tone::Success);
    }

    #[test]
    fn analyzer_validates_condition() {
        let controller = controller(None);
        let rendered = controller.analyze("iPad", "exploded");
        assert_eq!(rendered.tone, Tone::Warning);

        let rendered = controller.analyze("iPad", "minor issues");
        assert_eq!(rendered.tone, Tone::Success);
        assert!(rendered.body.contains("Refurbish"));
    }

    #[test]
    fn contact_requires_every_field() {
        let controller = controller(None);
        let mut form = ContactForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            service: "Residential Drop-off".to_string(),
            message: " ".to_string(),
        };
        assert_eq!(controller.contact(&form).body, "Please fill out all fields.");

        form.message = "Two old monitors".to_string();
        let rendered = controller.contact(&form);
        assert_eq!(rendered.tone, Tone::Success);
        assert!(rendered.body.starts_with("Message Sent!\n"));
        assert!(rendered.body.contains("Ada"));
    }

    #[test]
    fn chat_greets_and_replies_offline() {
        let controller = controller(None);
        assert!(controller.open_chat().body.starts_with("Hello!"));
        assert!(controller.chat("   ").body.is_empty());
        let reply = controller.chat("What about batteries?");
        assert!(reply.body.contains("mock AI response"));
    }
}
