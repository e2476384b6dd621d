use crate::provider::{GenerateRequest, Turn};

/// A live multi-turn conversation with the assistant persona.
///
/// The whole history goes out with every turn; the remote side keeps no
/// state between requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    id: String,
    model: String,
    system_instruction: String,
    history: Vec<Turn>,
}

impl ChatSession {
    pub(crate) fn new(model: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            model: model.into(),
            system_instruction: system_instruction.into(),
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Request for the next turn; history is not touched until the reply lands.
    pub(crate) fn request_for(
        &self,
        message: &str,
        thinking_budget: Option<u32>,
    ) -> GenerateRequest {
        let mut contents = self.history.clone();
        contents.push(Turn::user_text(message));
        GenerateRequest {
            model: self.model.clone(),
            system_instruction: Some(self.system_instruction.clone()),
            contents,
            response_schema: None,
            thinking_budget,
        }
    }

    pub(crate) fn record_exchange(&mut self, message: &str, reply: &str) {
        self.history.push(Turn::user_text(message));
        self.history.push(Turn::model_text(reply));
    }
}

/// Caller-owned holder for at most one chat session per conversation surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSlot {
    session: Option<ChatSession>,
}

impl ChatSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn clear(&mut self) {
        self.session = None;
    }

    pub(crate) fn get_or_insert_with(
        &mut self,
        create: impl FnOnce() -> ChatSession,
    ) -> &mut ChatSession {
        self.session.get_or_insert_with(create)
    }
}
