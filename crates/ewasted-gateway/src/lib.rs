//! AI gateway for the E-Wasted site: every call to the hosted model goes
//! through [`Gateway`], which applies the per-operation failure policy and
//! falls back to canned offline results when no API key is configured.

mod config;
mod error;
mod gateway;
mod gemini;
mod offline;
mod prompts;
mod provider;
mod session;

pub use config::{GatewayConfig, DEFAULT_API_BASE, DEFAULT_MODEL};
pub use error::{CallFailure, GatewayError};
pub use gateway::{Gateway, CHAT_APOLOGY};
pub use gemini::GeminiProvider;
pub use offline::OfflineDelays;
pub use provider::{GenerateRequest, GenerateResponse, Part, Role, TextProvider, Turn};
pub use session::{ChatSession, ChatSlot};
