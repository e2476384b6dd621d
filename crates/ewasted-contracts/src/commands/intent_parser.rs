use std::collections::BTreeMap;

use serde_json::Value;

use crate::shapes::DeviceCondition;

use super::command_registry::{
    CommandSpec, CENTERS_COMMAND, CONTACT_COMMAND, CONTACT_FIELDS, DEVICE_COMMANDS,
    IMPACT_COMMAND, NO_ARG_COMMANDS, SINGLE_PATH_COMMANDS,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub action: String,
    pub raw: String,
    pub prompt: Option<String>,
    pub command_args: BTreeMap<String, Value>,
}

impl Intent {
    fn new(action: &str, raw: &str) -> Self {
        Self {
            action: action.to_string(),
            raw: raw.to_string(),
            prompt: None,
            command_args: BTreeMap::new(),
        }
    }

    fn with_arg(mut self, key: &str, value: Value) -> Self {
        self.command_args.insert(key.to_string(), value);
        self
    }

    /// String argument, `None` when absent, null or blank.
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.command_args
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn arg_f64(&self, key: &str) -> Option<f64> {
        self.command_args.get(key).and_then(Value::as_f64)
    }
}

fn find_action(command: &str, specs: &[CommandSpec]) -> Option<&'static str> {
    specs
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.action)
}

fn split_args(arg: &str) -> Vec<String> {
    if arg.trim().is_empty() {
        return Vec::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect(),
        Err(_) => arg
            .split_whitespace()
            .map(str::to_string)
            .filter(|value| !value.is_empty())
            .collect(),
    }
}

fn joined_or_null(parts: &[String]) -> Value {
    if parts.is_empty() {
        Value::Null
    } else {
        Value::String(parts.join(" "))
    }
}

fn parse_centers_args(intent: Intent, arg: &str) -> Intent {
    let parts = split_args(arg);
    let coordinates = match parts.as_slice() {
        [lat, lon, ..] => match (lat.parse::<f64>(), lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        },
        _ => None,
    };
    match coordinates {
        Some((lat, lon)) => intent
            .with_arg("lat", Value::from(lat))
            .with_arg("lon", Value::from(lon))
            .with_arg("device", joined_or_null(&parts[2..])),
        None => intent
            .with_arg("lat", Value::Null)
            .with_arg("lon", Value::Null)
            .with_arg("device", joined_or_null(&parts)),
    }
}

/// `<condition> | <device>`. Without a bar the condition is the leading
/// two words when they name one (`minor issues`), else the first word.
fn parse_impact_args(intent: Intent, arg: &str) -> Intent {
    let (condition, device) = match arg.split_once('|') {
        Some((condition, device)) => (split_args(condition), split_args(device)),
        None => {
            let mut parts = split_args(arg);
            let two_word = parts.len() >= 2
                && parts[..2].join(" ").parse::<DeviceCondition>().is_ok();
            let width = if two_word { 2 } else { 1 };
            let rest = parts.split_off(width.min(parts.len()));
            (parts, rest)
        }
    };
    intent
        .with_arg("condition", joined_or_null(&condition))
        .with_arg("device", joined_or_null(&device))
}

fn parse_contact_args(mut intent: Intent, arg: &str) -> Intent {
    let mut current: Option<String> = None;
    let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for part in split_args(arg) {
        if let Some((key, value)) = part.split_once('=') {
            let key = key.trim().to_ascii_lowercase();
            if CONTACT_FIELDS.contains(&key.as_str()) {
                let entry = fields.entry(key.clone()).or_default();
                entry.clear();
                if !value.is_empty() {
                    entry.push(value.to_string());
                }
                current = Some(key);
                continue;
            }
        }
        // Unquoted words continue the previous field, so `message=hi there` works.
        if let Some(key) = &current {
            fields.entry(key.clone()).or_default().push(part);
        }
    }
    for field in CONTACT_FIELDS {
        let value = fields
            .get(*field)
            .map(|words| joined_or_null(words))
            .unwrap_or(Value::Null);
        intent.command_args.insert((*field).to_string(), value);
    }
    intent
}

pub fn parse_intent(text: &str) -> Intent {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return Intent::new("noop", text);
    }

    if let Some(slash_tail) = raw_trimmed.strip_prefix('/') {
        let command_len = slash_tail
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
            .count();
        if command_len > 0 {
            let command = slash_tail[..command_len].to_ascii_lowercase();
            let arg = slash_tail[command_len..].trim();

            if let Some(action) = find_action(&command, NO_ARG_COMMANDS) {
                return Intent::new(action, text);
            }

            if let Some(action) = find_action(&command, SINGLE_PATH_COMMANDS) {
                let parts = split_args(arg);
                return Intent::new(action, text).with_arg("path", joined_or_null(&parts));
            }

            if let Some(action) = find_action(&command, DEVICE_COMMANDS) {
                let parts = split_args(arg);
                return Intent::new(action, text).with_arg("device", joined_or_null(&parts));
            }

            if command == CENTERS_COMMAND.command {
                return parse_centers_args(Intent::new(CENTERS_COMMAND.action, text), arg);
            }

            if command == IMPACT_COMMAND.command {
                return parse_impact_args(Intent::new(IMPACT_COMMAND.action, text), arg);
            }

            if command == CONTACT_COMMAND.command {
                return parse_contact_args(Intent::new(CONTACT_COMMAND.action, text), arg);
            }

            return Intent::new("unknown", text)
                .with_arg("command", Value::String(command))
                .with_arg("arg", Value::String(arg.to_string()));
        }
    }

    let mut intent = Intent::new("chat", text);
    intent.prompt = Some(raw_trimmed.to_string());
    intent
}
