use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::operations::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    Live,
    Offline,
}

impl CallMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Offline => "offline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Ok,
    /// A substitute reply was returned in place of a failed call.
    Fallback,
    Failed,
}

impl CallOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Fallback => "fallback",
            Self::Failed => "failed",
        }
    }
}

/// One finished gateway call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub operation: Operation,
    pub mode: CallMode,
    pub outcome: CallOutcome,
    pub elapsed_ms: u64,
    pub model: Option<String>,
    pub detail: Option<String>,
}

impl CallRecord {
    fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert(
            "operation".to_string(),
            Value::String(self.operation.as_str().to_string()),
        );
        payload.insert(
            "policy".to_string(),
            Value::String(self.operation.policy().as_str().to_string()),
        );
        payload.insert(
            "mode".to_string(),
            Value::String(self.mode.as_str().to_string()),
        );
        payload.insert(
            "outcome".to_string(),
            Value::String(self.outcome.as_str().to_string()),
        );
        payload.insert(
            "elapsed_ms".to_string(),
            Value::Number(self.elapsed_ms.into()),
        );
        if let Some(model) = &self.model {
            payload.insert("model".to_string(), Value::String(model.clone()));
        }
        if let Some(detail) = &self.detail {
            payload.insert("detail".to_string(), Value::String(detail.clone()));
        }
        payload
    }
}

/// Append-only `events.jsonl` of gateway calls, one compact object per line.
///
/// Clones share the file handle lock, so one log can be handed to several
/// owners.
#[derive(Debug, Clone)]
pub struct EventLog {
    inner: Arc<EventLogInner>,
}

#[derive(Debug)]
struct EventLogInner {
    path: PathBuf,
    session_id: String,
    lock: Mutex<()>,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_session_id(path, uuid::Uuid::new_v4().to_string())
    }

    pub fn with_session_id(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EventLogInner {
                path: path.into(),
                session_id: session_id.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn record(&self, call: &CallRecord) -> anyhow::Result<Value> {
        let mut event = Map::new();
        event.insert(
            "type".to_string(),
            Value::String("gateway_call".to_string()),
        );
        event.insert(
            "session_id".to_string(),
            Value::String(self.inner.session_id.clone()),
        );
        event.insert(
            "ts".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)),
        );
        event.extend(call.to_payload());

        if let Some(parent) = self.inner.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let line = serde_json::to_string(&event)?;
        let _guard = self
            .inner
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("event log lock poisoned"))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.inner.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;

        Ok(Value::Object(event))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::DateTime;
    use serde_json::Value;

    use super::{CallMode, CallOutcome, CallRecord, EventLog};
    use crate::operations::Operation;

    fn record(operation: Operation, outcome: CallOutcome) -> CallRecord {
        CallRecord {
            operation,
            mode: CallMode::Offline,
            outcome,
            elapsed_ms: 12,
            model: None,
            detail: None,
        }
    }

    #[test]
    fn record_writes_compact_jsonl_line() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("logs").join("events.jsonl");
        let log = EventLog::with_session_id(&path, "session-1");

        let mut call = record(Operation::ItemIdentification, CallOutcome::Failed);
        call.mode = CallMode::Live;
        call.model = Some("gemini-2.5-flash".to_string());
        call.detail = Some("remote model call failed".to_string());
        let emitted = log.record(&call)?;

        let content = fs::read_to_string(&path)?;
        let line = content.lines().next().unwrap_or("");
        let parsed: Value = serde_json::from_str(line)?;

        assert_eq!(parsed, emitted);
        assert_eq!(parsed["type"], "gateway_call");
        assert_eq!(parsed["session_id"], "session-1");
        assert_eq!(parsed["operation"], "item_identification");
        assert_eq!(parsed["policy"], "surfaced");
        assert_eq!(parsed["mode"], "live");
        assert_eq!(parsed["outcome"], "failed");
        assert_eq!(parsed["model"], "gemini-2.5-flash");

        let ts = parsed["ts"].as_str().unwrap_or("");
        DateTime::parse_from_rfc3339(ts)?;
        Ok(())
    }

    #[test]
    fn record_appends_and_omits_empty_fields() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("events.jsonl");
        let log = EventLog::new(&path);

        log.record(&record(Operation::ChatTurn, CallOutcome::Fallback))?;
        log.clone()
            .record(&record(Operation::ContactAcknowledgment, CallOutcome::Ok))?;

        let content = fs::read_to_string(&path)?;
        let lines: Vec<Value> = content
            .lines()
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["outcome"], "fallback");
        assert_eq!(lines[0]["policy"], "silent_fallback");
        assert_eq!(lines[1]["operation"], "contact_acknowledgment");
        assert!(lines[1].get("model").is_none());
        assert_eq!(lines[0]["session_id"], log.session_id());
        assert_eq!(lines[1]["session_id"], log.session_id());
        Ok(())
    }
}
