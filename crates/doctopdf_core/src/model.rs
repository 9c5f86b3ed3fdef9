use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum number of conversion records kept in history.
pub const HISTORY_CAPACITY: usize = 20;

/// Title stored for a record whose result carried no document title.
pub const UNTITLED: &str = "Untitled";

/// A downloadable file produced by the agent service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_type: Option<String>,
}

impl Artifact {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_format(mut self, format_type: impl Into<String>) -> Self {
        self.format_type = Some(format_type.into());
        self
    }

    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// One persisted entry for a past successful generation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub id: u64,
    pub source_url: String,
    pub title: String,
    pub created_at: String,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// Prepends `record` and evicts from the tail so at most [`HISTORY_CAPACITY`] remain.
pub fn prepend_bounded(history: &mut Vec<ConversionRecord>, record: ConversionRecord) {
    history.insert(0, record);
    history.truncate(HISTORY_CAPACITY);
}

/// Structured result returned by the agent. Every field may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedResult {
    pub source_url: Option<String>,
    pub document_title: Option<String>,
    pub section_count: Option<u64>,
    pub word_count: Option<u64>,
    pub extraction_summary: Option<String>,
    pub clean_copy_info: Option<String>,
    pub compliance_report_info: Option<String>,
}

impl ParsedResult {
    /// Decodes the agent's result payload.
    ///
    /// String payloads are parsed as JSON first; if that fails the raw string is
    /// kept as an opaque value, which like any other non-object decodes to the
    /// empty result.
    pub fn from_payload(payload: Option<&Value>) -> Self {
        let Some(payload) = payload else {
            return Self::default();
        };
        let value: Cow<'_, Value> = match payload {
            Value::String(raw) => serde_json::from_str(raw)
                .map(Cow::Owned)
                .unwrap_or(Cow::Borrowed(payload)),
            other => Cow::Borrowed(other),
        };
        match value.as_ref() {
            Value::Object(fields) => Self::from_fields(fields),
            _ => Self::default(),
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            source_url: text_field(fields, "source_url"),
            document_title: text_field(fields, "document_title"),
            section_count: count_field(fields, "section_count"),
            word_count: count_field(fields, "word_count"),
            extraction_summary: text_field(fields, "extraction_summary"),
            clean_copy_info: text_field(fields, "clean_copy_info"),
            compliance_report_info: text_field(fields, "compliance_report_info"),
        }
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(ToOwned::to_owned)
}

fn count_field(fields: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = fields.get(key)?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n as u64)
    })
}

/// Core-side view of the agent service's reply.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentResponse {
    pub success: bool,
    pub result: Option<Value>,
    pub artifacts: Vec<Artifact>,
    pub error: Option<String>,
}

/// Ways the delegated call can end without a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallFailure {
    Timeout,
    Transport,
}

/// Wall-clock instant at which a reply was received, supplied by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    pub epoch_millis: u64,
    pub rfc3339: String,
}
