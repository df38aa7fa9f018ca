use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Timestamp(i64),
    Fractional(f64),
    Text(String),
}

impl DateValue {
    /// Fireflies reports dates as milliseconds since the epoch, sometimes as a
    /// string. RFC 3339 text is accepted as well.
    pub fn to_datetime(&self) -> Option<OffsetDateTime> {
        match self {
            DateValue::Timestamp(ms) => from_millis(*ms),
            DateValue::Fractional(ms) if ms.is_finite() => from_millis(*ms as i64),
            DateValue::Fractional(_) => None,
            DateValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .and_then(from_millis)
                    .or_else(|| OffsetDateTime::parse(s, &Rfc3339).ok())
            }
        }
    }
}

fn from_millis(ms: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(ms.div_euclid(1000)).ok()
}

/// A transcript as returned by the list query. Fields not used for naming are
/// kept in `extra` so the saved file mirrors the API payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

impl<T> GraphQLResponse<T> {
    pub fn error_messages(&self) -> Option<String> {
        match &self.errors {
            Some(errors) if !errors.is_empty() => Some(
                errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TranscriptsData {
    pub transcripts: Vec<Transcript>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTranscriptData {
    #[serde(rename = "deleteTranscript")]
    pub delete_transcript: Option<DeletedTranscript>,
}

#[derive(Debug, Deserialize)]
pub struct DeletedTranscript {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}
