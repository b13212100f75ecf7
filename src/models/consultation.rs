// Consultation models - one prospective student and their call tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Country value students pick when they have no preference yet. Re-labeled
/// at render and aggregation time only; the stored record keeps it as-is.
pub const GUIDANCE_SENTINEL: &str = "No Idea/ Want More Information";

/// Outreach state of a consultation.
///
/// The last three variants are legacy values still present on old records;
/// they deserialize losslessly but are never written back, and the report
/// aggregate counts only the canonical six.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    NotCalled,
    Missed,
    DeadLeads,
    Scheduled,
    Completed,
    GoingAbroad,
    NoResponse,
    CallbackRequested,
    Called,
}

impl CallStatus {
    pub const CANONICAL: [CallStatus; 6] = [
        CallStatus::NotCalled,
        CallStatus::Missed,
        CallStatus::DeadLeads,
        CallStatus::Scheduled,
        CallStatus::Completed,
        CallStatus::GoingAbroad,
    ];

    /// Wire name, as stored by the backend and shown in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::NotCalled => "NOT_CALLED",
            CallStatus::Missed => "MISSED",
            CallStatus::DeadLeads => "DEAD_LEADS",
            CallStatus::Scheduled => "SCHEDULED",
            CallStatus::Completed => "COMPLETED",
            CallStatus::GoingAbroad => "GOING_ABROAD",
            CallStatus::NoResponse => "NO_RESPONSE",
            CallStatus::CallbackRequested => "CALLBACK_REQUESTED",
            CallStatus::Called => "CALLED",
        }
    }

    /// Human-readable label for tables and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            CallStatus::NotCalled => "Not Called",
            CallStatus::Missed => "Missed",
            CallStatus::DeadLeads => "Dead Leads",
            CallStatus::Scheduled => "Scheduled",
            CallStatus::Completed => "Completed",
            CallStatus::GoingAbroad => "Going Abroad",
            CallStatus::NoResponse => "No Response",
            CallStatus::CallbackRequested => "Callback Requested",
            CallStatus::Called => "Called",
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(
            self,
            CallStatus::NoResponse | CallStatus::CallbackRequested | CallStatus::Called
        )
    }
}

impl std::str::FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CallStatus::CANONICAL
            .iter()
            .chain(&[
                CallStatus::NoResponse,
                CallStatus::CallbackRequested,
                CallStatus::Called,
            ])
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown call status '{}'", s))
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One past call, appended by the server on every status change.
/// This crate never mutates history in place; it only replaces the whole
/// record with a server echo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallHistoryEntry {
    #[serde(default)]
    pub status: Option<CallStatus>,
    #[serde(default)]
    pub called_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A consultation record, owned entirely by the external API. Every fetch
/// fully replaces the in-memory list; nothing here is persisted locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub contact: String,
    pub state: String,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub interested_in: Option<String>,
    /// NEET score as the backend stores it: a numeric string, sometimes a
    /// bare number, often empty. Aggregation ignores unparseable values.
    #[serde(default, deserialize_with = "string_or_number")]
    pub neet_score: Option<String>,
    #[serde(default)]
    pub preferred_country: Option<String>,
    #[serde(default)]
    pub preferred_counsellor: Option<String>,
    #[serde(default)]
    pub call_status: Option<CallStatus>,
    #[serde(default)]
    pub call_notes: Option<String>,
    #[serde(default)]
    pub called_by: Option<String>,
    #[serde(default)]
    pub called_by_id: Option<String>,
    #[serde(default)]
    pub last_called_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub call_history: Vec<CallHistoryEntry>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Consultation {
    /// Call status with the view-layer default. The record itself keeps
    /// `None`; the backend remains the source of truth.
    pub fn effective_status(&self) -> CallStatus {
        self.call_status.unwrap_or(CallStatus::NotCalled)
    }

    pub fn district_label(&self) -> &str {
        non_empty(&self.district).unwrap_or("Not Specified")
    }

    pub fn interested_in_label(&self) -> &str {
        non_empty(&self.interested_in).unwrap_or("MBBS From Abroad")
    }

    pub fn counsellor_label(&self) -> &str {
        non_empty(&self.preferred_counsellor).unwrap_or("Not Assigned")
    }

    pub fn country_label(&self) -> &str {
        non_empty(&self.preferred_country).unwrap_or("Not Specified")
    }

    /// Preferred country for rendering and export: the guidance sentinel
    /// reads as "Seeking Guidance", absence as an empty field.
    pub fn display_country(&self) -> &str {
        match non_empty(&self.preferred_country) {
            Some(GUIDANCE_SENTINEL) => "Seeking Guidance",
            Some(country) => country,
            None => "",
        }
    }

    /// Preferred country for aggregation: the sentinel collapses to
    /// "Guidance", absent values drop out of the count entirely.
    pub fn aggregation_country(&self) -> Option<&str> {
        match non_empty(&self.preferred_country) {
            Some(GUIDANCE_SENTINEL) => Some("Guidance"),
            other => other,
        }
    }

    /// Parsed NEET score, `None` when missing or unparseable.
    pub fn neet_score_value(&self) -> Option<f64> {
        self.neet_score
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// Accepts both `"542"` and `542` for the score field.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
