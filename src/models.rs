use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::Collection;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub city: String,
    pub country: String,
    pub region: String,
}

impl Location {
    pub fn unknown() -> Self {
        Self {
            city: "Unknown".to_string(),
            country: "Unknown".to_string(),
            region: "Unknown".to_string(),
        }
    }

    pub fn local() -> Self {
        Self {
            city: "Local".to_string(),
            country: "Development".to_string(),
            region: "Local".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    pub id: String,
    pub timestamp: String,
    pub ip: String,
    pub user_agent: String,
    pub browser: String,
    pub browser_version: String,
    pub os: String,
    pub platform: String,
    pub is_mobile: bool,
    pub is_desktop: bool,
    pub is_tablet: bool,
    pub page: String,
    pub referrer: String,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub location: Location,
}

impl VisitorRecord {
    pub fn device_label(&self) -> &'static str {
        if self.is_mobile {
            "📱 Mobile"
        } else if self.is_tablet {
            "📱 Tablet"
        } else {
            "💻 Desktop"
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadKind {
    Loan,
    Debt,
    Contact,
}

impl LeadKind {
    pub fn type_tag(self) -> &'static str {
        match self {
            Self::Loan => "loan",
            Self::Debt => "debt_management",
            Self::Contact => "contact",
        }
    }

    pub fn collection(self) -> Collection {
        match self {
            Self::Loan => Collection::LoanLeads,
            Self::Debt => Collection::DebtLeads,
            Self::Contact => Collection::ContactLeads,
        }
    }
}

/// A form submission. Submitted fields are stored flat next to the
/// system-assigned keys, which always take precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub ip: String,
}

const LEAD_RESERVED_KEYS: [&str; 4] = ["id", "timestamp", "type", "ip"];

impl Lead {
    pub fn new(kind: LeadKind, mut fields: Map<String, Value>, ip: String) -> Self {
        for key in LEAD_RESERVED_KEYS {
            fields.remove(key);
        }
        Self {
            id: new_id(),
            timestamp: timestamp_now(),
            kind: kind.type_tag().to_string(),
            fields,
            ip,
        }
    }

    /// Renders a submitted field the way an unset form value shows up in
    /// notifications.
    pub fn field(&self, key: &str) -> String {
        match self.fields.get(key) {
            None | Some(Value::Null) => "undefined".to_string(),
            Some(Value::String(value)) => value.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Like [`Lead::field`] but falls back to `N/A` for empty values.
    pub fn optional_field(&self, key: &str) -> String {
        match self.fields.get(key) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => "N/A".to_string(),
            Some(Value::String(value)) if value.is_empty() => "N/A".to_string(),
            Some(Value::String(value)) => value.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub chat_id: i64,
    pub username: String,
    pub first_name: String,
    pub subscribed_at: String,
}

/// Tracking fields are taken as sent; nothing in the body is validated.
#[derive(Debug, Default)]
pub struct TrackVisitorRequest {
    pub page: Option<String>,
    pub referrer: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

impl From<&Map<String, Value>> for TrackVisitorRequest {
    fn from(body: &Map<String, Value>) -> Self {
        Self {
            page: text_field(body, "page"),
            referrer: text_field(body, "referrer"),
            utm_source: text_field(body, "utmSource"),
            utm_medium: text_field(body, "utmMedium"),
            utm_campaign: text_field(body, "utmCampaign"),
        }
    }
}

#[derive(Debug, Default)]
pub struct TrackClickRequest {
    pub button: Option<String>,
    pub page: Option<String>,
    pub visitor_id: Option<String>,
}

impl From<&Map<String, Value>> for TrackClickRequest {
    fn from(body: &Map<String, Value>) -> Self {
        Self {
            button: text_field(body, "button"),
            page: text_field(body, "page"),
            visitor_id: text_field(body, "visitorId"),
        }
    }
}

/// Strings as sent, other JSON values in their JSON text form, `null` as absent.
pub fn text_field(body: &Map<String, Value>, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::Null => None,
        Value::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered: Option<bool>,
}

impl TrackResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            visitor_id: None,
            filtered: None,
        }
    }

    pub fn filtered() -> Self {
        Self {
            filtered: Some(true),
            ..Self::ok()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadResponse {
    pub success: bool,
    pub lead_id: String,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_visitors: usize,
    pub today_visitors: usize,
    pub total_loan_leads: usize,
    pub today_loan_leads: usize,
    pub total_debt_leads: usize,
    pub today_debt_leads: usize,
    pub total_contact_leads: usize,
    pub total_events: usize,
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// RFC 3339 UTC with millisecond precision, e.g. `2026-10-17T09:30:00.123Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Keeps a non-empty form value, treating blanks as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
