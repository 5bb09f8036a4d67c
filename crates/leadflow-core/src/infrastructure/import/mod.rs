//! Raw lead normalization
//!
//! Imported lead documents carry several historical spellings for the same
//! field (spreadsheet column headers such as `Name` / `State`, and later
//! camelCase fields). Everything is resolved here so the rest of the crate
//! only sees canonical `Lead` values.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::domain::aggregates::{Lead, LeadStatus};
use crate::domain::value_objects::{EntityId, Region};

const NAME_FIELDS: &[&str] = &["Name", "fullName", "name"];
const PHONE_FIELDS: &[&str] = &["Phone", "phone", "mobile"];
const EMAIL_FIELDS: &[&str] = &["Email", "email"];
const SOURCE_FIELDS: &[&str] = &["Lead Source", "source"];
const CITY_FIELDS: &[&str] = &["City", "city"];
const REGION_FIELDS: &[&str] = &["State", "state"];
const NOTES_FIELDS: &[&str] = &["Any additional relevant metadata", "notes"];
const ID_FIELDS: &[&str] = &["_id", "id"];

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A lead document as it arrives from import
#[derive(Clone, Debug, PartialEq)]
pub struct RawLead {
    fields: Map<String, Value>,
}

impl RawLead {
    /// Wrap a JSON object; anything else is not a lead document
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Resolve to a canonical lead; `now` stands in for missing or
    /// unparseable timestamps
    pub fn normalize(&self, now: DateTime<Utc>) -> Lead {
        let name = self.first_text(NAME_FIELDS).unwrap_or_else(|| "Unknown".to_string());
        let region = self.first_text(REGION_FIELDS).and_then(Region::parse);

        let mut lead = Lead::create(name, region)
            .with_phone(self.first_text(PHONE_FIELDS).unwrap_or_else(|| "N/A".to_string()))
            .with_email(self.first_text(EMAIL_FIELDS).map(|e| e.trim().to_lowercase()))
            .with_source(self.first_text(SOURCE_FIELDS).unwrap_or_else(|| "Imported".to_string()))
            .with_city(self.first_text(CITY_FIELDS).unwrap_or_default())
            .with_notes(self.first_text(NOTES_FIELDS).unwrap_or_default())
            .with_status(self.status())
            .with_created_at(self.created_at().unwrap_or(now));

        if let Some(id) = self.first_text(ID_FIELDS) {
            lead = lead.with_id(EntityId::from_string(id));
        }
        lead
    }

    fn first_text(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| self.fields.get(*name).and_then(text))
    }

    fn status(&self) -> LeadStatus {
        self.fields
            .get("status")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        match self.fields.get("Timestamp") {
            Some(Value::Number(n)) => return n.as_f64().and_then(from_serial_days),
            Some(Value::String(s)) if !s.trim().is_empty() => return parse_timestamp(s),
            _ => {}
        }
        match self.fields.get("createdAt") {
            Some(Value::String(s)) => parse_timestamp(s),
            _ => None,
        }
    }
}

/// Non-blank string or a number rendered as text
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Spreadsheet serial date: days since 1899-12-30 UTC
fn from_serial_days(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = Utc.with_ymd_and_hms(1899, 12, 30, 0, 0, 0).single()?;
    let millis = (serial * MILLIS_PER_DAY).round();
    // i64::MIN as f64 is exact, i64::MAX as f64 rounds up past the range
    if !(i64::MIN as f64..i64::MAX as f64).contains(&millis) {
        return None;
    }
    epoch.checked_add_signed(Duration::try_milliseconds(millis as i64)?)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}
