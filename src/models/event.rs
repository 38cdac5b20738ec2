use serde::{Deserialize, Serialize};
use std::fmt;

use super::{de, Id};
use crate::icons::Icon;

/// What happened to a batch. Unrecognised types are kept verbatim in
/// `Other` and drawn with the generic package icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Harvested,
    QualityChecked,
    Processed,
    Packaged,
    Shipped,
    Received,
    Stored,
    Sold,
    Split,
    Recalled,
    Handoff,
    Other(String),
}

impl EventType {
    /// Types a user may record by hand from the add-event form.
    pub const RECORDABLE: [EventType; 10] = [
        EventType::Harvested,
        EventType::QualityChecked,
        EventType::Processed,
        EventType::Packaged,
        EventType::Shipped,
        EventType::Received,
        EventType::Stored,
        EventType::Sold,
        EventType::Split,
        EventType::Recalled,
    ];

    pub fn code(&self) -> &str {
        match self {
            EventType::Harvested => "harvested",
            EventType::QualityChecked => "quality_checked",
            EventType::Processed => "processed",
            EventType::Packaged => "packaged",
            EventType::Shipped => "shipped",
            EventType::Received => "received",
            EventType::Stored => "stored",
            EventType::Sold => "sold",
            EventType::Split => "split",
            EventType::Recalled => "recalled",
            EventType::Handoff => "handoff",
            EventType::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            EventType::Harvested => "Harvested",
            EventType::QualityChecked => "Quality Checked",
            EventType::Processed => "Processed",
            EventType::Packaged => "Packaged",
            EventType::Shipped => "Shipped",
            EventType::Received => "Received",
            EventType::Stored => "Stored",
            EventType::Sold => "Sold",
            EventType::Split => "Split",
            EventType::Recalled => "Recalled",
            EventType::Handoff => "Handoff",
            EventType::Other(raw) if raw.is_empty() => "Event",
            EventType::Other(raw) => raw,
        }
    }

    pub fn icon(&self) -> Icon {
        match self {
            EventType::Harvested => Icon::Leaf,
            EventType::QualityChecked => Icon::CheckCircle,
            EventType::Processed => Icon::Factory,
            EventType::Packaged => Icon::Package,
            EventType::Shipped => Icon::Truck,
            EventType::Received | EventType::Sold => Icon::ShoppingBag,
            EventType::Stored => Icon::Store,
            EventType::Split => Icon::GitBranch,
            EventType::Handoff => Icon::ArrowRight,
            EventType::Recalled => Icon::AlertTriangle,
            EventType::Other(_) => Icon::Package,
        }
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "harvested" | "harvest" => EventType::Harvested,
            "quality_checked" | "quality" | "quality_check" => EventType::QualityChecked,
            "processed" | "process" | "processing" => EventType::Processed,
            "packaged" => EventType::Packaged,
            "shipped" | "ship" | "shipment" => EventType::Shipped,
            "received" | "deliver" | "delivery" => EventType::Received,
            "stored" | "storage" => EventType::Stored,
            "sold" => EventType::Sold,
            "split" => EventType::Split,
            "recalled" => EventType::Recalled,
            "handoff" => EventType::Handoff,
            _ => EventType::Other(value),
        }
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        EventType::from(value.to_string())
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.code().to_string()
    }
}

impl Default for EventType {
    fn default() -> Self {
        EventType::Other(String::new())
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One immutable entry in a batch's audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEvent {
    #[serde(default)]
    pub id: Id,
    #[serde(rename = "type", alias = "eventType", default)]
    pub event_type: EventType,
    #[serde(default, deserialize_with = "de::null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub location: String,
    #[serde(default, alias = "date", deserialize_with = "de::null_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub actor: String,
    #[serde(default = "de::default_true")]
    pub verified: bool,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub temperature: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub humidity: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub documents: Vec<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub photos: Vec<String>,
}

impl BatchEvent {
    /// Heading shown in timelines: the recorded title, else the type label.
    pub fn heading(&self) -> &str {
        if self.title.trim().is_empty() {
            self.event_type.label()
        } else {
            &self.title
        }
    }
}

/// Row of the cross-batch event feed (`GET /event/all`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFeedItem {
    #[serde(default)]
    pub id: Id,
    #[serde(default)]
    pub batch_id: Id,
    #[serde(default, deserialize_with = "de::null_default")]
    pub batch_name: String,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default, deserialize_with = "de::null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub location: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub actor: String,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub temperature: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub humidity: Option<String>,
    #[serde(default = "de::default_true")]
    pub verified: bool,
}

impl EventFeedItem {
    pub fn matches(&self, query: &str, type_filter: Option<&EventType>) -> bool {
        if let Some(wanted) = type_filter {
            if &self.event_type != wanted {
                return false;
            }
        }
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.batch_name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self.actor.to_lowercase().contains(&query)
            || self.location.to_lowercase().contains(&query)
    }
}

/// A file attached to an event (document or photo).
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Fields of the add-event form, sent as multipart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AddEventRequest {
    pub event_type: String,
    pub description: String,
    pub location: String,
    pub timestamp: String,
    pub actor: String,
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub notes: Option<String>,
    pub documents: Vec<Attachment>,
    pub photos: Vec<Attachment>,
}

impl AddEventRequest {
    /// Field-keyed validation messages; empty when the event may be sent.
    pub fn validate(&self) -> Vec<(&'static str, &'static str)> {
        let mut errors = Vec::new();
        if self.event_type.trim().is_empty() {
            errors.push(("eventType", "Please select an event type"));
        }
        if self.description.trim().is_empty() {
            errors.push(("description", "Description is required"));
        }
        if self.location.trim().is_empty() {
            errors.push(("location", "Location is required"));
        }
        if self.actor.trim().is_empty() {
            errors.push(("actor", "Actor/Handler name is required"));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_aliases_map_to_canonical_types() {
        assert_eq!(EventType::from("harvest"), EventType::Harvested);
        assert_eq!(EventType::from("QUALITY"), EventType::QualityChecked);
        assert_eq!(EventType::from("ship"), EventType::Shipped);
        assert_eq!(EventType::from("deliver"), EventType::Received);
    }

    #[test]
    fn unknown_event_type_keeps_raw_value_and_generic_icon() {
        let t = EventType::from("fumigated");
        assert_eq!(t, EventType::Other("fumigated".into()));
        assert_eq!(t.icon(), Icon::Package);
        assert_eq!(t.label(), "fumigated");
    }

    #[test]
    fn event_narrows_loose_fields() {
        let raw = r#"{
            "id": 3, "type": "stored", "description": "Cold room",
            "location": null, "timestamp": "2024-02-01T08:00:00Z",
            "actor": "Agro Store", "temperature": 4.5, "humidity": "60%"
        }"#;
        let event: BatchEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_type, EventType::Stored);
        assert_eq!(event.location, "");
        assert_eq!(event.temperature.as_deref(), Some("4.5"));
        assert!(event.verified);
        assert_eq!(event.heading(), "Stored");
    }

    #[test]
    fn add_event_requires_type_description_location_actor() {
        let mut req = AddEventRequest::default();
        let fields: Vec<_> = req.validate().into_iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["eventType", "description", "location", "actor"]);

        req.event_type = "stored".into();
        req.description = "Moved to cold storage".into();
        req.location = "Nashik".into();
        req.actor = "Cold Chain Co".into();
        assert!(req.validate().is_empty());
    }

    #[test]
    fn feed_filter_matches_type_and_text() {
        let item: EventFeedItem = serde_json::from_str(
            r#"{"id":1,"batchId":9,"batchName":"Basmati Rice","type":"shipped","actor":"Kisan Logistics"}"#,
        )
        .unwrap();
        assert!(item.matches("basmati", None));
        assert!(item.matches("", Some(&EventType::Shipped)));
        assert!(!item.matches("", Some(&EventType::Sold)));
        assert!(!item.matches("wheat", None));
    }
}
