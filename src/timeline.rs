//! One chronological journey out of a batch's custody chain and its events.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::icons::Icon;
use crate::models::{BatchEvent, CustodyChainItem};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a backend timestamp into a UTC instant. Offsetless values are read
/// as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEntry {
    /// `index` is the item's position in the custody chain; 0 is the origin
    /// holder.
    Custody {
        index: usize,
        item: CustodyChainItem,
    },
    Event(BatchEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineItem {
    pub key: String,
    pub instant: DateTime<Utc>,
    /// False when the timestamp could not be read and `instant` is the
    /// placeholder minimum.
    pub parsed: bool,
    pub entry: TimelineEntry,
}

impl TimelineItem {
    fn new(key: String, raw_timestamp: &str, entry: TimelineEntry) -> Self {
        let parsed = parse_instant(raw_timestamp);
        if parsed.is_none() {
            log::warn!("{}: unreadable timestamp {:?}, placing first", key, raw_timestamp);
        }
        Self {
            key,
            instant: parsed.unwrap_or(DateTime::<Utc>::MIN_UTC),
            parsed: parsed.is_some(),
            entry,
        }
    }

    pub fn is_custody(&self) -> bool {
        matches!(self.entry, TimelineEntry::Custody { .. })
    }

    /// First holder in the custody chain.
    pub fn is_origin(&self) -> bool {
        matches!(self.entry, TimelineEntry::Custody { index: 0, .. })
    }

    pub fn icon(&self) -> Icon {
        match &self.entry {
            TimelineEntry::Custody { item, .. } => item.role.icon(),
            TimelineEntry::Event(event) => event.event_type.icon(),
        }
    }

    pub fn title(&self) -> &str {
        match &self.entry {
            TimelineEntry::Custody { item, .. } => &item.action,
            TimelineEntry::Event(event) => event.heading(),
        }
    }

    /// Custody: holder, organization and previous holder. Events: the
    /// recorded description.
    pub fn description(&self) -> String {
        match &self.entry {
            TimelineEntry::Custody { item, .. } => {
                let mut text = item.actor.clone();
                if let Some(org) = item.organization.as_deref().filter(|o| !o.is_empty()) {
                    text.push_str(&format!(" ({})", org));
                }
                if let Some(from) = item.from_actor.as_deref().filter(|f| !f.is_empty()) {
                    text.push_str(&format!(" • Received from {}", from));
                }
                text
            }
            TimelineEntry::Event(event) => event.description.clone(),
        }
    }

    /// Who recorded an event. Custody items carry the actor in the
    /// description instead.
    pub fn actor(&self) -> Option<&str> {
        match &self.entry {
            TimelineEntry::Event(event) if !event.actor.is_empty() => Some(&event.actor),
            _ => None,
        }
    }

    pub fn location(&self) -> &str {
        let location = match &self.entry {
            TimelineEntry::Custody { item, .. } => &item.location,
            TimelineEntry::Event(event) => &event.location,
        };
        if location.trim().is_empty() {
            "N/A"
        } else {
            location
        }
    }

    /// Role name for custody items, "Verified" for verified events.
    pub fn badge(&self) -> Option<&str> {
        match &self.entry {
            TimelineEntry::Custody { item, .. } => Some(item.role.display_name()),
            TimelineEntry::Event(event) if event.verified => Some("Verified"),
            TimelineEntry::Event(_) => None,
        }
    }

    /// Whether the dot is drawn in the verified colour.
    pub fn highlighted(&self) -> bool {
        match &self.entry {
            TimelineEntry::Custody { index, .. } => *index == 0,
            TimelineEntry::Event(event) => event.verified,
        }
    }

    pub fn date_label(&self) -> String {
        if self.parsed {
            self.instant.format("%b %-d, %Y %H:%M").to_string()
        } else {
            "Unknown date".to_string()
        }
    }
}

/// Merge custody items and events into one ascending sequence.
///
/// Custody items are laid down before events and the sort is stable, so at
/// equal instants custody comes first and each source keeps its own order.
pub fn merge(custody: &[CustodyChainItem], events: &[BatchEvent]) -> Vec<TimelineItem> {
    let mut items: Vec<TimelineItem> = custody
        .iter()
        .enumerate()
        .map(|(index, item)| {
            TimelineItem::new(
                format!("custody-{}", index),
                &item.timestamp,
                TimelineEntry::Custody {
                    index,
                    item: item.clone(),
                },
            )
        })
        .chain(events.iter().map(|event| {
            TimelineItem::new(
                format!("event-{}", event.id),
                &event.timestamp,
                TimelineEntry::Event(event.clone()),
            )
        }))
        .collect();

    items.sort_by_key(|item| item.instant);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, Id, Role};
    use proptest::prelude::*;

    fn custody(action: &str, role: &str, at: &str) -> CustodyChainItem {
        CustodyChainItem {
            actor: "Ravi Kumar".into(),
            role: Role::from(role),
            organization: Some("Shakti Mills".into()),
            action: action.into(),
            timestamp: at.into(),
            location: String::new(),
            from_actor: None,
            from_role: None,
        }
    }

    fn event(id: i64, kind: &str, at: &str) -> BatchEvent {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "type": kind,
            "description": "recorded",
            "location": "Karnal",
            "timestamp": at,
            "actor": "Asha",
        }))
        .unwrap()
    }

    #[test]
    fn harvest_before_pickup() {
        let merged = merge(
            &[custody("pickup", "PROCESSOR", "2024-01-01T10:00Z")],
            &[event(1, "harvested", "2024-01-01T09:00Z")],
        );
        let keys: Vec<&str> = merged.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["event-1", "custody-0"]);
        assert_eq!(merged[0].icon(), Icon::Leaf);
        assert_eq!(merged[1].icon(), Icon::Factory);
        assert_eq!(merged[1].title(), "pickup");
    }

    #[test]
    fn custody_precedes_event_at_equal_instant() {
        let merged = merge(
            &[custody("pickup", "PROCESSOR", "2024-03-05T08:00:00Z")],
            &[event(9, "shipped", "2024-03-05 08:00:00")],
        );
        assert!(merged[0].is_custody());
        assert!(!merged[1].is_custody());
    }

    #[test]
    fn accepted_timestamp_shapes() {
        let expected = parse_instant("2024-01-01T10:00:00Z").unwrap();
        assert_eq!(parse_instant("2024-01-01T10:00Z"), Some(expected));
        assert_eq!(parse_instant("2024-01-01T10:00"), Some(expected));
        assert_eq!(parse_instant("2024-01-01T10:00:00.000Z"), Some(expected));
        assert_eq!(parse_instant("2024-01-01 10:00:00"), Some(expected));
        assert_eq!(parse_instant("2024-01-01T15:30:00+05:30"), Some(expected));
        assert!(parse_instant("2024-01-01").is_some());
        assert_eq!(parse_instant("yesterday"), None);
    }

    #[test]
    fn unreadable_dates_sort_first_and_are_kept() {
        let merged = merge(
            &[custody("delivery", "RETAILER", "2024-02-01T00:00:00Z")],
            &[event(3, "stored", "not a date")],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].key, "event-3");
        assert!(!merged[0].parsed);
        assert_eq!(merged[0].date_label(), "Unknown date");
    }

    #[test]
    fn origin_holder_and_rendering_fallbacks() {
        let mut first = custody("Harvested", "FARMER", "2024-01-01T06:00:00Z");
        first.from_actor = None;
        let mut second = custody("pickup", "auditor", "2024-01-02T06:00:00Z");
        second.from_actor = Some("Asha".into());

        let merged = merge(&[first, second], &[event(4, "fumigated", "2024-01-03T00:00:00Z")]);
        assert!(merged[0].is_origin());
        assert!(!merged[1].is_origin());
        assert_eq!(merged[1].icon(), Icon::User);
        assert_eq!(merged[1].badge(), Some("auditor"));
        assert_eq!(
            merged[1].description(),
            "Ravi Kumar (Shakti Mills) • Received from Asha"
        );
        assert_eq!(merged[1].location(), "N/A");
        assert_eq!(merged[2].icon(), Icon::Package);
        assert!(matches!(
            &merged[2].entry,
            TimelineEntry::Event(e) if e.event_type == EventType::Other("fumigated".into())
        ));
        assert_eq!(merged[2].date_label(), "Jan 3, 2024 00:00");
    }

    fn hour() -> impl Strategy<Value = String> {
        (0u32..24, 0u32..2).prop_map(|(h, m)| format!("2024-05-01T{:02}:{:02}:00Z", h, m * 30))
    }

    proptest! {
        #[test]
        fn merged_sequence_is_ordered_and_splits_back(
            custody_times in prop::collection::vec(hour(), 0..8),
            event_times in prop::collection::vec(hour(), 0..8),
        ) {
            let chain: Vec<CustodyChainItem> = custody_times
                .iter()
                .map(|t| custody("handoff", "DISTRIBUTOR", t))
                .collect();
            let events: Vec<BatchEvent> = event_times
                .iter()
                .enumerate()
                .map(|(i, t)| event(i as i64, "shipped", t))
                .collect();

            let full = merge(&chain, &events);
            prop_assert_eq!(full.len(), chain.len() + events.len());
            prop_assert!(full.windows(2).all(|w| w[0].instant <= w[1].instant));

            let custody_only: Vec<String> = merge(&chain, &[]).into_iter().map(|i| i.key).collect();
            let events_only: Vec<String> = merge(&[], &events).into_iter().map(|i| i.key).collect();
            let from_full_custody: Vec<String> =
                full.iter().filter(|i| i.is_custody()).map(|i| i.key.clone()).collect();
            let from_full_events: Vec<String> =
                full.iter().filter(|i| !i.is_custody()).map(|i| i.key.clone()).collect();
            prop_assert_eq!(custody_only, from_full_custody);
            prop_assert_eq!(events_only, from_full_events);
        }
    }

    #[test]
    fn event_ids_make_keys() {
        let merged = merge(&[], &[event(42, "sold", "2024-06-01")]);
        assert_eq!(merged[0].key, format!("event-{}", Id::from(42)));
        assert_eq!(merged[0].actor(), Some("Asha"));
        assert_eq!(merged[0].badge(), Some("Verified"));
    }
}
