use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;

use super::client::{degrade, segment, ApiClient, RequestOptions};
use super::error::{RequestError, Result};
use crate::models::{de, AddEventRequest, Attachment, BatchEvent, EventFeedItem, Id};

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct EventList<T> {
    #[serde(default = "Vec::new", deserialize_with = "de::null_default")]
    events: Vec<T>,
}

/// Receipt for a recorded event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecordedEvent {
    pub id: Id,
    #[serde(default)]
    pub hash: Option<String>,
}

#[derive(Deserialize)]
struct Added {
    #[serde(default)]
    event: Option<RecordedEvent>,
}

fn file_part(file: &Attachment) -> Result<Part> {
    let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
    match file.content_type.as_deref() {
        Some(mime) => Ok(part.mime_str(mime)?),
        None => Ok(part),
    }
}

/// Multipart encoding of an event: text fields plus `documents` and
/// `photos` file arrays. Empty optional fields are left out.
pub fn event_form(request: &AddEventRequest) -> Result<Form> {
    let mut form = Form::new()
        .text("eventType", request.event_type.clone())
        .text("description", request.description.clone())
        .text("location", request.location.clone())
        .text("timestamp", request.timestamp.clone())
        .text("actor", request.actor.clone());

    let optional = [
        ("temperature", &request.temperature),
        ("humidity", &request.humidity),
        ("notes", &request.notes),
    ];
    for (name, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            form = form.text(name, value.to_string());
        }
    }

    for doc in &request.documents {
        form = form.part("documents", file_part(doc)?);
    }
    for photo in &request.photos {
        form = form.part("photos", file_part(photo)?);
    }
    Ok(form)
}

impl ApiClient {
    /// Events of one batch; empty when they could not be loaded.
    pub async fn fetch_batch_events(&self, batch_id: &str) -> Vec<BatchEvent> {
        let endpoint = format!("/event/{}", segment(batch_id));
        let result = self
            .request::<EventList<BatchEvent>>(&endpoint, RequestOptions::get())
            .await
            .map(|l| l.events);
        degrade("event listing", result, Vec::new())
    }

    /// Events across every batch the caller can see.
    pub async fn fetch_event_feed(&self) -> Result<Vec<EventFeedItem>> {
        let list: EventList<EventFeedItem> = self
            .request_enveloped("/event/all", RequestOptions::get())
            .await?;
        Ok(list.events)
    }

    pub async fn add_event(&self, batch_id: &str, request: &AddEventRequest) -> Result<RecordedEvent> {
        let endpoint = format!("/event/add/{}", segment(batch_id));
        let options = RequestOptions::multipart(Method::POST, event_form(request)?);
        let added: Added = self.request_enveloped(&endpoint, options).await?;
        added.event.ok_or(RequestError::Unsuccessful(None))
    }
}
