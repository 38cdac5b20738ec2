//! Typed access to the AgriTrace REST backend.
//!
//! Every call goes through [`ApiClient::request`], which attaches the bearer
//! token, encodes the body and turns non-2xx replies into
//! [`RequestError::Status`] carrying the server's `error` field.

pub mod admin;
pub mod auth;
pub mod batch;
pub mod client;
pub mod error;
pub mod event;
pub mod handoff;
pub mod qr;
pub mod stats;
pub mod verify;

pub use auth::{LoginReply, RegisterReply};
pub use batch::{CreatedBatch, CreatedChild, SplitPart};
pub use client::{ApiClient, RequestBody, RequestOptions};
pub use error::{ErrorDetail, RequestError, Result};
pub use event::{event_form, RecordedEvent};
pub use handoff::HandoffReceipt;
