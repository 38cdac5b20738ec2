//! Error type for backend calls

use thiserror::Error;

/// Failure of a single backend request.
///
/// `Display` yields the text the dashboard shows to the user: the server's
/// own `error` string when it sent one, a generic message otherwise.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request never produced an HTTP response.
    #[error("Network error. Please try again.")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("{}", status_text(*.status, .detail))]
    Status { status: u16, detail: ErrorDetail },

    /// 2xx response whose body did not match the endpoint's schema.
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// 2xx response carrying `success: false` or missing its payload.
    #[error("{}", .0.as_deref().unwrap_or("Request failed"))]
    Unsuccessful(Option<String>),
}

/// What a non-2xx body said about the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    /// The body's `error` field.
    Message(String),
    /// JSON body without an `error` field.
    Unspecified,
    /// Body was not JSON.
    Unreadable,
}

fn status_text(status: u16, detail: &ErrorDetail) -> String {
    match detail {
        ErrorDetail::Message(message) => message.clone(),
        ErrorDetail::Unspecified => format!("HTTP {}", status),
        ErrorDetail::Unreadable => "Request failed".to_string(),
    }
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message supplied by the backend, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RequestError::Status {
                detail: ErrorDetail::Message(message),
                ..
            } => Some(message),
            RequestError::Unsuccessful(message) => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, RequestError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_prefers_server_text() {
        let err = RequestError::Status {
            status: 409,
            detail: ErrorDetail::Message("Batch already split".into()),
        };
        assert_eq!(err.to_string(), "Batch already split");
        assert_eq!(err.server_message(), Some("Batch already split"));

        let err = RequestError::Status {
            status: 404,
            detail: ErrorDetail::Unspecified,
        };
        assert_eq!(err.to_string(), "HTTP 404");
        assert_eq!(err.server_message(), None);

        let err = RequestError::Status {
            status: 502,
            detail: ErrorDetail::Unreadable,
        };
        assert_eq!(err.to_string(), "Request failed");
    }
}

pub type Result<T> = std::result::Result<T, RequestError>;
