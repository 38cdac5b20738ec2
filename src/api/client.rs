//! HTTP client for the AgriTrace backend

use reqwest::{multipart::Form, Client, Method, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::error::{ErrorDetail, RequestError, Result};

/// Body of an outgoing request.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

#[derive(Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub body: RequestBody,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            body: RequestBody::Empty,
        }
    }

    pub fn post() -> Self {
        Self {
            method: Method::POST,
            body: RequestBody::Empty,
        }
    }

    pub fn json<T: Serialize>(method: Method, body: &T) -> Result<Self> {
        Ok(Self {
            method,
            body: RequestBody::Json(serde_json::to_value(body)?),
        })
    }

    pub fn multipart(method: Method, form: Form) -> Self {
        Self {
            method,
            body: RequestBody::Multipart(form),
        }
    }
}

/// Common `{success, error}` wrapper around endpoint payloads.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Envelope<T> {
    /// Only an explicit `success: false` counts as failure; older endpoints
    /// omit the flag altogether.
    pub fn into_data(self) -> Result<T> {
        match self.success {
            Some(false) => Err(RequestError::Unsuccessful(self.error)),
            _ => Ok(self.data),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// The one place that talks to the backend.
///
/// Cloning is cheap: the underlying connection pool is shared. A client
/// carries at most one bearer token; use [`ApiClient::with_token`] to derive a
/// per-session client from the shared one.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("agritrace/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(base_url, http))
    }

    pub fn with_http(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http,
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Same backend, different credentials. Empty tokens count as none.
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            http: self.http.clone(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Client for public endpoints, never sends credentials.
    pub fn anonymous(&self) -> Self {
        self.with_token(None)
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send one request and decode the JSON body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let mut builder = self.http.request(options.method.clone(), self.url(endpoint));
        if let Some(ref token) = self.token {
            builder = builder.bearer_auth(token);
        }
        builder = match options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await?;
        log::debug!("{} {} -> {}", options.method, endpoint, response.status());
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(ErrorBody { error: Some(message) }) => ErrorDetail::Message(message),
                Ok(_) => ErrorDetail::Unspecified,
                Err(_) => ErrorDetail::Unreadable,
            };
            return Err(RequestError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// `request` wrapped in the `{success, error}` envelope.
    pub(crate) async fn request_enveloped<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.request::<Envelope<T>>(endpoint, options)
            .await?
            .into_data()
    }
}

/// Percent-encode one path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Run a fetch whose failure the caller may treat as "nothing there".
pub(crate) fn degrade<T>(what: &str, result: Result<T>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            log::warn!("{} failed, showing empty result: {}", what, err);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.url("/batch"), "http://localhost:5000/batch");
    }

    #[test]
    fn empty_token_counts_as_none() {
        let client = ApiClient::new("http://localhost:5000").unwrap();
        assert!(!client.with_token(Some(String::new())).has_token());
        assert!(client.with_token(Some("t".into())).has_token());
        assert!(!client.with_token(Some("t".into())).anonymous().has_token());
    }

    #[test]
    fn explicit_false_success_is_an_error() {
        #[derive(Debug, Deserialize)]
        struct Payload {
            #[serde(default)]
            value: u32,
        }
        let env: Envelope<Payload> =
            serde_json::from_str(r#"{"success":false,"error":"Batch locked"}"#).unwrap();
        let err = env.into_data().unwrap_err();
        assert_eq!(err.to_string(), "Batch locked");

        let env: Envelope<Payload> = serde_json::from_str(r#"{"value":3}"#).unwrap();
        assert_eq!(env.into_data().unwrap().value, 3);
    }

    #[test]
    fn segment_encodes_reserved_characters() {
        assert_eq!(segment("AGR 01/2"), "AGR%2001%2F2");
    }
}
