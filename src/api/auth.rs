use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, RequestOptions};
use super::error::Result;
use crate::models::{RegisterRequest, User};

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Raw `/auth/login` reply. Both halves must be present for a login to
/// count; the session layer decides.
#[derive(Debug, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterReply {
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Serialize)]
struct ForgotPassword<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPassword<'a> {
    token: &'a str,
    new_password: &'a str,
}

#[derive(Deserialize)]
struct Ack {}

impl ApiClient {
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginReply> {
        let options = RequestOptions::json(Method::POST, &Credentials { email, password })?;
        self.anonymous().request("/auth/login", options).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterReply> {
        let options = RequestOptions::json(Method::POST, request)?;
        self.anonymous().request("/auth/register", options).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let options = RequestOptions::json(Method::POST, &ForgotPassword { email })?;
        self.anonymous()
            .request_enveloped::<Ack>("/auth/forgot-password", options)
            .await
            .map(|_| ())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let options = RequestOptions::json(Method::POST, &ResetPassword { token, new_password })?;
        self.anonymous()
            .request_enveloped::<Ack>("/auth/reset-password", options)
            .await
            .map(|_| ())
    }
}
