#![allow(dead_code)]

use axum::Router;
use serde_json::{json, Value};

use agritrace::{config::AppConfig, routes::create_router, AppState};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn config_for(api_url: &str) -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "AGRITRACE_API_URL" => Some(api_url.to_string()),
        "PUBLIC_URL" => Some("https://trace.example".to_string()),
        _ => None,
    })
    .unwrap()
}

/// The dashboard itself, talking to the fake backend at `api_url`.
pub async fn spawn_dashboard(api_url: &str) -> String {
    let state = AppState::new(config_for(api_url)).unwrap();
    serve(create_router(state)).await
}

pub fn farmer() -> Value {
    json!({
        "id": 7,
        "email": "asha@farm.in",
        "name": "Asha Patel",
        "organization": "Green Valley Farms",
        "role": "FARMER"
    })
}

/// `Cookie` header for a signed-in browser.
pub fn session_cookie(token: &str, user: &Value) -> String {
    format!(
        "agritrace_token={}; agritrace_user={}",
        token,
        urlencoding::encode(&user.to_string())
    )
}

pub fn no_redirects() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
