mod common;

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};

use agritrace::api::ApiClient;
use agritrace::models::{RegisterRequest, Role};
use agritrace::session::{AuthError, MemoryStore, SessionContext, SessionStore, TOKEN_KEY};

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    match (body["email"].as_str(), body["password"].as_str()) {
        (Some("asha@farm.in"), Some("harvest24")) => (
            StatusCode::OK,
            Json(json!({ "token": "tok-asha", "user": common::farmer() })),
        ),
        (Some("half@farm.in"), _) => (StatusCode::OK, Json(json!({ "token": "tok-half" }))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid credentials" })),
        ),
    }
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "taken@farm.in" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "User already exists" })),
        );
    }
    (StatusCode::CREATED, Json(json!({ "user": { "id": 7, "role": body["role"] } })))
}

fn backend() -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

#[tokio::test]
async fn login_survives_reload_until_logout() {
    let base = common::serve(backend()).await;
    let api = ApiClient::new(&base).unwrap();
    let store = MemoryStore::new();

    let mut session = SessionContext::restore(store.clone());
    let user = session.login(&api, "asha@farm.in", "harvest24").await.unwrap();
    assert_eq!(user.role, Role::Farmer);

    let reloaded = SessionContext::restore(store.clone());
    assert!(reloaded.is_authenticated());
    assert_eq!(reloaded.token(), Some("tok-asha"));
    assert!(reloaded.api(&api).has_token());

    session.logout();
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    assert!(!SessionContext::restore(store).is_authenticated());
}

#[tokio::test]
async fn rejected_logins_leave_no_trace() {
    let base = common::serve(backend()).await;
    let api = ApiClient::new(&base).unwrap();
    let store = MemoryStore::new();
    let mut session = SessionContext::restore(store.clone());

    let err = session.login(&api, "asha@farm.in", "wrong").await.unwrap_err();
    assert_eq!(err, AuthError::Rejected("Invalid credentials".into()));

    let err = session.login(&api, "half@farm.in", "x").await.unwrap_err();
    assert_eq!(err.to_string(), "Login failed");

    assert!(!session.is_authenticated());
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let api = ApiClient::new("http://127.0.0.1:1").unwrap();
    let mut session = SessionContext::restore(MemoryStore::new());

    let err = session.login(&api, "asha@farm.in", "harvest24").await.unwrap_err();
    assert_eq!(err, AuthError::Network);
    assert_eq!(err.to_string(), "Network error. Please try again.");
}

#[tokio::test]
async fn registration_signs_the_new_user_in() {
    let base = common::serve(backend()).await;
    let api = ApiClient::new(&base).unwrap();
    let mut session = SessionContext::restore(MemoryStore::new());

    let mut request = RegisterRequest {
        email: "taken@farm.in".into(),
        password: "harvest24".into(),
        name: "Asha Patel".into(),
        organization: "Green Valley Farms".into(),
        role: Role::Farmer,
        location: None,
    };
    let err = session.register(&api, &request).await.unwrap_err();
    assert_eq!(err.to_string(), "User already exists");

    request.email = "asha@farm.in".into();
    let user = session.register(&api, &request).await.unwrap();
    assert_eq!(user.name, "Asha Patel");
    assert!(session.is_authenticated());
}
