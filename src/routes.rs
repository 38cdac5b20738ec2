use axum::{
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{handlers, AppState};

pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        // Public routes
        .route("/", get(|| async { Redirect::permanent("/login") }))
        .route("/login", get(handlers::auth::login_page))
        .route("/login", post(handlers::auth::login))
        .route("/register", get(handlers::auth::register_page))
        .route("/register", post(handlers::auth::register))
        .route("/logout", post(handlers::auth::logout))
        .route("/forgot-password", get(handlers::auth::forgot_password_page))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password", get(handlers::auth::reset_password_page))
        .route("/reset-password", post(handlers::auth::reset_password))
        .route("/verify", get(handlers::verify::verify_search))
        .route("/verify/:code", get(handlers::verify::verify_code))

        // Signed-in routes
        .route("/dashboard", get(handlers::dashboard::dashboard))

        .route("/batches", get(handlers::batches::batches_list))
        .route("/batches/new", get(handlers::batches::create_batch_page))
        .route("/batches/new", post(handlers::batches::create_batch))
        .route("/batches/:id", get(handlers::batches::batch_detail))
        .route("/batches/:id/split", get(handlers::split::split_page))
        .route("/batches/:id/split", post(handlers::split::split_submit))
        .route("/batches/:id/events", get(handlers::events::batch_events))
        .route("/batches/:id/events/new", get(handlers::events::add_event_page))
        .route("/batches/:id/events/new", post(handlers::events::add_event))

        .route("/events", get(handlers::events::event_feed))

        .route("/qr", get(handlers::qr::qr_codes))
        .route("/qr/generate/:batch_id", post(handlers::qr::generate_qr))

        .route("/transfer", get(handlers::transfer::transfer_form))
        .route("/transfer", post(handlers::transfer::transfer))

        // Admin routes
        .route("/admin", get(handlers::admin::admin_overview))
        .route("/admin/users", get(handlers::admin::admin_users))
        .route("/admin/users/:id/role", post(handlers::admin::update_user_role))
        .route("/admin/activity", get(handlers::admin::admin_activity))

        .nest_service("/static", ServeDir::new(static_dir))

        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
        )
        .with_state(state)
}
