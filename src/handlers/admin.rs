use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Form,
};
use askama::Template;
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{render, signed_in, PageResult, SignedIn};
use crate::{
    filters,
    middleware::require_role,
    models::{ActivityKind, AdminActivity, AdminStats, AdminUser, Role, User},
    AppState,
};

const ACTIVITY_LIMIT: u32 = 100;

#[derive(Template)]
#[template(path = "admin/overview.html")]
struct AdminOverviewTemplate {
    user: User,
    stats: AdminStats,
    available: bool,
}

#[derive(Template)]
#[template(path = "admin/users.html")]
struct AdminUsersTemplate {
    user: User,
    users: Vec<AdminUser>,
    roles: Vec<Role>,
    query: String,
    role: String,
    error: String,
}

#[derive(Template)]
#[template(path = "admin/activity.html")]
struct AdminActivityTemplate {
    user: User,
    activities: Vec<AdminActivity>,
    kinds: Vec<ActivityKind>,
    selected: String,
}

#[derive(Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    q: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    error: String,
}

#[derive(Deserialize)]
pub struct RoleForm {
    role: String,
}

#[derive(Deserialize)]
pub struct ActivityQuery {
    #[serde(default, rename = "type")]
    kind: String,
}

fn admin_only(cookies: Cookies, state: &AppState) -> PageResult<SignedIn> {
    let page = signed_in(cookies, state)?;
    require_role(&page.user, &[Role::Admin])?;
    Ok(page)
}

pub async fn admin_overview(cookies: Cookies, State(state): State<AppState>) -> PageResult {
    let page = admin_only(cookies, &state)?;
    let stats = page.api.admin_stats().await;

    render(&AdminOverviewTemplate {
        user: page.user,
        available: stats.is_some(),
        stats: stats.unwrap_or_default(),
    })
}

pub async fn admin_users(
    cookies: Cookies,
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> PageResult {
    let page = admin_only(cookies, &state)?;

    let role_filter = Some(query.role.trim())
        .filter(|r| !r.is_empty())
        .map(Role::from);
    let users = page
        .api
        .admin_users()
        .await
        .into_iter()
        .filter(|u| u.matches(&query.q, role_filter.as_ref()))
        .collect();

    render(&AdminUsersTemplate {
        user: page.user,
        users,
        roles: Role::ASSIGNABLE.to_vec(),
        query: query.q,
        role: query.role,
        error: query.error,
    })
}

pub async fn update_user_role(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Form(form): Form<RoleForm>,
) -> PageResult<Redirect> {
    let page = admin_only(cookies, &state)?;

    let role = Role::from(form.role.as_str());
    if !Role::ASSIGNABLE.contains(&role) {
        log::warn!("refusing unknown role {:?} for user {}", form.role, user_id);
        return Ok(Redirect::to("/admin/users?error=Unknown+role"));
    }

    match page.api.update_user_role(&user_id, &role).await {
        Ok(()) => {
            log::info!("{} set role of user {} to {}", page.user.email, user_id, role.code());
            Ok(Redirect::to("/admin/users"))
        }
        Err(err) => {
            log::warn!("role update for user {} failed: {}", user_id, err);
            let message = err
                .server_message()
                .unwrap_or("Failed to update role")
                .to_string();
            Ok(Redirect::to(&format!(
                "/admin/users?error={}",
                urlencoding::encode(&message)
            )))
        }
    }
}

pub async fn admin_activity(
    cookies: Cookies,
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> PageResult {
    let page = admin_only(cookies, &state)?;

    let filter = ActivityKind::parse(&query.kind);
    let activities = page
        .api
        .admin_activity(ACTIVITY_LIMIT)
        .await
        .into_iter()
        .filter(|a| filter.map_or(true, |kind| a.kind == kind))
        .collect();

    render(&AdminActivityTemplate {
        user: page.user,
        activities,
        kinds: ActivityKind::FILTERABLE.to_vec(),
        selected: filter.map(|k| k.code().to_string()).unwrap_or_default(),
    })
}
