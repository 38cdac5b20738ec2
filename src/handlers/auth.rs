use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use askama::Template;
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{render, PageResult};
use crate::{
    api::RequestError,
    middleware::web_session,
    models::{RegisterRequest, Role},
    AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: String,
    email: String,
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate {
    error: String,
    form: RegisterForm,
    roles: Vec<Role>,
}

#[derive(Template)]
#[template(path = "forgot_password.html")]
struct ForgotPasswordTemplate {
    error: String,
    email: String,
    sent: bool,
}

#[derive(Template)]
#[template(path = "reset_password.html")]
struct ResetPasswordTemplate {
    error: String,
    token: String,
    done: bool,
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

#[derive(Deserialize, Default)]
pub struct RegisterForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    organization: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    location: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    email: String,
}

#[derive(Deserialize)]
pub struct ResetQuery {
    #[serde(default)]
    token: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    token: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: String,
}

fn registrable_roles() -> Vec<Role> {
    Role::ASSIGNABLE
        .into_iter()
        .filter(|r| *r != Role::Admin)
        .collect()
}

fn recovery_error(err: &RequestError) -> String {
    if err.is_transport() {
        err.to_string()
    } else {
        err.server_message()
            .unwrap_or("Something went wrong")
            .to_string()
    }
}

pub async fn login_page(State(state): State<AppState>, cookies: Cookies) -> PageResult<Response> {
    if web_session(cookies, &state.config).is_authenticated() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let template = LoginTemplate {
        error: String::new(),
        email: String::new(),
    };
    Ok(render(&template)?.into_response())
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> PageResult<Response> {
    let mut session = web_session(cookies, &state.config);
    match session.login(&state.api, form.email.trim(), &form.password).await {
        Ok(_) => Ok(Redirect::to("/dashboard").into_response()),
        Err(err) => {
            let template = LoginTemplate {
                error: err.to_string(),
                email: form.email,
            };
            Ok((StatusCode::UNAUTHORIZED, render(&template)?).into_response())
        }
    }
}

pub async fn register_page() -> PageResult {
    let template = RegisterTemplate {
        error: String::new(),
        form: RegisterForm {
            role: Role::Farmer.code().to_string(),
            ..RegisterForm::default()
        },
        roles: registrable_roles(),
    };
    render(&template)
}

pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<RegisterForm>,
) -> PageResult<Response> {
    let request = RegisterRequest {
        email: form.email.trim().to_string(),
        password: form.password.clone(),
        name: form.name.trim().to_string(),
        organization: form.organization.trim().to_string(),
        role: Role::from(form.role.as_str()),
        location: Some(form.location.trim().to_string()).filter(|l| !l.is_empty()),
    };

    let mut session = web_session(cookies, &state.config);
    match session.register(&state.api, &request).await {
        Ok(_) => Ok(Redirect::to("/dashboard").into_response()),
        Err(err) => {
            let template = RegisterTemplate {
                error: err.to_string(),
                form: RegisterForm {
                    password: String::new(),
                    ..form
                },
                roles: registrable_roles(),
            };
            Ok((StatusCode::BAD_REQUEST, render(&template)?).into_response())
        }
    }
}

pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    web_session(cookies, &state.config).logout();
    Redirect::to("/login")
}

pub async fn forgot_password_page() -> PageResult {
    render(&ForgotPasswordTemplate {
        error: String::new(),
        email: String::new(),
        sent: false,
    })
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> PageResult {
    let email = form.email.trim().to_string();
    if email.is_empty() {
        return render(&ForgotPasswordTemplate {
            error: "Email is required".to_string(),
            email,
            sent: false,
        });
    }

    let template = match state.api.forgot_password(&email).await {
        Ok(()) => {
            log::info!("password reset requested for {}", email);
            ForgotPasswordTemplate {
                error: String::new(),
                email,
                sent: true,
            }
        }
        Err(err) => ForgotPasswordTemplate {
            error: recovery_error(&err),
            email,
            sent: false,
        },
    };
    render(&template)
}

/// Checks done before the backend is asked to reset a password.
fn check_reset(form: &ResetPasswordForm) -> Option<&'static str> {
    if form.token.trim().is_empty() {
        Some("Invalid or missing reset token. Please request a new password reset.")
    } else if form.password.chars().count() < MIN_PASSWORD_LEN {
        Some("Password must be at least 6 characters")
    } else if form.password != form.confirm_password {
        Some("Passwords do not match")
    } else {
        None
    }
}

pub async fn reset_password_page(Query(query): Query<ResetQuery>) -> PageResult {
    let error = if query.token.trim().is_empty() {
        "Invalid or missing reset token. Please request a new password reset.".to_string()
    } else {
        String::new()
    };
    render(&ResetPasswordTemplate {
        error,
        token: query.token,
        done: false,
    })
}

pub async fn reset_password(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> PageResult {
    if let Some(problem) = check_reset(&form) {
        return render(&ResetPasswordTemplate {
            error: problem.to_string(),
            token: form.token,
            done: false,
        });
    }

    let template = match state.api.reset_password(form.token.trim(), &form.password).await {
        Ok(()) => ResetPasswordTemplate {
            error: String::new(),
            token: String::new(),
            done: true,
        },
        Err(err) => ResetPasswordTemplate {
            error: recovery_error(&err),
            token: form.token,
            done: false,
        },
    };
    render(&template)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reset(token: &str, password: &str, confirm: &str) -> ResetPasswordForm {
        ResetPasswordForm {
            token: token.into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn reset_checks_token_length_and_confirmation() {
        assert!(check_reset(&reset("", "secret1", "secret1")).is_some());
        assert_eq!(
            check_reset(&reset("t", "abc", "abc")),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(
            check_reset(&reset("t", "secret1", "secret2")),
            Some("Passwords do not match")
        );
        assert_eq!(check_reset(&reset("t", "secret1", "secret1")), None);
    }

    #[test]
    fn admin_cannot_self_register() {
        assert!(!registrable_roles().contains(&Role::Admin));
        assert_eq!(registrable_roles().len(), 4);
    }
}
