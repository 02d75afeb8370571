use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use validator::Validate;

use super::{bearer_token, ApiError, AppState, JsonBody, QueryParams};
use crate::backend::{AuthSession, AuthUser, Profile, SignUpOutcome};
use crate::domain::account::{ForgotPasswordForm, LoginForm, ProfileUpdate, RegisterForm, ResetPasswordForm};

#[derive(Debug, Serialize)]
pub struct Notice {
    pub message: &'static str,
}

pub async fn login(State(s): State<AppState>, JsonBody(form): JsonBody<LoginForm>) -> Result<Json<AuthSession>, ApiError> {
    form.validate()?;
    Ok(Json(s.auth.sign_in(&form.email, &form.password).await?))
}

#[derive(Debug, Serialize)]
pub struct Registered {
    #[serde(flatten)]
    pub outcome: SignUpOutcome,
    pub message: &'static str,
}

/// A failed profile insert does not undo the sign-up; it is only logged.
pub async fn register(State(s): State<AppState>, JsonBody(form): JsonBody<RegisterForm>) -> Result<(StatusCode, Json<Registered>), ApiError> {
    form.validate()?;
    let outcome = s.auth.sign_up(&form.email, &form.password, &form.name).await?;
    if let Err(e) = s.profiles.create(outcome.user().id, &form.email, &form.name).await {
        error!(user = %outcome.user().id, error = %e, "failed to create profile");
    }
    let message = "Vui lòng kiểm tra email để xác nhận tài khoản";
    Ok((StatusCode::CREATED, Json(Registered { outcome, message })))
}

pub async fn logout(State(s): State<AppState>, headers: HeaderMap) -> Result<StatusCode, ApiError> {
    s.auth.sign_out(bearer_token(&headers)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn forgot_password(State(s): State<AppState>, JsonBody(form): JsonBody<ForgotPasswordForm>) -> Result<Json<Notice>, ApiError> {
    form.validate()?;
    let redirect_to = format!("{}/auth/reset-password", s.site_url.trim_end_matches('/'));
    s.auth.request_password_reset(&form.email, &redirect_to).await?;
    Ok(Json(Notice { message: "Vui lòng kiểm tra email của bạn để đặt lại mật khẩu" }))
}

pub async fn reset_password(
    State(s): State<AppState>,
    headers: HeaderMap,
    JsonBody(form): JsonBody<ResetPasswordForm>,
) -> Result<Json<Notice>, ApiError> {
    let token = bearer_token(&headers)?;
    form.validate()?;
    s.auth.update_password(token, &form.password).await?;
    Ok(Json(Notice { message: "Mật khẩu của bạn đã được cập nhật" }))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub code_verifier: Option<String>,
}

/// OAuth return leg: swap the code for a session and land on the home page,
/// or go back to the login page with the reason.
pub async fn oauth_callback(State(s): State<AppState>, QueryParams(p): QueryParams<CallbackParams>) -> Response {
    let Some(code) = p.code.filter(|c| !c.is_empty()) else {
        return Redirect::to("/auth/login").into_response();
    };
    match s.auth.exchange_code(&code, p.code_verifier.as_deref()).await {
        Ok(session) => {
            let cookies = AppendHeaders([
                (header::SET_COOKIE, session_cookie("sb-access-token", &session.access_token, session.expires_in)),
                (header::SET_COOKIE, session_cookie("sb-refresh-token", &session.refresh_token, 60 * 60 * 24 * 30)),
            ]);
            (cookies, Redirect::to("/")).into_response()
        }
        Err(e) => {
            warn!(error = %e, "oauth code exchange failed");
            let reason = match &e {
                crate::backend::AuthError::Rejected { message, .. } => message.clone(),
                other => other.to_string(),
            };
            let encoded: String = url::form_urlencoded::byte_serialize(reason.as_bytes()).collect();
            Redirect::to(&format!("/auth/login?error={encoded}")).into_response()
        }
    }
}

fn session_cookie(name: &str, value: &str, max_age: i64) -> String {
    format!("{name}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax")
}

#[derive(Debug, Serialize)]
pub struct Account {
    pub user: AuthUser,
    pub profile: Option<Profile>,
}

pub async fn get_account(State(s): State<AppState>, headers: HeaderMap) -> Result<Json<Account>, ApiError> {
    let user = s.auth.user(bearer_token(&headers)?).await?;
    let profile = s.profiles.get(user.id).await.unwrap_or_else(|e| {
        warn!(user = %user.id, error = %e, "could not load profile");
        None
    });
    Ok(Json(Account { user, profile }))
}

pub async fn update_profile(
    State(s): State<AppState>,
    headers: HeaderMap,
    JsonBody(changes): JsonBody<ProfileUpdate>,
) -> Result<Json<Account>, ApiError> {
    let user = s.auth.user(bearer_token(&headers)?).await?;
    changes.validate()?;
    let profile = match s.profiles.update(user.id, &changes).await? {
        Some(profile) => profile,
        None => {
            let email = user.email.clone().unwrap_or_default();
            s.profiles.create(user.id, &email, &changes.full_name).await?;
            s.profiles.update(user.id, &changes).await?.ok_or_else(|| crate::StoreError::Storage("profile vanished after insert".into()))?
        }
    };
    Ok(Json(Account { user, profile: Some(profile) }))
}
