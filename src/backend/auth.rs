//! Auth passthrough
//!
//! Thin client for the hosted auth REST API (`/auth/v1`). Every call is a
//! single request; errors come back as [`AuthError`] and are shown to the
//! user once.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    pub user: AuthUser,
}

/// Sign-up either logs the user straight in or waits for email confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignUpOutcome {
    SignedIn { session: AuthSession },
    ConfirmationSent { user: AuthUser },
}

impl SignUpOutcome {
    pub fn user(&self) -> &AuthUser {
        match self {
            SignUpOutcome::SignedIn { session } => &session.user,
            SignUpOutcome::ConfirmationSent { user } => user,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Auth service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Auth service unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected auth response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;
    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<SignUpOutcome, AuthError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
    async fn request_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError>;
    async fn update_password(&self, access_token: &str, password: &str) -> Result<AuthUser, AuthError>;
    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<AuthSession, AuthError>;
    async fn user(&self, access_token: &str) -> Result<AuthUser, AuthError>;
}

pub struct SupabaseAuth {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(project_url: &str, anon_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/auth/v1", project_url.trim_end_matches('/')),
            anon_key: anon_key.into(),
        }
    }

    fn request(&self, method: Method, path: &str, access_token: Option<&str>) -> RequestBuilder {
        let bearer = access_token.unwrap_or(&self.anon_key);
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, AuthError> {
        let body = Self::checked(req.send().await?).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<(), AuthError> {
        Self::checked(req.send().await?).await.map(|_| ())
    }

    async fn checked(response: reqwest::Response) -> Result<String, AuthError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }
        debug!(status = status.as_u16(), "auth request rejected");
        Err(AuthError::Rejected { status: status.as_u16(), message: error_message(status, &body) })
    }
}

/// The auth API is not consistent about which key carries the message.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["msg", "error_description", "message", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string())
}

/// Sign-up returns a session when autoconfirm is on and a bare user otherwise.
fn parse_sign_up(body: serde_json::Value) -> Result<SignUpOutcome, AuthError> {
    if body.get("access_token").is_some() {
        return Ok(SignUpOutcome::SignedIn { session: serde_json::from_value(body)? });
    }
    let user = match body.get("user") {
        Some(user) => serde_json::from_value(user.clone())?,
        None => serde_json::from_value(body)?,
    };
    Ok(SignUpOutcome::ConfirmationSent { user })
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let req = self.request(Method::POST, "/token?grant_type=password", None)
            .json(&serde_json::json!({ "email": email, "password": password }));
        self.send(req).await
    }

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<SignUpOutcome, AuthError> {
        let req = self.request(Method::POST, "/signup", None).json(&serde_json::json!({
            "email": email, "password": password, "data": { "full_name": full_name },
        }));
        parse_sign_up(self.send(req).await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.send_empty(self.request(Method::POST, "/logout", Some(access_token))).await
    }

    async fn request_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let req = self.request(Method::POST, "/recover", None)
            .query(&[("redirect_to", redirect_to)])
            .json(&serde_json::json!({ "email": email }));
        self.send_empty(req).await
    }

    async fn update_password(&self, access_token: &str, password: &str) -> Result<AuthUser, AuthError> {
        let req = self.request(Method::PUT, "/user", Some(access_token)).json(&serde_json::json!({ "password": password }));
        self.send(req).await
    }

    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<AuthSession, AuthError> {
        let req = self.request(Method::POST, "/token?grant_type=pkce", None)
            .json(&serde_json::json!({ "auth_code": code, "code_verifier": code_verifier.unwrap_or_default() }));
        self.send(req).await
    }

    async fn user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        self.send(self.request(Method::GET, "/user", Some(access_token))).await
    }
}
