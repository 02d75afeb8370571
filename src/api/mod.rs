//! HTTP API consumed by the storefront pages.

mod account;
mod cart;
mod checkout;
mod locations;
mod products;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::backend::{AuthError, AuthProvider, Catalog, ProfileStore};
use crate::checkout::Checkout;
use crate::domain::aggregates::CartError;
use crate::persistence::CartSessions;
use crate::StoreError;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub auth: Arc<dyn AuthProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub carts: Arc<CartSessions>,
    pub checkout: Arc<Checkout>,
    pub site_url: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "sneaker-shop"})) }))
        .route("/api/test-connection", get(products::test_connection))
        .route("/api/products", get(products::list_products))
        .route("/api/products/best-sellers", get(products::best_sellers))
        .route("/api/products/new-arrivals", get(products::new_arrivals))
        .route("/api/products/:slug", get(products::get_product))
        .route("/api/categories", get(products::list_categories))
        .route("/api/locations/cities", get(locations::cities))
        .route("/api/locations/cities/:city/districts", get(locations::districts))
        .route("/api/locations/districts/:district/wards", get(locations::wards))
        .route("/api/cart/:session", get(cart::get_cart).delete(cart::clear_cart))
        .route("/api/cart/:session/items", post(cart::add_item))
        .route("/api/cart/:session/items/:item_id", patch(cart::update_item).delete(cart::remove_item))
        .route("/api/cart/:session/open", post(cart::open_cart))
        .route("/api/cart/:session/close", post(cart::close_cart))
        .route("/api/checkout/:session", post(checkout::place_order))
        .route("/api/auth/login", post(account::login))
        .route("/api/auth/register", post(account::register))
        .route("/api/auth/logout", post(account::logout))
        .route("/api/auth/forgot-password", post(account::forgot_password))
        .route("/api/auth/reset-password", post(account::reset_password))
        .route("/auth/callback", get(account::oauth_callback))
        .route("/api/account", get(account::get_account))
        .route("/api/account/profile", put(account::update_profile))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

/// Error rendered as `{"error": "..."}` with a Vietnamese message the page
/// can show directly.
#[derive(Debug)]
pub struct ApiError(pub StoreError);

impl<E: Into<StoreError>> From<E> for ApiError {
    fn from(e: E) -> Self { ApiError(e.into()) }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            StoreError::ProductNotFound => StatusCode::NOT_FOUND,
            StoreError::EmptyCart => StatusCode::CONFLICT,
            StoreError::Malformed { status, .. } => StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST),
            StoreError::Cart(_) | StoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::Unauthorized => StatusCode::UNAUTHORIZED,
            StoreError::Auth(AuthError::Rejected { status, .. }) if *status == 401 || *status == 403 => StatusCode::UNAUTHORIZED,
            StoreError::Auth(AuthError::Rejected { .. }) => StatusCode::BAD_REQUEST,
            StoreError::Auth(_) | StoreError::OrderSubmission(_) => StatusCode::BAD_GATEWAY,
            StoreError::Database(_) | StoreError::Storage(_) | StoreError::Serialization(_) | StoreError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            StoreError::ProductNotFound => "Không tìm thấy sản phẩm".into(),
            StoreError::EmptyCart => "Giỏ hàng của bạn đang trống".into(),
            StoreError::Cart(CartError::InvalidQuantity(_)) => "Số lượng không hợp lệ".into(),
            StoreError::Validation(_) => "Dữ liệu không hợp lệ".into(),
            StoreError::Malformed { .. } => "Yêu cầu không hợp lệ".into(),
            StoreError::Unauthorized => "Vui lòng đăng nhập".into(),
            StoreError::Auth(AuthError::Rejected { message, .. }) => message.clone(),
            StoreError::Auth(_) => "Không thể kết nối đến máy chủ xác thực".into(),
            StoreError::OrderSubmission(_) => "Đã xảy ra lỗi khi xử lý đơn hàng. Vui lòng thử lại sau.".into(),
            _ => "Lỗi máy chủ nội bộ".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "request failed");
        }
        let mut body = serde_json::json!({ "error": self.message() });
        if let StoreError::Validation(errors) = &self.0 {
            body["fields"] = serde_json::to_value(field_messages(errors)).unwrap_or_default();
        }
        (status, Json(body)).into_response()
    }
}

/// Request extractors whose rejections render through [`ApiError`], so a
/// malformed body, path or query string gets the same JSON error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParams<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

impl From<JsonRejection> for StoreError {
    fn from(r: JsonRejection) -> Self { StoreError::Malformed { status: r.status().as_u16(), detail: r.body_text() } }
}

impl From<PathRejection> for StoreError {
    fn from(r: PathRejection) -> Self { StoreError::Malformed { status: r.status().as_u16(), detail: r.body_text() } }
}

impl From<QueryRejection> for StoreError {
    fn from(r: QueryRejection) -> Self { StoreError::Malformed { status: r.status().as_u16(), detail: r.body_text() } }
}

/// Flattens nested validation errors into `field -> [messages]`, using the
/// innermost field name.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    collect_messages(errors, &mut out);
    out
}

fn collect_messages(errors: &ValidationErrors, out: &mut BTreeMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages = list.iter().map(|e| e.message.as_deref().unwrap_or(&e.code).to_string());
                out.entry(field.to_string()).or_insert_with(Vec::new).extend(messages);
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, out),
            ValidationErrorsKind::List(items) => items.values().for_each(|inner| collect_messages(inner, out)),
        }
    }
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError(StoreError::Unauthorized))
}
