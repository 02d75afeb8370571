use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiError, AppState, JsonBody, PathParams};
use crate::domain::aggregates::{Change, NewLineItem};
use crate::persistence::CartView;

pub async fn get_cart(State(s): State<AppState>, PathParams(session): PathParams<String>) -> Json<CartView> {
    Json(s.carts.view(&session).await)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedToCart {
    pub item_id: Uuid,
    pub merged: bool,
    #[serde(flatten)]
    pub view: CartView,
}

pub async fn add_item(
    State(s): State<AppState>,
    PathParams(session): PathParams<String>,
    JsonBody(candidate): JsonBody<NewLineItem>,
) -> Result<(StatusCode, Json<AddedToCart>), ApiError> {
    let added = s.carts.mutate(&session, |store| {
        store.add_item(candidate).map(|outcome| AddedToCart { item_id: outcome.item_id, merged: outcome.merged, view: CartView::from(&*store) })
    }).await?;
    let status = if added.merged { StatusCode::OK } else { StatusCode::CREATED };
    Ok((status, Json(added)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantity { pub quantity: i64 }

/// An unknown item id is not an error; the unchanged cart comes back.
pub async fn update_item(
    State(s): State<AppState>,
    PathParams((session, item_id)): PathParams<(String, Uuid)>,
    JsonBody(r): JsonBody<UpdateQuantity>,
) -> Result<Json<CartView>, ApiError> {
    let view = s.carts.mutate(&session, |store| {
        store.update_item_quantity(item_id, r.quantity).map(|_| CartView::from(&*store))
    }).await?;
    Ok(Json(view))
}

pub async fn remove_item(State(s): State<AppState>, PathParams((session, item_id)): PathParams<(String, Uuid)>) -> Json<CartView> {
    let view = s.carts.mutate(&session, |store| {
        if store.remove_item(item_id) == Change::NoMatch {
            tracing::debug!(%item_id, "remove for unknown cart item");
        }
        CartView::from(&*store)
    }).await;
    Json(view)
}

pub async fn clear_cart(State(s): State<AppState>, PathParams(session): PathParams<String>) -> StatusCode {
    s.carts.mutate(&session, |store| store.clear()).await;
    StatusCode::NO_CONTENT
}

pub async fn open_cart(State(s): State<AppState>, PathParams(session): PathParams<String>) -> Json<CartView> {
    Json(s.carts.with_visibility(&session, |store| { store.open(); CartView::from(&*store) }).await)
}

pub async fn close_cart(State(s): State<AppState>, PathParams(session): PathParams<String>) -> Json<CartView> {
    Json(s.carts.with_visibility(&session, |store| { store.close(); CartView::from(&*store) }).await)
}
