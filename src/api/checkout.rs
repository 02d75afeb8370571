use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::{ApiError, AppState, JsonBody, PathParams};
use crate::checkout::PlacedOrder;
use crate::domain::checkout::CheckoutForm;

pub async fn place_order(
    State(s): State<AppState>,
    PathParams(session): PathParams<String>,
    JsonBody(form): JsonBody<CheckoutForm>,
) -> Result<(StatusCode, Json<PlacedOrder>), ApiError> {
    let placed = s.checkout.place_order(&session, form).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}
