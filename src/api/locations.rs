use axum::Json;

use super::PathParams;
use crate::domain::checkout::locations::{self, Location};

pub async fn cities() -> Json<&'static [Location]> {
    Json(locations::cities())
}

pub async fn districts(PathParams(city): PathParams<String>) -> Json<&'static [Location]> {
    Json(locations::districts(&city))
}

pub async fn wards(PathParams(district): PathParams<String>) -> Json<&'static [Location]> {
    Json(locations::wards(&district))
}
