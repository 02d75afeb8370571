use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ApiError, AppState, PathParams, QueryParams};
use crate::domain::aggregates::product::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::aggregates::{
    Category, ProductOrdering, ProductPage, ProductQuery, ProductSummary, ProductWithRelated, SortField,
};
use crate::StoreError;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub best_sellers: Option<String>,
    pub category: Option<String>,
}

impl From<ListParams> for ProductQuery {
    fn from(p: ListParams) -> Self {
        let ordering = if p.best_sellers.as_deref() == Some("1") {
            ProductOrdering::BestSellers
        } else {
            ProductOrdering::Field { field: SortField::parse(p.sort.as_deref()), ascending: p.order.as_deref() == Some("asc") }
        };
        ProductQuery {
            limit: p.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: p.offset.unwrap_or(0).max(0),
            ordering,
            category: p.category.filter(|c| !c.is_empty()),
        }
    }
}

pub async fn list_products(State(s): State<AppState>, QueryParams(p): QueryParams<ListParams>) -> Result<Json<ProductPage>, ApiError> {
    Ok(Json(s.catalog.list_products(&p.into()).await?))
}

#[derive(Debug, Deserialize)]
pub struct RailParams { pub limit: Option<i64> }

#[derive(Debug, Serialize)]
pub struct ProductRail { pub products: Vec<ProductSummary> }

/// Home page rails degrade to an empty list rather than failing the page.
pub async fn best_sellers(State(s): State<AppState>, QueryParams(p): QueryParams<RailParams>) -> Json<ProductRail> {
    let limit = p.limit.unwrap_or(4).clamp(1, MAX_PAGE_SIZE);
    let products = s.catalog.best_sellers(limit).await.unwrap_or_else(|e| {
        warn!(error = %e, "error fetching best sellers");
        vec![]
    });
    Json(ProductRail { products })
}

pub async fn new_arrivals(State(s): State<AppState>, QueryParams(p): QueryParams<RailParams>) -> Json<ProductRail> {
    let limit = p.limit.unwrap_or(6).clamp(1, MAX_PAGE_SIZE);
    let products = s.catalog.new_arrivals(limit).await.unwrap_or_else(|e| {
        warn!(error = %e, "error fetching new arrivals");
        vec![]
    });
    Json(ProductRail { products })
}

pub async fn get_product(State(s): State<AppState>, PathParams(slug): PathParams<String>) -> Result<Json<ProductWithRelated>, ApiError> {
    let product = s.catalog.product_detail(&slug).await?.ok_or(StoreError::ProductNotFound)?;
    let related_products = s.catalog.related_products(&product).await.unwrap_or_else(|e| {
        warn!(slug, error = %e, "error fetching related products");
        vec![]
    });
    Ok(Json(ProductWithRelated { product, related_products }))
}

#[derive(Debug, Serialize)]
pub struct CategoryList { pub categories: Vec<Category> }

pub async fn list_categories(State(s): State<AppState>) -> Json<CategoryList> {
    let categories = s.catalog.categories().await.unwrap_or_else(|e| {
        warn!(error = %e, "error fetching categories, serving fallback list");
        Category::fallback()
    });
    Json(CategoryList { categories })
}

pub async fn test_connection(State(s): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let data = s.catalog.ping().await?;
    Ok(Json(serde_json::json!({ "success": true, "data": data })))
}
