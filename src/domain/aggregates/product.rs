//! Catalog read models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Vnd;

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.png";
pub const RELATED_PRODUCTS_LIMIT: i64 = 4;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
}

impl Category {
    /// Shown when the categories table cannot be read.
    pub fn fallback() -> Vec<Category> {
        [("1", "Giày nam", "men"), ("2", "Giày nữ", "women"), ("3", "Trẻ em", "kids"),
         ("4", "Thể thao", "sport"), ("5", "Thời trang", "casual"), ("6", "Outdoor", "outdoor")]
            .into_iter()
            .map(|(id, name, slug)| Category { id: id.into(), name: name.into(), slug: slug.into(), image_url: None })
            .collect()
    }
}

/// Card-sized product used by listings, home page rails and related products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price: i64,
    #[sqlx(default)]
    pub price_formatted: String,
    pub image_url: Option<String>,
    pub sold_count: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    #[sqlx(default)]
    pub is_new: bool,
}

impl ProductSummary {
    pub fn with_formatted_price(mut self) -> Self {
        self.price_formatted = Vnd::from_db(self.price).formatted();
        self
    }

    pub fn marked_new(mut self) -> Self {
        self.is_new = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    Price,
    Name,
}

impl SortField {
    /// Unknown sort keys fall back to newest first.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("price") => Self::Price,
            Some("name") => Self::Name,
            _ => Self::CreatedAt,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "p.created_at",
            Self::Price => "p.price",
            Self::Name => "p.name",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductOrdering {
    BestSellers,
    Field { field: SortField, ascending: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub limit: i64,
    pub offset: i64,
    pub ordering: ProductOrdering,
    pub category: Option<String>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            ordering: ProductOrdering::Field { field: SortField::CreatedAt, ascending: false },
            category: None,
        }
    }
}

impl ProductQuery {
    pub fn order_by(&self) -> String {
        match &self.ordering {
            ProductOrdering::BestSellers => "p.sold_count DESC".to_string(),
            ProductOrdering::Field { field, ascending } => {
                format!("{} {}", field.column(), if *ascending { "ASC" } else { "DESC" })
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<ProductSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Full product row as the detail page reads it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: i64,
    pub image_url: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub sold_count: i64,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductSize {
    pub value: String,
    pub label: String,
    pub in_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: i64,
    pub price_formatted: String,
    pub images: Vec<ProductImage>,
    pub sizes: Vec<ProductSize>,
    pub category: Option<CategoryRef>,
    pub sold_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductDetail {
    /// Gallery comes from `image_urls` when present, otherwise the single
    /// cover image, otherwise the placeholder.
    pub fn from_record(record: ProductRecord, sizes: Vec<ProductSize>) -> Self {
        let urls = match record.image_urls {
            Some(urls) if !urls.is_empty() => urls,
            _ => vec![record.image_url.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())],
        };
        let images = urls.into_iter().map(|url| ProductImage { url, alt: record.name.clone() }).collect();
        let category = match (record.category_id, record.category_name, record.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(CategoryRef { id, name, slug }),
            _ => None,
        };
        Self {
            id: record.id, name: record.name, slug: record.slug, description: record.description,
            price: record.price, price_formatted: Vnd::from_db(record.price).formatted(),
            images, sizes, category, sold_count: record.sold_count,
            created_at: record.created_at, updated_at: record.updated_at,
        }
    }

    pub fn category_slug(&self) -> Option<&str> { self.category.as_ref().map(|c| c.slug.as_str()) }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductWithRelated {
    pub product: ProductDetail,
    pub related_products: Vec<ProductSummary>,
}
