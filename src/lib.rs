//! Sneaker Shop storefront service
//!
//! Backend for a Vietnamese shoe shop. Catalog, profiles and orders live in
//! the hosted Postgres of the backend-as-a-service; authentication is a
//! passthrough to its auth API.
//!
//! ## Features
//! - Product listing, detail pages and categories
//! - Session carts with merge-by-(product, size) line items
//! - VND formatting and free-shipping rules
//! - Checkout validation and order submission
//! - Sign in / sign up / password reset passthrough

pub mod api;
pub mod backend;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod persistence;

use thiserror::Error;

use crate::backend::auth::AuthError;
use crate::domain::aggregates::CartError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Malformed request ({status}): {detail}")]
    Malformed { status: u16, detail: String },

    #[error("Missing or invalid access token")]
    Unauthorized,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order submission failed: {0}")]
    OrderSubmission(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
