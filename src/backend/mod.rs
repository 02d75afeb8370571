//! Collaborators hosted by the backend-as-a-service.
//!
//! Catalog, profile and order tables are reached through its Postgres
//! connection; sign-in and friends go through its auth REST API.

pub mod auth;
pub mod catalog;
pub mod orders;
pub mod profiles;

pub use auth::{AuthError, AuthProvider, AuthSession, AuthUser, SignUpOutcome, SupabaseAuth};
pub use catalog::Catalog;
pub use orders::OrderGateway;
pub use profiles::{Profile, ProfileStore};

use sqlx::PgPool;

/// Postgres-backed implementation of [`Catalog`], [`OrderGateway`] and [`ProfileStore`].
#[derive(Clone)]
pub struct PgBackend {
    db: PgPool,
}

impl PgBackend {
    pub fn new(db: PgPool) -> Self { Self { db } }
    pub fn pool(&self) -> &PgPool { &self.db }
}
