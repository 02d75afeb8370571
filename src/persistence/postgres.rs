use async_trait::async_trait;
use sqlx::PgPool;

use super::CartStorage;
use crate::Result;

/// One row per session key in `cart_snapshots`.
#[derive(Clone)]
pub struct PgCartStorage {
    db: PgPool,
}

impl PgCartStorage {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl CartStorage for PgCartStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT payload FROM cart_snapshots WHERE session_key = $1")
            .bind(key).fetch_optional(&self.db).await?;
        Ok(row.map(|r| r.0))
    }

    async fn save(&self, key: &str, payload: &str) -> Result<()> {
        sqlx::query("INSERT INTO cart_snapshots (session_key, payload, updated_at) VALUES ($1, $2, NOW()) ON CONFLICT (session_key) DO UPDATE SET payload = EXCLUDED.payload, updated_at = NOW()")
            .bind(key).bind(payload).execute(&self.db).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM cart_snapshots WHERE session_key = $1").bind(key).execute(&self.db).await?;
        Ok(())
    }
}
