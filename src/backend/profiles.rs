use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PgBackend;
use crate::domain::account::ProfileUpdate;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub postal_code: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create(&self, id: Uuid, email: &str, full_name: &str) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Profile>>;
    async fn update(&self, id: Uuid, changes: &ProfileUpdate) -> Result<Option<Profile>>;
}

#[async_trait]
impl ProfileStore for PgBackend {
    async fn create(&self, id: Uuid, email: &str, full_name: &str) -> Result<()> {
        sqlx::query("INSERT INTO profiles (id, email, full_name, created_at, updated_at) VALUES ($1, $2, $3, NOW(), NOW()) ON CONFLICT (id) DO NOTHING")
            .bind(id).bind(email).bind(full_name).execute(&self.db).await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Profile>> {
        let p = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1").bind(id).fetch_optional(&self.db).await?;
        Ok(p)
    }

    async fn update(&self, id: Uuid, c: &ProfileUpdate) -> Result<Option<Profile>> {
        let p = sqlx::query_as::<_, Profile>("UPDATE profiles SET full_name = $2, phone = $3, address = $4, city = $5, district = $6, ward = $7, postal_code = $8, updated_at = NOW() WHERE id = $1 RETURNING *")
            .bind(id).bind(&c.full_name).bind(&c.phone).bind(&c.address).bind(&c.city)
            .bind(&c.district).bind(&c.ward).bind(&c.postal_code)
            .fetch_optional(&self.db).await?;
        Ok(p)
    }
}
