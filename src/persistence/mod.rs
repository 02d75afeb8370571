//! Cart snapshot persistence
//!
//! A cart is kept in a key-value slot as its JSON serialization. The slot is
//! read once when a session is first touched and rewritten after every
//! content mutation; an empty cart deletes the slot instead of storing an
//! empty structure.

mod memory;
mod postgres;
mod sessions;

pub use memory::MemoryCartStorage;
pub use postgres::PgCartStorage;
pub use sessions::{CartSessions, CartView};

use async_trait::async_trait;
use tracing::warn;

use crate::domain::aggregates::{Cart, CartStore, ShippingPolicy};
use crate::Result;

#[async_trait]
pub trait CartStorage: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>>;
    async fn save(&self, key: &str, payload: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Persisted {
    Saved,
    Cleared,
}

/// Rebuilds the store for `key`. A missing, unreadable or corrupt snapshot
/// starts the session from an empty cart.
pub async fn restore(storage: &dyn CartStorage, key: &str, policy: ShippingPolicy) -> CartStore {
    let payload = match storage.load(key).await {
        Ok(Some(payload)) => payload,
        Ok(None) => return CartStore::new(policy),
        Err(e) => {
            warn!(session = key, error = %e, "could not read saved cart, starting empty");
            return CartStore::new(policy);
        }
    };
    match serde_json::from_str::<Cart>(&payload) {
        Ok(cart) => CartStore::restore(cart, policy),
        Err(e) => {
            warn!(session = key, error = %e, "saved cart is not valid JSON, starting empty");
            CartStore::new(policy)
        }
    }
}

/// Writes the cart back to its slot, or clears the slot when the cart is empty.
pub async fn sync(storage: &dyn CartStorage, key: &str, cart: &Cart) -> Result<Persisted> {
    if cart.is_empty() {
        storage.remove(key).await?;
        return Ok(Persisted::Cleared);
    }
    let payload = serde_json::to_string(cart)?;
    storage.save(key, &payload).await?;
    Ok(Persisted::Saved)
}
