use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{restore, sync, CartStorage};
use crate::domain::aggregates::{Cart, CartStore, ShippingPolicy};

/// What the cart drawer renders: contents plus the open flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart: Cart,
    pub is_cart_open: bool,
}

impl From<&CartStore> for CartView {
    fn from(store: &CartStore) -> Self {
        Self { cart: store.cart().clone(), is_cart_open: store.is_open() }
    }
}

/// Cart stores keyed by session. Each session has its own lock, so
/// mutations within a session apply one at a time while separate sessions
/// proceed independently. The map lock is never held across storage I/O.
///
/// A session whose cart is empty and whose drawer is closed holds nothing
/// worth keeping, so it is dropped from the map once no request is using it.
pub struct CartSessions {
    storage: Arc<dyn CartStorage>,
    policy: ShippingPolicy,
    stores: Mutex<Live>,
}

#[derive(Default)]
struct Live {
    by_session: HashMap<String, Arc<Mutex<CartStore>>>,
    /// Bumped on every eviction so a restore that raced one can be retried.
    evictions: u64,
}

impl CartSessions {
    pub fn new(storage: Arc<dyn CartStorage>, policy: ShippingPolicy) -> Self {
        Self { storage, policy, stores: Mutex::new(Live::default()) }
    }

    pub fn policy(&self) -> &ShippingPolicy { &self.policy }

    /// Number of sessions currently held in memory.
    pub async fn active(&self) -> usize {
        self.stores.lock().await.by_session.len()
    }

    async fn handle(&self, session: &str) -> Arc<Mutex<CartStore>> {
        loop {
            let generation = {
                let live = self.stores.lock().await;
                if let Some(store) = live.by_session.get(session) {
                    return store.clone();
                }
                live.evictions
            };
            let restored = restore(self.storage.as_ref(), session, self.policy).await;
            let mut live = self.stores.lock().await;
            // An eviction during the load may have removed a newer cart for this
            // session from memory after its slot was rewritten; load again.
            if live.evictions != generation && !live.by_session.contains_key(session) {
                continue;
            }
            return live
                .by_session
                .entry(session.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(restored)))
                .clone();
        }
    }

    /// Drops the session from the map when it is idle and holds nothing.
    async fn release(&self, session: &str, handle: Arc<Mutex<CartStore>>) {
        let mut live = self.stores.lock().await;
        let Some(current) = live.by_session.get(session) else { return };
        // Handles are only cloned under the map lock: two owners means the
        // map and this caller, so no other request can be using it.
        if !Arc::ptr_eq(current, &handle) || Arc::strong_count(&handle) != 2 {
            return;
        }
        let idle = handle.try_lock().map(|store| store.cart().is_empty() && !store.is_open()).unwrap_or(false);
        if idle {
            live.by_session.remove(session);
            live.evictions += 1;
            debug!(session, "dropped idle cart session");
        }
    }

    async fn persist(&self, session: &str, cart: &Cart) {
        match sync(self.storage.as_ref(), session, cart).await {
            Ok(persisted) => debug!(session, ?persisted, "cart synced"),
            Err(e) => warn!(session, error = %e, "failed to persist cart"),
        }
    }

    /// Runs a read-only closure against the session's store.
    pub async fn read<R>(&self, session: &str, f: impl FnOnce(&CartStore) -> R) -> R {
        let handle = self.handle(session).await;
        let out = {
            let store = handle.lock().await;
            f(&*store)
        };
        self.release(session, handle).await;
        out
    }

    /// Runs a mutation, then writes the resulting cart back to storage.
    /// A failed write is logged and does not undo the mutation.
    pub async fn mutate<R>(&self, session: &str, f: impl FnOnce(&mut CartStore) -> R) -> R {
        let handle = self.handle(session).await;
        let out = {
            let mut store = handle.lock().await;
            let out = f(&mut *store);
            self.persist(session, store.cart()).await;
            out
        };
        self.release(session, handle).await;
        out
    }

    /// Changes only the drawer flag; storage is not touched.
    pub async fn with_visibility<R>(&self, session: &str, f: impl FnOnce(&mut CartStore) -> R) -> R {
        let handle = self.handle(session).await;
        let out = {
            let mut store = handle.lock().await;
            f(&mut *store)
        };
        self.release(session, handle).await;
        out
    }

    /// Hands a copy of the cart to `submit` while keeping the session locked,
    /// and clears the cart only if `submit` succeeds. Nothing can be added to
    /// or removed from the cart between the copy and the clear.
    pub async fn drain<T, E, F, Fut>(&self, session: &str, submit: F) -> Result<T, E>
    where
        F: FnOnce(Cart) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let handle = self.handle(session).await;
        let out = {
            let mut store = handle.lock().await;
            let out = submit(store.cart().clone()).await;
            if out.is_ok() {
                store.clear();
                self.persist(session, store.cart()).await;
            }
            out
        };
        self.release(session, handle).await;
        out
    }

    pub async fn view(&self, session: &str) -> CartView {
        self.read(session, |store| CartView::from(store)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::NewLineItem;
    use crate::domain::value_objects::Vnd;
    use crate::persistence::MemoryCartStorage;
    use crate::Result;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Holds every load of the `"slow"` key until released.
    #[derive(Default)]
    struct GatedStorage {
        inner: MemoryCartStorage,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl CartStorage for GatedStorage {
        async fn load(&self, key: &str) -> Result<Option<String>> {
            if key == "slow" {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.load(key).await
        }
        async fn save(&self, key: &str, payload: &str) -> Result<()> { self.inner.save(key, payload).await }
        async fn remove(&self, key: &str) -> Result<()> { self.inner.remove(key).await }
    }

    fn candidate(product: &str, price: u64, qty: i64, size: Option<&str>) -> NewLineItem {
        NewLineItem {
            product_id: product.into(), name: product.into(), price: Vnd::new(price),
            price_formatted: String::new(), quantity: qty, size: size.map(Into::into),
            color: None, image_url: None, slug: product.to_lowercase(),
        }
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let storage = Arc::new(MemoryCartStorage::default());
        let sessions = CartSessions::new(storage.clone(), ShippingPolicy::default());
        sessions.mutate("a", |s| s.add_item(candidate("A", 100_000, 1, None))).await.unwrap();
        assert_eq!(sessions.view("a").await.cart.total_items(), 1);
        assert!(sessions.view("b").await.cart.is_empty());
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_only_item_deletes_slot() {
        let storage = Arc::new(MemoryCartStorage::default());
        let sessions = CartSessions::new(storage.clone(), ShippingPolicy::default());
        let id = sessions.mutate("a", |s| s.add_item(candidate("A", 100_000, 1, None))).await.unwrap().item_id;
        assert!(storage.load("a").await.unwrap().is_some());
        sessions.mutate("a", |s| s.remove_item(id)).await;
        assert_eq!(sessions.view("a").await.cart, Cart::empty());
        assert!(storage.load("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_new_process_restores_saved_cart() {
        let storage = Arc::new(MemoryCartStorage::default());
        let first = CartSessions::new(storage.clone(), ShippingPolicy::default());
        first.mutate("a", |s| s.add_item(candidate("A", 100_000, 2, Some("40")))).await.unwrap();
        first.mutate("a", |s| s.add_item(candidate("A", 100_000, 1, Some("40")))).await.unwrap();

        let second = CartSessions::new(storage, ShippingPolicy::default());
        let view = second.view("a").await;
        assert_eq!(view.cart.items().len(), 1);
        assert_eq!(view.cart.items()[0].quantity.value(), 3);
        assert_eq!(view.cart.total(), Vnd::new(330_000));
        assert!(!view.is_cart_open);
    }

    #[tokio::test]
    async fn test_visibility_not_persisted() {
        let storage = Arc::new(MemoryCartStorage::default());
        let sessions = CartSessions::new(storage.clone(), ShippingPolicy::default());
        sessions.with_visibility("a", |s| s.open()).await;
        assert!(sessions.view("a").await.is_cart_open);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_slow_restore_does_not_block_other_sessions() {
        let storage = Arc::new(GatedStorage::default());
        let sessions = Arc::new(CartSessions::new(storage.clone(), ShippingPolicy::default()));

        let pending = tokio::spawn({
            let sessions = sessions.clone();
            async move { sessions.view("slow").await }
        });
        storage.entered.notified().await;

        let fast = tokio::time::timeout(Duration::from_millis(500), sessions.view("fast")).await;
        assert!(fast.is_ok());

        storage.release.notify_one();
        assert!(pending.await.unwrap().cart.is_empty());
    }

    #[tokio::test]
    async fn test_idle_sessions_are_dropped() {
        let sessions = CartSessions::new(Arc::new(MemoryCartStorage::default()), ShippingPolicy::default());
        for key in ["a", "b", "c"] {
            sessions.view(key).await;
        }
        assert_eq!(sessions.active().await, 0);

        let id = sessions.mutate("a", |s| s.add_item(candidate("A", 100_000, 1, None))).await.unwrap().item_id;
        assert_eq!(sessions.active().await, 1);

        sessions.with_visibility("a", |s| s.close()).await;
        assert_eq!(sessions.active().await, 1);
        sessions.mutate("a", |s| s.remove_item(id)).await;
        assert_eq!(sessions.active().await, 0);

        sessions.with_visibility("b", |s| s.open()).await;
        assert_eq!(sessions.active().await, 1);
        assert!(sessions.view("b").await.is_cart_open);
    }

    #[tokio::test]
    async fn test_dropped_session_reloads_from_storage() {
        let storage = Arc::new(MemoryCartStorage::default());
        let sessions = CartSessions::new(storage.clone(), ShippingPolicy::default());
        sessions.mutate("a", |s| s.add_item(candidate("A", 100_000, 2, None))).await.unwrap();
        sessions.with_visibility("a", |s| s.close()).await;
        assert_eq!(sessions.active().await, 1);

        sessions.mutate("a", |s| s.clear()).await;
        assert_eq!(sessions.active().await, 0);
        assert!(sessions.view("a").await.cart.is_empty());
    }

    #[tokio::test]
    async fn test_drain_clears_only_on_success() {
        let storage = Arc::new(MemoryCartStorage::default());
        let sessions = CartSessions::new(storage.clone(), ShippingPolicy::default());
        sessions.mutate("a", |s| s.add_item(candidate("A", 100_000, 2, None))).await.unwrap();

        let failed: std::result::Result<(), &str> = sessions.drain("a", |_| async { Err("rejected") }).await;
        assert!(failed.is_err());
        assert_eq!(sessions.view("a").await.cart.total_items(), 2);

        let seen = sessions.drain("a", |cart| async move { Ok::<_, ()>(cart.total_items()) }).await.unwrap();
        assert_eq!(seen, 2);
        assert!(sessions.view("a").await.cart.is_empty());
        assert!(storage.load("a").await.unwrap().is_none());
    }
}
