//! Cart Store
//!
//! Owns one cart plus its drawer visibility. Every content mutation goes
//! through [`Cart`]; the store only adds the open/closed flag on top, and
//! reports visibility changes separately so callers can react to them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart::{Addition, Cart, CartError, Change, NewLineItem, ShippingPolicy};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Open,
    #[default]
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityChange {
    Opened,
    Closed,
    Unchanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddOutcome {
    pub item_id: Uuid,
    pub merged: bool,
    pub visibility: VisibilityChange,
}

#[derive(Clone, Debug)]
pub struct CartStore {
    cart: Cart,
    visibility: Visibility,
    policy: ShippingPolicy,
}

impl CartStore {
    pub fn new(policy: ShippingPolicy) -> Self {
        Self { cart: Cart::empty(), visibility: Visibility::Closed, policy }
    }

    /// Adopts a previously saved cart. Duplicate lines are folded and totals
    /// rederived, so a stale or hand-edited snapshot cannot carry inconsistent
    /// figures.
    pub fn restore(mut cart: Cart, policy: ShippingPolicy) -> Self {
        cart.consolidate(&policy);
        Self { cart, visibility: Visibility::Closed, policy }
    }

    pub fn cart(&self) -> &Cart { &self.cart }
    pub fn visibility(&self) -> Visibility { self.visibility }
    pub fn is_open(&self) -> bool { self.visibility == Visibility::Open }
    pub fn policy(&self) -> &ShippingPolicy { &self.policy }

    /// Adds the candidate and opens the drawer. An invalid quantity leaves
    /// both contents and visibility untouched.
    pub fn add_item(&mut self, candidate: NewLineItem) -> Result<AddOutcome, CartError> {
        let Addition { item_id, merged } = self.cart.add_item(candidate, &self.policy)?;
        let visibility = self.open();
        Ok(AddOutcome { item_id, merged, visibility })
    }

    pub fn update_item_quantity(&mut self, item_id: Uuid, quantity: i64) -> Result<Change, CartError> {
        self.cart.update_quantity(item_id, quantity, &self.policy)
    }

    pub fn remove_item(&mut self, item_id: Uuid) -> Change {
        self.cart.remove_item(item_id, &self.policy)
    }

    pub fn clear(&mut self) { self.cart.clear(); }

    pub fn open(&mut self) -> VisibilityChange {
        self.set_visibility(Visibility::Open)
    }

    pub fn close(&mut self) -> VisibilityChange {
        self.set_visibility(Visibility::Closed)
    }

    fn set_visibility(&mut self, next: Visibility) -> VisibilityChange {
        if self.visibility == next {
            return VisibilityChange::Unchanged;
        }
        self.visibility = next;
        match next {
            Visibility::Open => VisibilityChange::Opened,
            Visibility::Closed => VisibilityChange::Closed,
        }
    }
}

impl Default for CartStore {
    fn default() -> Self { Self::new(ShippingPolicy::default()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Vnd;

    fn shoe(qty: i64) -> NewLineItem {
        NewLineItem {
            product_id: "P1".into(), name: "Giày Chạy Bộ".into(), price: Vnd::new(100_000),
            price_formatted: "100.000\u{a0}₫".into(), quantity: qty, size: Some("40".into()),
            color: None, image_url: None, slug: "giay-chay-bo".into(),
        }
    }

    #[test]
    fn test_add_opens_drawer() {
        let mut store = CartStore::default();
        assert_eq!(store.visibility(), Visibility::Closed);
        let outcome = store.add_item(shoe(1)).unwrap();
        assert_eq!(outcome.visibility, VisibilityChange::Opened);
        assert!(store.is_open());
        let again = store.add_item(shoe(1)).unwrap();
        assert_eq!(again.visibility, VisibilityChange::Unchanged);
        assert!(again.merged);
    }

    #[test]
    fn test_invalid_add_keeps_drawer_closed() {
        let mut store = CartStore::default();
        assert_eq!(store.add_item(shoe(0)), Err(CartError::InvalidQuantity(0)));
        assert_eq!(store.visibility(), Visibility::Closed);
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_open_close_do_not_touch_contents() {
        let mut store = CartStore::default();
        store.add_item(shoe(2)).unwrap();
        let before = store.cart().clone();
        assert_eq!(store.close(), VisibilityChange::Closed);
        assert_eq!(store.close(), VisibilityChange::Unchanged);
        assert_eq!(store.open(), VisibilityChange::Opened);
        assert_eq!(store.cart(), &before);
    }

    #[test]
    fn test_clear_yields_zero_state() {
        let mut store = CartStore::default();
        store.add_item(shoe(3)).unwrap();
        store.clear();
        let cart = store.cart();
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.subtotal(), Vnd::zero());
        assert_eq!(cart.shipping(), Vnd::zero());
        assert_eq!(cart.total(), Vnd::zero());
        assert!(store.is_open());
    }

    #[test]
    fn test_mutations_keep_visibility() {
        let mut store = CartStore::default();
        let id = store.add_item(shoe(1)).unwrap().item_id;
        store.close();
        store.update_item_quantity(id, 4).unwrap();
        assert_eq!(store.cart().total_items(), 4);
        assert_eq!(store.remove_item(id), Change::Applied);
        assert_eq!(store.visibility(), Visibility::Closed);
    }
}
