//! Cart Aggregate

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::{InvalidQuantity, Quantity, Vnd};

pub const FREE_SHIPPING_THRESHOLD: Vnd = Vnd::new(500_000);
pub const FLAT_SHIPPING_FEE: Vnd = Vnd::new(30_000);

/// Shipping is waived once the subtotal reaches `free_threshold`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShippingPolicy {
    pub free_threshold: Vnd,
    pub flat_fee: Vnd,
}

impl Default for ShippingPolicy {
    fn default() -> Self { Self { free_threshold: FREE_SHIPPING_THRESHOLD, flat_fee: FLAT_SHIPPING_FEE } }
}

impl ShippingPolicy {
    pub fn fee_for(&self, subtotal: Vnd) -> Vnd {
        if subtotal >= self.free_threshold { Vnd::zero() } else { self.flat_fee }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: Uuid,
    pub product_id: String,
    pub name: String,
    pub price: Vnd,
    pub price_formatted: String,
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub slug: String,
}

impl LineItem {
    pub fn line_total(&self) -> Vnd { self.price.multiply(self.quantity) }

    fn matches(&self, product_id: &str, size: Option<&str>) -> bool {
        self.product_id == product_id && self.size.as_deref() == size
    }
}

/// What the product page sends when "add to cart" is pressed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    pub product_id: String,
    pub name: String,
    pub price: Vnd,
    #[serde(default)]
    pub price_formatted: String,
    pub quantity: i64,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub slug: String,
}

/// Result of a content mutation that targets an existing line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    Applied,
    NoMatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Addition {
    pub item_id: Uuid,
    pub merged: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<LineItem>,
    total_items: u64,
    subtotal: Vnd,
    subtotal_formatted: String,
    shipping: Vnd,
    shipping_formatted: String,
    total: Vnd,
    total_formatted: String,
}

impl Default for Cart {
    fn default() -> Self { Self::empty() }
}

impl Cart {
    /// The zero-state cart. Shipping is zero here, not the flat fee.
    pub fn empty() -> Self {
        let zero = Vnd::zero().formatted();
        Self {
            items: vec![], total_items: 0,
            subtotal: Vnd::zero(), subtotal_formatted: zero.clone(),
            shipping: Vnd::zero(), shipping_formatted: zero.clone(),
            total: Vnd::zero(), total_formatted: zero,
        }
    }

    /// Derives every aggregate field from `items`.
    pub fn recalculate(items: Vec<LineItem>, policy: &ShippingPolicy) -> Self {
        if items.is_empty() {
            return Self::empty();
        }
        let total_items = items.iter().map(|i| u64::from(i.quantity.value())).fold(0u64, u64::saturating_add);
        let subtotal = items.iter().fold(Vnd::zero(), |acc, i| acc.add(i.line_total()));
        let shipping = policy.fee_for(subtotal);
        let total = subtotal.add(shipping);
        Self {
            items, total_items,
            subtotal, subtotal_formatted: subtotal.formatted(),
            shipping, shipping_formatted: shipping.formatted(),
            total, total_formatted: total.formatted(),
        }
    }

    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn total_items(&self) -> u64 { self.total_items }
    pub fn subtotal(&self) -> Vnd { self.subtotal }
    pub fn subtotal_formatted(&self) -> &str { &self.subtotal_formatted }
    pub fn shipping(&self) -> Vnd { self.shipping }
    pub fn shipping_formatted(&self) -> &str { &self.shipping_formatted }
    pub fn total(&self) -> Vnd { self.total }
    pub fn total_formatted(&self) -> &str { &self.total_formatted }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn item(&self, id: Uuid) -> Option<&LineItem> { self.items.iter().find(|i| i.id == id) }

    /// Adds a candidate, merging into the line with the same product and size.
    /// Visibility is the store's concern, not the cart's.
    pub fn add_item(&mut self, candidate: NewLineItem, policy: &ShippingPolicy) -> Result<Addition, CartError> {
        let quantity = Quantity::new(candidate.quantity)?;
        let mut items = std::mem::take(&mut self.items);
        let addition = match items.iter().position(|i| i.matches(&candidate.product_id, candidate.size.as_deref())) {
            Some(idx) => {
                let existing = &mut items[idx];
                existing.quantity = existing.quantity.saturating_add(quantity);
                Addition { item_id: existing.id, merged: true }
            }
            None => {
                let id = Uuid::new_v4();
                let price_formatted = if candidate.price_formatted.is_empty() {
                    candidate.price.formatted()
                } else {
                    candidate.price_formatted
                };
                items.push(LineItem {
                    id, product_id: candidate.product_id, name: candidate.name,
                    price: candidate.price, price_formatted, quantity,
                    size: candidate.size, color: candidate.color, image_url: candidate.image_url,
                    slug: candidate.slug,
                });
                Addition { item_id: id, merged: false }
            }
        };
        *self = Self::recalculate(items, policy);
        Ok(addition)
    }

    /// Quantities below 1 are rejected and leave the cart untouched.
    pub fn update_quantity(&mut self, id: Uuid, quantity: i64, policy: &ShippingPolicy) -> Result<Change, CartError> {
        let quantity = Quantity::new(quantity)?;
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else { return Ok(Change::NoMatch) };
        item.quantity = quantity;
        self.refresh(policy);
        Ok(Change::Applied)
    }

    pub fn remove_item(&mut self, id: Uuid, policy: &ShippingPolicy) -> Change {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() == before {
            return Change::NoMatch;
        }
        self.refresh(policy);
        Change::Applied
    }

    pub fn clear(&mut self) { *self = Self::empty(); }

    /// Recomputes the aggregate from the current items.
    pub fn refresh(&mut self, policy: &ShippingPolicy) {
        *self = Self::recalculate(std::mem::take(&mut self.items), policy);
    }

    /// Folds lines sharing a (product, size) key into the first of them, then
    /// recomputes. Snapshots go through here since their lines were not
    /// necessarily built by `add_item`.
    pub fn consolidate(&mut self, policy: &ShippingPolicy) {
        let mut folded: Vec<LineItem> = Vec::with_capacity(self.items.len());
        for item in std::mem::take(&mut self.items) {
            match folded.iter().position(|f| f.matches(&item.product_id, item.size.as_deref())) {
                Some(idx) => folded[idx].quantity = folded[idx].quantity.saturating_add(item.quantity),
                None => folded.push(item),
            }
        }
        *self = Self::recalculate(folded, policy);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),
}

impl From<InvalidQuantity> for CartError {
    fn from(e: InvalidQuantity) -> Self { CartError::InvalidQuantity(e.0) }
}
