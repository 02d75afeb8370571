//! Order submission and receipt

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::cart::{Cart, LineItem};
use crate::domain::checkout::{PaymentMethod, ShippingInfo};
use crate::domain::value_objects::Vnd;

/// Everything the order service needs, frozen at the moment of checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    pub shipping_info: ShippingInfo,
    pub payment_method: PaymentMethod,
    pub items: Vec<LineItem>,
    pub subtotal: Vnd,
    pub shipping: Vnd,
    pub total: Vnd,
}

impl OrderSubmission {
    pub fn new(shipping_info: ShippingInfo, payment_method: PaymentMethod, cart: &Cart) -> Self {
        Self {
            shipping_info, payment_method,
            items: cart.items().to_vec(),
            subtotal: cart.subtotal(), shipping: cart.shipping(), total: cart.total(),
        }
    }

    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity.value())).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub order_number: String,
}

/// `DH-` followed by eight digits.
pub fn generate_order_number() -> String {
    format!("DH-{:08}", rand::random::<u32>() % 100_000_000)
}
