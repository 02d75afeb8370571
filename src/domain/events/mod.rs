//! Domain events
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{OrderReceipt, OrderSubmission};
use crate::domain::checkout::PaymentMethod;
use crate::domain::value_objects::Vnd;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShopEvent {
    OrderPlaced {
        order_id: Uuid,
        order_number: String,
        email: String,
        payment_method: PaymentMethod,
        item_count: u64,
        total: Vnd,
    },
}

impl ShopEvent {
    pub fn order_placed(receipt: &OrderReceipt, submission: &OrderSubmission) -> Self {
        ShopEvent::OrderPlaced {
            order_id: receipt.order_id,
            order_number: receipt.order_number.clone(),
            email: submission.shipping_info.email.clone(),
            payment_method: submission.payment_method,
            item_count: submission.total_items(),
            total: submission.total,
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            ShopEvent::OrderPlaced { .. } => "shop.orders.placed",
        }
    }
}
