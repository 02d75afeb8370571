//! Checkout orchestration: validate the form, freeze the cart into an order
//! submission, hand it to the order service and clear the cart on success.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use validator::Validate;

use crate::backend::OrderGateway;
use crate::domain::aggregates::{OrderReceipt, OrderSubmission};
use crate::domain::checkout::CheckoutForm;
use crate::domain::events::ShopEvent;
use crate::persistence::CartSessions;
use crate::{Result, StoreError};

pub const SUCCESS_PATH: &str = "/checkout/success";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    #[serde(flatten)]
    pub receipt: OrderReceipt,
    pub redirect_to: &'static str,
}

pub struct Checkout {
    carts: Arc<CartSessions>,
    orders: Arc<dyn OrderGateway>,
    events: Option<async_nats::Client>,
}

impl Checkout {
    pub fn new(carts: Arc<CartSessions>, orders: Arc<dyn OrderGateway>, events: Option<async_nats::Client>) -> Self {
        Self { carts, orders, events }
    }

    /// The session stays locked from the moment the cart is read until it
    /// is cleared, so a concurrent add is never wiped and a second checkout
    /// of the same session finds the cart already empty. On failure the
    /// cart is left as it was so the shopper can try again by hand.
    pub async fn place_order(&self, session: &str, form: CheckoutForm) -> Result<PlacedOrder> {
        form.validate()?;
        let CheckoutForm { shipping, payment_method } = form;
        let (receipt, submission) = self
            .carts
            .drain(session, |cart| async move {
                if cart.is_empty() {
                    return Err(StoreError::EmptyCart);
                }
                let submission = OrderSubmission::new(shipping, payment_method, &cart);
                let receipt = match self.orders.submit(&submission).await {
                    Ok(receipt) => receipt,
                    Err(e @ StoreError::OrderSubmission(_)) => return Err(e),
                    Err(other) => return Err(StoreError::OrderSubmission(other.to_string())),
                };
                Ok::<_, StoreError>((receipt, submission))
            })
            .await?;
        info!(session, order = %receipt.order_number, total = submission.total.amount(), "order placed");

        self.publish(ShopEvent::order_placed(&receipt, &submission)).await;
        Ok(PlacedOrder { receipt, redirect_to: SUCCESS_PATH })
    }

    async fn publish(&self, event: ShopEvent) {
        let Some(nats) = &self.events else { return };
        let payload = match serde_json::to_vec(&event) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "could not encode event");
                return;
            }
        };
        if let Err(e) = nats.publish(event.subject(), payload.into()).await {
            warn!(subject = event.subject(), error = %e, "failed to publish event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{NewLineItem, ShippingPolicy};
    use crate::domain::checkout::{PaymentMethod, ShippingInfo};
    use crate::domain::value_objects::Vnd;
    use crate::persistence::{CartStorage, MemoryCartStorage};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::Notify;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingGateway {
        fail: bool,
        seen: Mutex<Vec<OrderSubmission>>,
    }

    /// Parks inside `submit` until the test lets it finish.
    #[derive(Default)]
    struct HeldGateway {
        entered: Notify,
        release: Notify,
        seen: Mutex<Vec<OrderSubmission>>,
    }

    #[async_trait]
    impl OrderGateway for HeldGateway {
        async fn submit(&self, order: &OrderSubmission) -> Result<OrderReceipt> {
            self.entered.notify_one();
            self.release.notified().await;
            let mut seen = self.seen.lock().unwrap();
            seen.push(order.clone());
            Ok(OrderReceipt { order_id: Uuid::nil(), order_number: format!("DH-{:08}", seen.len()) })
        }
    }

    #[async_trait]
    impl OrderGateway for RecordingGateway {
        async fn submit(&self, order: &OrderSubmission) -> Result<OrderReceipt> {
            if self.fail {
                return Err(StoreError::OrderSubmission("connection reset".into()));
            }
            self.seen.lock().unwrap().push(order.clone());
            Ok(OrderReceipt { order_id: Uuid::nil(), order_number: "DH-00000001".into() })
        }
    }

    fn shoe(product: &str) -> NewLineItem {
        NewLineItem {
            product_id: product.into(), name: "Giày".into(), price: Vnd::new(250_000), price_formatted: String::new(),
            quantity: 2, size: Some("39".into()), color: None, image_url: None, slug: "giay".into(),
        }
    }

    async fn setup(fail: bool) -> (Checkout, Arc<CartSessions>, Arc<MemoryCartStorage>, Arc<RecordingGateway>) {
        let storage = Arc::new(MemoryCartStorage::default());
        let carts = Arc::new(CartSessions::new(storage.clone(), ShippingPolicy::default()));
        let gateway = Arc::new(RecordingGateway { fail, ..Default::default() });
        carts.mutate("s", |s| s.add_item(shoe("P1"))).await.unwrap();
        (Checkout::new(carts.clone(), gateway.clone(), None), carts, storage, gateway)
    }

    fn form() -> CheckoutForm {
        CheckoutForm { shipping: ShippingInfo::sample(), payment_method: PaymentMethod::Banking }
    }

    #[tokio::test]
    async fn test_success_clears_cart() {
        let (checkout, carts, storage, gateway) = setup(false).await;
        let placed = checkout.place_order("s", form()).await.unwrap();
        assert_eq!(placed.redirect_to, SUCCESS_PATH);
        assert!(carts.view("s").await.cart.is_empty());
        assert!(storage.load("s").await.unwrap().is_none());

        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen[0].subtotal, Vnd::new(500_000));
        assert_eq!(seen[0].shipping, Vnd::zero());
        assert_eq!(seen[0].payment_method, PaymentMethod::Banking);
    }

    #[tokio::test]
    async fn test_failure_keeps_cart() {
        let (checkout, carts, storage, _) = setup(true).await;
        let err = checkout.place_order("s", form()).await.unwrap_err();
        assert!(matches!(err, StoreError::OrderSubmission(_)));
        assert_eq!(carts.view("s").await.cart.total_items(), 2);
        assert!(storage.load("s").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalid_form_is_rejected_before_submission() {
        let (checkout, _, _, gateway) = setup(false).await;
        let mut bad = form();
        bad.shipping.email = "khong-hop-le".into();
        let err = checkout.place_order("s", bad).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(gateway.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let (checkout, _, _, _) = setup(false).await;
        let err = checkout.place_order("other", form()).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyCart));
    }

    #[tokio::test]
    async fn test_item_added_during_submission_survives() {
        let storage = Arc::new(MemoryCartStorage::default());
        let carts = Arc::new(CartSessions::new(storage.clone(), ShippingPolicy::default()));
        let gateway = Arc::new(HeldGateway::default());
        let checkout = Arc::new(Checkout::new(carts.clone(), gateway.clone(), None));
        carts.mutate("s", |s| s.add_item(shoe("P1"))).await.unwrap();

        let order = tokio::spawn({
            let checkout = checkout.clone();
            async move { checkout.place_order("s", form()).await }
        });
        gateway.entered.notified().await;
        let late_add = tokio::spawn({
            let carts = carts.clone();
            async move { carts.mutate("s", |s| s.add_item(shoe("P2"))).await }
        });
        gateway.release.notify_one();

        order.await.unwrap().unwrap();
        late_add.await.unwrap().unwrap();

        let seen = gateway.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].items.len(), 1);
        assert_eq!(seen[0].items[0].product_id, "P1");

        let items = carts.view("s").await.cart.items().to_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "P2");
        assert!(storage.load("s").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_checkouts_submit_once() {
        let storage = Arc::new(MemoryCartStorage::default());
        let carts = Arc::new(CartSessions::new(storage, ShippingPolicy::default()));
        let gateway = Arc::new(HeldGateway::default());
        let checkout = Arc::new(Checkout::new(carts.clone(), gateway.clone(), None));
        carts.mutate("s", |s| s.add_item(shoe("P1"))).await.unwrap();

        let first = tokio::spawn({
            let checkout = checkout.clone();
            async move { checkout.place_order("s", form()).await }
        });
        gateway.entered.notified().await;
        let second = tokio::spawn({
            let checkout = checkout.clone();
            async move { checkout.place_order("s", form()).await }
        });
        gateway.release.notify_one();

        assert!(first.await.unwrap().is_ok());
        assert!(matches!(second.await.unwrap(), Err(StoreError::EmptyCart)));
        assert_eq!(gateway.seen.lock().unwrap().len(), 1);
    }
}
