use async_trait::async_trait;
use uuid::Uuid;

use super::PgBackend;
use crate::domain::aggregates::{generate_order_number, OrderReceipt, OrderSubmission};
use crate::Result;

/// Receives finished checkouts. Failures are reported once to the shopper;
/// nothing here retries.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit(&self, order: &OrderSubmission) -> Result<OrderReceipt>;
}

#[async_trait]
impl OrderGateway for PgBackend {
    async fn submit(&self, o: &OrderSubmission) -> Result<OrderReceipt> {
        let order_id = Uuid::now_v7();
        let order_number = generate_order_number();
        let info = &o.shipping_info;
        let address = serde_json::json!({
            "address": info.address, "ward": info.ward, "district": info.district, "city": info.city,
        });

        let mut tx = self.db.begin().await?;
        sqlx::query("INSERT INTO orders (id, order_number, customer_name, customer_email, phone, shipping_address, payment_method, notes, subtotal, shipping, total, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending', NOW())")
            .bind(order_id).bind(&order_number).bind(&info.full_name).bind(&info.email).bind(&info.phone)
            .bind(&address).bind(o.payment_method.as_str()).bind(&info.notes)
            .bind(o.subtotal.to_db()).bind(o.shipping.to_db()).bind(o.total.to_db())
            .execute(&mut *tx).await?;
        for item in &o.items {
            sqlx::query("INSERT INTO order_items (id, order_id, product_id, name, size, color, quantity, unit_price, total) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)")
                .bind(Uuid::now_v7()).bind(order_id).bind(&item.product_id).bind(&item.name)
                .bind(&item.size).bind(&item.color).bind(i64::from(item.quantity.value()))
                .bind(item.price.to_db()).bind(item.line_total().to_db())
                .execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(OrderReceipt { order_id, order_number })
    }
}
