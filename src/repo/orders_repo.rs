use crate::domain::order::{Order, OrderStatus};
use anyhow::{anyhow, Result};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrdersRepo {
    pub pool: PgPool,
}

const ORDER_COLUMNS: &str = r#"
    id, seller_id, status, amount_minor_units, payment_method,
    gateway_transaction_id, customer_name, customer_email, customer_document,
    tracking_params, is_test, created_at, paid_at, refunded_at
"#;

impl OrdersRepo {
    pub async fn get(&self, order_id: Uuid) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_order).transpose()
    }

    pub async fn get_by_gateway_transaction(
        &self,
        gateway_transaction_id: &str,
    ) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE gateway_transaction_id = $1"
        ))
        .bind(gateway_transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_order).transpose()
    }

    pub async fn gateway_event_seen(&self, gateway_event_id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM processed_gateway_events WHERE gateway_event_id = $1")
            .bind(gateway_event_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Records a provider event id inside the transition transaction, so
    /// the dedup mark and the status write land (or roll back) together.
    /// `false` means a concurrent delivery got there first.
    pub async fn record_gateway_event_tx(
        tx: &mut Transaction<'_, Postgres>,
        gateway_event_id: &str,
        order_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO processed_gateway_events (gateway_event_id, order_id, received_at)
            VALUES ($1, $2, now())
            ON CONFLICT (gateway_event_id) DO NOTHING
            "#,
        )
        .bind(gateway_event_id)
        .bind(order_id)
        .execute(tx.as_mut())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Compare-and-swap status write: only lands if the order is still in
    /// `from`, which serializes concurrent deliveries per order. `paid_at`
    /// and `refunded_at` are COALESCEd so each is set exactly once.
    pub async fn transition_tx(
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        paid_at: Option<chrono::DateTime<chrono::Utc>>,
        refunded_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $3,
                paid_at = COALESCE(paid_at, $4),
                refunded_at = COALESCE(refunded_at, $5),
                updated_at = now()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(order_id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(paid_at)
        .bind(refunded_at)
        .execute(tx.as_mut())
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

fn map_order(row: PgRow) -> Result<Order> {
    let status: String = row.get("status");
    let status = OrderStatus::parse(&status)
        .ok_or_else(|| anyhow!("order row carries unknown status: {status}"))?;

    Ok(Order {
        id: row.get("id"),
        seller_id: row.get("seller_id"),
        status,
        amount_minor_units: row.get("amount_minor_units"),
        payment_method: row.get("payment_method"),
        gateway_transaction_id: row.get("gateway_transaction_id"),
        customer_name: row.get("customer_name"),
        customer_email: row.get("customer_email"),
        customer_document: row.get("customer_document"),
        tracking_params: row.get("tracking_params"),
        is_test: row.get("is_test"),
        created_at: row.get("created_at"),
        paid_at: row.get("paid_at"),
        refunded_at: row.get("refunded_at"),
    })
}
