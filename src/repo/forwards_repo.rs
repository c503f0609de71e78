use crate::domain::order::OrderStatus;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ForwardItem {
    pub id: i64,
    pub order_id: Uuid,
    pub payload_json: serde_json::Value,
    pub idempotency_key: String,
    pub attempts: i32,
}

#[derive(Clone)]
pub struct ForwardsRepo {
    pub pool: PgPool,
}

impl ForwardsRepo {
    /// Enqueued inside the same transaction as the status write, so a
    /// forward exists iff the transition landed. One row per
    /// (order, status) pair.
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        status: OrderStatus,
        payload_json: serde_json::Value,
        idempotency_key: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO forward_outbox (order_id, order_status, payload_json, idempotency_key, state, attempts, next_attempt_at)
            VALUES ($1, $2, $3, $4, 'PENDING', 0, now())
            ON CONFLICT (order_id, order_status) DO NOTHING
            "#,
        )
        .bind(order_id)
        .bind(status.as_str())
        .bind(payload_json)
        .bind(idempotency_key)
        .execute(tx.as_mut())
        .await?;

        Ok(())
    }

    pub async fn lock_pending(&self, batch_size: i64) -> Result<Vec<ForwardItem>> {
        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, payload_json, idempotency_key, attempts
            FROM forward_outbox
            WHERE state = 'PENDING' AND next_attempt_at <= now()
            ORDER BY id ASC
            LIMIT $1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(batch_size)
        .fetch_all(tx.as_mut())
        .await?;

        if rows.is_empty() {
            tx.rollback().await?;
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.get("id")).collect();
        sqlx::query("UPDATE forward_outbox SET state = 'PROCESSING', updated_at = now() WHERE id = ANY($1)")
            .bind(&ids)
            .execute(tx.as_mut())
            .await?;

        tx.commit().await?;

        Ok(rows
            .into_iter()
            .map(|r| ForwardItem {
                id: r.get("id"),
                order_id: r.get("order_id"),
                payload_json: r.get("payload_json"),
                idempotency_key: r.get("idempotency_key"),
                attempts: r.get("attempts"),
            })
            .collect())
    }

    pub async fn mark_sent(&self, id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE forward_outbox SET state='SENT', sent_at=now(), updated_at=now() WHERE id=$1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn mark_retry(&self, id: i64, attempts: i32, next_attempt_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE forward_outbox SET state='PENDING', attempts=$2, next_attempt_at=$3, updated_at=now() WHERE id=$1",
        )
        .bind(id)
        .bind(attempts)
        .bind(next_attempt_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn mark_skipped(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE forward_outbox SET state='SKIPPED', updated_at=now() WHERE id=$1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
