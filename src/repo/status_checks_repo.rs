use anyhow::Result;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StatusCheckRow {
    pub order_id: Uuid,
    pub next_check_at: chrono::DateTime<chrono::Utc>,
    pub attempts: i32,
    pub state: String,
}

#[derive(Clone)]
pub struct StatusChecksRepo {
    pub pool: PgPool,
}

impl StatusChecksRepo {
    pub async fn enqueue_tx(
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        next_check_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO status_checks (order_id, next_check_at, attempts, state, updated_at)
            VALUES ($1, $2, 0, 'PENDING', now())
            ON CONFLICT (order_id) DO UPDATE SET
                next_check_at = EXCLUDED.next_check_at,
                state = 'PENDING',
                updated_at = now()
            "#,
        )
        .bind(order_id)
        .bind(next_check_at)
        .execute(tx.as_mut())
        .await?;

        Ok(())
    }

    pub async fn due_items(&self, limit: i64) -> Result<Vec<StatusCheckRow>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, next_check_at, attempts, state
            FROM status_checks
            WHERE state = 'PENDING' AND next_check_at <= now()
            ORDER BY next_check_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| StatusCheckRow {
                order_id: row.get("order_id"),
                next_check_at: row.get("next_check_at"),
                attempts: row.get("attempts"),
                state: row.get("state"),
            })
            .collect())
    }

    pub async fn mark(
        &self,
        order_id: Uuid,
        state: &str,
        attempts: i32,
        next_check_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE status_checks
            SET state=$2, attempts=$3, next_check_at=COALESCE($4, next_check_at), updated_at=now()
            WHERE order_id=$1
            "#,
        )
        .bind(order_id)
        .bind(state)
        .bind(attempts)
        .bind(next_check_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
