use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct GatewayCredential {
    pub seller_id: Uuid,
    pub api_token: String,
    pub environment: String,
    pub utmify_api_token: Option<String>,
}

#[derive(Clone)]
pub struct CredentialsRepo {
    pub pool: PgPool,
}

impl CredentialsRepo {
    pub async fn get_for_order(&self, order_id: Uuid) -> Result<Option<GatewayCredential>> {
        let row = sqlx::query(
            r#"
            SELECT c.seller_id, c.api_token, c.environment, c.utmify_api_token
            FROM seller_credentials c
            JOIN orders o ON o.seller_id = c.seller_id
            WHERE o.id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| GatewayCredential {
            seller_id: row.get("seller_id"),
            api_token: row.get("api_token"),
            environment: row.get("environment"),
            utmify_api_token: row.get("utmify_api_token"),
        }))
    }
}
