use crate::forwarder::utmify::UtmifyForwarder;
use crate::repo::credentials_repo::CredentialsRepo;
use crate::repo::forwards_repo::{ForwardItem, ForwardsRepo};
use anyhow::Result;
use chrono::{Duration, Utc};

#[derive(Clone)]
pub struct ForwardRelay {
    pub forwards_repo: ForwardsRepo,
    pub credentials_repo: CredentialsRepo,
    pub forwarder: UtmifyForwarder,
}

impl ForwardRelay {
    pub async fn run(self) {
        loop {
            if let Err(err) = self.tick().await {
                tracing::error!("forward relay error: {}", err);
            }
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        }
    }

    async fn tick(&self) -> Result<()> {
        let batch = self.forwards_repo.lock_pending(50).await?;
        if batch.is_empty() {
            return Ok(());
        }

        for item in batch {
            match self.deliver(&item).await {
                Ok(true) => {
                    self.forwards_repo.mark_sent(item.id).await?;
                }
                Ok(false) => {
                    tracing::debug!(
                        "seller of order {} has no downstream token, skipping forward {}",
                        item.order_id,
                        item.id
                    );
                    self.forwards_repo.mark_skipped(item.id).await?;
                }
                Err(e) => {
                    let attempts = item.attempts + 1;
                    let backoff = i64::min(300, 2_i64.pow((attempts.min(8)) as u32));
                    let next_attempt_at = Utc::now() + Duration::seconds(backoff);
                    self.forwards_repo
                        .mark_retry(item.id, attempts, next_attempt_at)
                        .await?;
                    tracing::warn!("delivery failed for forward {}: {}", item.id, e);
                }
            }
        }

        Ok(())
    }

    /// `Ok(false)` means there is nothing to deliver for this seller.
    async fn deliver(&self, item: &ForwardItem) -> Result<bool> {
        let token = self
            .credentials_repo
            .get_for_order(item.order_id)
            .await?
            .and_then(|c| c.utmify_api_token);

        let Some(token) = token else {
            return Ok(false);
        };

        self.forwarder
            .send(&item.payload_json, &item.idempotency_key, &token)
            .await?;

        Ok(true)
    }
}
