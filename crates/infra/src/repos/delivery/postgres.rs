use super::{DeliveryStats, IDeliveryRepo};
use crate::repos::shared::repo::UpdateResult;
use nudge_domain::{Delivery, DeliveryStatus, ID};
use sqlx::{types::Uuid, FromRow, PgPool, Row};
use tracing::error;

pub struct PostgresDeliveryRepo {
    pool: PgPool,
}

impl PostgresDeliveryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DeliveryRaw {
    delivery_uid: Uuid,
    schedule_uid: Option<Uuid>,
    employee_uid: Uuid,
    title: String,
    body: String,
    url: Option<String>,
    status: String,
    sent_at: i64,
    acked_at: Option<i64>,
    expires_at: Option<i64>,
    forced_checkout_at: Option<i64>,
    metadata: serde_json::Value,
}

impl From<DeliveryRaw> for Delivery {
    fn from(raw: DeliveryRaw) -> Self {
        Self {
            id: raw.delivery_uid.into(),
            schedule_id: raw.schedule_uid.map(|uid| uid.into()),
            employee_id: raw.employee_uid.into(),
            title: raw.title,
            body: raw.body,
            url: raw.url,
            status: raw.status.parse().unwrap_or(DeliveryStatus::Sent),
            sent_at: raw.sent_at,
            acked_at: raw.acked_at,
            expires_at: raw.expires_at,
            forced_checkout_at: raw.forced_checkout_at,
            metadata: serde_json::from_value(raw.metadata).unwrap_or_default(),
        }
    }
}

fn uuids(ids: &[ID]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.inner_ref()).collect()
}

#[async_trait::async_trait]
impl IDeliveryRepo for PostgresDeliveryRepo {
    async fn insert(&self, delivery: &Delivery) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO deliveries
            (delivery_uid, schedule_uid, employee_uid, title, body, url, status, sent_at, acked_at, expires_at, forced_checkout_at, metadata)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(delivery.id.inner_ref())
        .bind(delivery.schedule_id.as_ref().map(|id| *id.inner_ref()))
        .bind(delivery.employee_id.inner_ref())
        .bind(&delivery.title)
        .bind(&delivery.body)
        .bind(&delivery.url)
        .bind(delivery.status.to_string())
        .bind(delivery.sent_at)
        .bind(delivery.acked_at)
        .bind(delivery.expires_at)
        .bind(delivery.forced_checkout_at)
        .bind(serde_json::to_value(&delivery.metadata).unwrap_or_else(|_| serde_json::json!({})))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, delivery_id: &ID) -> Option<Delivery> {
        sqlx::query_as::<_, DeliveryRaw>(
            r#"
            SELECT * FROM deliveries
            WHERE delivery_uid = $1
            "#,
        )
        .bind(delivery_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Find delivery query failed: {:?}", e);
            None
        })
        .map(|delivery| delivery.into())
    }

    async fn find_by_employee(&self, employee_id: &ID, limit: i64) -> Vec<Delivery> {
        sqlx::query_as::<_, DeliveryRaw>(
            r#"
            SELECT * FROM deliveries
            WHERE employee_uid = $1
            ORDER BY sent_at DESC
            LIMIT $2
            "#,
        )
        .bind(employee_id.inner_ref())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|delivery| delivery.into())
        .collect()
    }

    async fn find_expirable(&self, now: i64) -> Vec<Delivery> {
        sqlx::query_as::<_, DeliveryRaw>(
            r#"
            SELECT * FROM deliveries
            WHERE status = 'sent' AND expires_at <= $1
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|delivery| delivery.into())
        .collect()
    }

    async fn find_expired_unforced(&self) -> Vec<Delivery> {
        sqlx::query_as::<_, DeliveryRaw>(
            r#"
            SELECT * FROM deliveries
            WHERE status = 'expired' AND forced_checkout_at IS NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|delivery| delivery.into())
        .collect()
    }

    async fn expire(&self, delivery_id: &ID) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE deliveries
            SET status = 'expired'
            WHERE delivery_uid = $1 AND status = 'sent'
            "#,
        )
        .bind(delivery_id.inner_ref())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn ack(
        &self,
        delivery_ids: &[ID],
        employee_id: Option<&ID>,
        now: i64,
    ) -> anyhow::Result<UpdateResult> {
        let ids = uuids(delivery_ids);
        let matched: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM deliveries
            WHERE delivery_uid = ANY($1) AND ($2::uuid IS NULL OR employee_uid = $2)
            "#,
        )
        .bind(&ids)
        .bind(employee_id.map(|id| *id.inner_ref()))
        .fetch_one(&self.pool)
        .await?;

        let res = sqlx::query(
            r#"
            UPDATE deliveries
            SET status = 'acked', acked_at = $3
            WHERE delivery_uid = ANY($1)
                AND ($2::uuid IS NULL OR employee_uid = $2)
                AND status = 'sent'
            "#,
        )
        .bind(&ids)
        .bind(employee_id.map(|id| *id.inner_ref()))
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(UpdateResult {
            matched,
            modified: res.rows_affected() as i64,
        })
    }

    async fn set_forced_checkout(&self, delivery_id: &ID, now: i64) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE deliveries
            SET forced_checkout_at = $2
            WHERE delivery_uid = $1
            "#,
        )
        .bind(delivery_id.inner_ref())
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn stats_by_schedule(&self, schedule_id: &ID) -> DeliveryStats {
        let rows = sqlx::query(
            r#"
            SELECT status, COUNT(*) AS delivery_count FROM deliveries
            WHERE schedule_uid = $1
            GROUP BY status
            "#,
        )
        .bind(schedule_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default();

        let mut stats = DeliveryStats::default();
        for row in rows {
            let status: String = row.get("status");
            let count: i64 = row.get("delivery_count");
            match status.parse() {
                Ok(DeliveryStatus::Sent) => stats.sent = count,
                Ok(DeliveryStatus::Acked) => stats.acked = count,
                Ok(DeliveryStatus::Expired) => stats.expired = count,
                Err(e) => error!("Unknown delivery status in ledger: {:?}", e),
            }
        }
        stats
    }
}
