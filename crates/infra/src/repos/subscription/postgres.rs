use super::ISubscriptionRepo;
use nudge_domain::{Subscription, SubscriptionKeys, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresSubscriptionRepo {
    pool: PgPool,
}

impl PostgresSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SubscriptionRaw {
    employee_uid: Uuid,
    endpoint: String,
    p256dh: String,
    auth_key: String,
}

impl From<SubscriptionRaw> for Subscription {
    fn from(raw: SubscriptionRaw) -> Self {
        Self {
            employee_id: raw.employee_uid.into(),
            endpoint: raw.endpoint,
            keys: SubscriptionKeys {
                p256dh: raw.p256dh,
                auth: raw.auth_key,
            },
        }
    }
}

#[async_trait::async_trait]
impl ISubscriptionRepo for PostgresSubscriptionRepo {
    async fn upsert(&self, subscription: &Subscription) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions
            (endpoint, employee_uid, p256dh, auth_key)
            VALUES($1, $2, $3, $4)
            ON CONFLICT (endpoint) DO UPDATE SET
                employee_uid = $2,
                p256dh = $3,
                auth_key = $4
            "#,
        )
        .bind(&subscription.endpoint)
        .bind(subscription.employee_id.inner_ref())
        .bind(&subscription.keys.p256dh)
        .bind(&subscription.keys.auth)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_employee(&self, employee_id: &ID) -> Vec<Subscription> {
        sqlx::query_as::<_, SubscriptionRaw>(
            r#"
            SELECT * FROM subscriptions
            WHERE employee_uid = $1
            "#,
        )
        .bind(employee_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|subscription| subscription.into())
        .collect()
    }
}
