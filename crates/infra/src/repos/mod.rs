mod delivery;
mod schedule;
mod shared;
mod subscription;

pub use delivery::{DeliveryStats, IDeliveryRepo, InMemoryDeliveryRepo, PostgresDeliveryRepo};
pub use schedule::{IScheduleRepo, InMemoryScheduleRepo, PostgresScheduleRepo};
pub use shared::repo::UpdateResult;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use subscription::{ISubscriptionRepo, InMemorySubscriptionRepo, PostgresSubscriptionRepo};

#[derive(Clone)]
pub struct Repos {
    pub schedules: Arc<dyn IScheduleRepo>,
    pub deliveries: Arc<dyn IDeliveryRepo>,
    pub subscriptions: Arc<dyn ISubscriptionRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;

        Ok(Self {
            schedules: Arc::new(PostgresScheduleRepo::new(pool.clone())),
            deliveries: Arc::new(PostgresDeliveryRepo::new(pool.clone())),
            subscriptions: Arc::new(PostgresSubscriptionRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            schedules: Arc::new(InMemoryScheduleRepo::new()),
            deliveries: Arc::new(InMemoryDeliveryRepo::new()),
            subscriptions: Arc::new(InMemorySubscriptionRepo::new()),
        }
    }
}
