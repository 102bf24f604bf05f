mod inmemory;
mod postgres;

pub use inmemory::InMemorySubscriptionRepo;
use nudge_domain::{Subscription, ID};
pub use postgres::PostgresSubscriptionRepo;

#[async_trait::async_trait]
pub trait ISubscriptionRepo: Send + Sync {
    /// Insert keyed on the endpoint: registering a known endpoint again
    /// reassigns it to the given employee instead of duplicating it
    async fn upsert(&self, subscription: &Subscription) -> anyhow::Result<()>;
    async fn find_by_employee(&self, employee_id: &ID) -> Vec<Subscription>;
}
