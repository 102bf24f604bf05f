mod inmemory;
mod postgres;

pub use inmemory::InMemoryScheduleRepo;
use nudge_domain::{Schedule, ID};
pub use postgres::PostgresScheduleRepo;

#[async_trait::async_trait]
pub trait IScheduleRepo: Send + Sync {
    async fn insert(&self, schedule: &Schedule) -> anyhow::Result<()>;
    async fn save(&self, schedule: &Schedule) -> anyhow::Result<()>;
    /// A storage failure is distinct from an absent row: the tick webhook
    /// tells the dispatcher to stop retrying on absence, so a flaky
    /// database must never look like a missing schedule
    async fn find(&self, schedule_id: &ID) -> anyhow::Result<Option<Schedule>>;
    async fn find_by_employee(&self, employee_id: &ID) -> Vec<Schedule>;
}
