mod inmemory;
mod postgres;

use crate::repos::shared::repo::UpdateResult;
pub use inmemory::InMemoryDeliveryRepo;
use nudge_domain::{Delivery, ID};
pub use postgres::PostgresDeliveryRepo;

/// Counts of `Delivery` rows per status for one `Schedule`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryStats {
    pub sent: i64,
    pub acked: i64,
    pub expired: i64,
}

impl DeliveryStats {
    /// Share of deliveries that were acknowledged, pending rows included
    pub fn ack_rate(&self) -> f64 {
        let total = self.sent + self.acked + self.expired;
        if total == 0 {
            return 0.0;
        }
        self.acked as f64 / total as f64
    }
}

/// The `Delivery` ledger is the only resource mutated by more than one
/// component, so every status mutation is a conditional update keyed on the
/// current status. Whoever loses the race gets a no-op, never an error.
#[async_trait::async_trait]
pub trait IDeliveryRepo: Send + Sync {
    async fn insert(&self, delivery: &Delivery) -> anyhow::Result<()>;
    async fn find(&self, delivery_id: &ID) -> Option<Delivery>;
    /// Recent deliveries for one employee, newest first
    async fn find_by_employee(&self, employee_id: &ID, limit: i64) -> Vec<Delivery>;
    /// `sent` rows whose expiry deadline has passed
    async fn find_expirable(&self, now: i64) -> Vec<Delivery>;
    /// `expired` rows whose enforcement call has not been confirmed yet
    async fn find_expired_unforced(&self) -> Vec<Delivery>;
    /// Transitions `sent -> expired` only if the row is still `sent`.
    /// Returns whether this caller won the transition.
    async fn expire(&self, delivery_id: &ID) -> anyhow::Result<bool>;
    /// Transitions `sent -> acked` for every given row still in `sent`,
    /// optionally scoped to rows owned by `employee_id`
    async fn ack(
        &self,
        delivery_ids: &[ID],
        employee_id: Option<&ID>,
        now: i64,
    ) -> anyhow::Result<UpdateResult>;
    async fn set_forced_checkout(&self, delivery_id: &ID, now: i64) -> anyhow::Result<()>;
    async fn stats_by_schedule(&self, schedule_id: &ID) -> DeliveryStats;
}
