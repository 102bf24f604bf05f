use super::{DeliveryStats, IDeliveryRepo};
use crate::repos::shared::inmemory_repo::*;
use crate::repos::shared::repo::UpdateResult;
use nudge_domain::{Delivery, DeliveryStatus, ID};

pub struct InMemoryDeliveryRepo {
    deliveries: std::sync::Mutex<Vec<Delivery>>,
}

impl InMemoryDeliveryRepo {
    pub fn new() -> Self {
        Self {
            deliveries: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryDeliveryRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IDeliveryRepo for InMemoryDeliveryRepo {
    async fn insert(&self, delivery: &Delivery) -> anyhow::Result<()> {
        insert(delivery, &self.deliveries);
        Ok(())
    }

    async fn find(&self, delivery_id: &ID) -> Option<Delivery> {
        find(delivery_id, &self.deliveries)
    }

    async fn find_by_employee(&self, employee_id: &ID, limit: i64) -> Vec<Delivery> {
        let mut deliveries = find_by(&self.deliveries, |delivery| {
            delivery.employee_id == *employee_id
        });
        deliveries.sort_by_key(|delivery| std::cmp::Reverse(delivery.sent_at));
        deliveries.truncate(limit as usize);
        deliveries
    }

    async fn find_expirable(&self, now: i64) -> Vec<Delivery> {
        find_by(&self.deliveries, |delivery| delivery.is_expirable(now))
    }

    async fn find_expired_unforced(&self) -> Vec<Delivery> {
        find_by(&self.deliveries, |delivery| {
            delivery.status == DeliveryStatus::Expired && delivery.forced_checkout_at.is_none()
        })
    }

    async fn expire(&self, delivery_id: &ID) -> anyhow::Result<bool> {
        let updated = update_many(
            &self.deliveries,
            |delivery| delivery.id == *delivery_id && delivery.status == DeliveryStatus::Sent,
            |delivery| delivery.status = DeliveryStatus::Expired,
        );
        Ok(updated > 0)
    }

    async fn ack(
        &self,
        delivery_ids: &[ID],
        employee_id: Option<&ID>,
        now: i64,
    ) -> anyhow::Result<UpdateResult> {
        let in_scope = |delivery: &Delivery| {
            delivery_ids.contains(&delivery.id)
                && employee_id
                    .map(|employee_id| delivery.employee_id == *employee_id)
                    .unwrap_or(true)
        };
        let matched = find_by(&self.deliveries, |delivery| in_scope(delivery)).len() as i64;
        let modified = update_many(
            &self.deliveries,
            |delivery| in_scope(delivery) && delivery.status == DeliveryStatus::Sent,
            |delivery| {
                delivery.status = DeliveryStatus::Acked;
                delivery.acked_at = Some(now);
            },
        );
        Ok(UpdateResult { matched, modified })
    }

    async fn set_forced_checkout(&self, delivery_id: &ID, now: i64) -> anyhow::Result<()> {
        update_many(
            &self.deliveries,
            |delivery| delivery.id == *delivery_id,
            |delivery| delivery.forced_checkout_at = Some(now),
        );
        Ok(())
    }

    async fn stats_by_schedule(&self, schedule_id: &ID) -> DeliveryStats {
        let deliveries = find_by(&self.deliveries, |delivery| {
            delivery.schedule_id.as_ref() == Some(schedule_id)
        });
        let mut stats = DeliveryStats::default();
        for delivery in deliveries {
            match delivery.status {
                DeliveryStatus::Sent => stats.sent += 1,
                DeliveryStatus::Acked => stats.acked += 1,
                DeliveryStatus::Expired => stats.expired += 1,
            }
        }
        stats
    }
}
